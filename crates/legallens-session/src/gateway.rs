//! Authenticated request gateway.
//!
//! Every outbound call goes through [`Gateway::send`], which attaches the
//! stored access token and, on a 401, renews through the
//! [`RenewalCoordinator`] and replays the request exactly once.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use legallens_core::server_message;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::GatewayError;
use crate::renewal::{RenewalCoordinator, RenewalOutcome};
use crate::session::SessionShared;

/// Request payloads. All of them are kept in memory so a replay sends the
/// exact same bytes.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(serde_json::Value),
    Bytes {
        content_type: String,
        data: Bytes,
    },
    /// A single-file `multipart/form-data` upload. The form is rebuilt on
    /// every dispatch.
    Multipart {
        field: String,
        filename: String,
        content_type: String,
        data: Bytes,
    },
}

/// Everything needed to dispatch a call, and to replay it verbatim after a
/// renewal. The gateway never mutates it.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<RequestBody>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, GatewayError> {
        let value = serde_json::to_value(body)
            .map_err(|err| GatewayError::InvalidRequest(format!("unserializable body: {err}")))?;
        self.body = Some(RequestBody::Json(value));
        Ok(self)
    }

    pub fn bytes(mut self, content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.body = Some(RequestBody::Bytes {
            content_type: content_type.into(),
            data: data.into(),
        });
        self
    }

    pub fn multipart(
        mut self,
        field: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.body = Some(RequestBody::Multipart {
            field: field.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        });
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Initial,
    Replay,
}

impl Attempt {
    fn name(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Replay => "replay",
        }
    }
}

/// A fully read response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The `detail` message the server attached, if any.
    pub fn server_message(&self) -> Option<String> {
        server_message(&self.body)
    }

    pub fn error_for_status(self) -> Result<Self, GatewayError> {
        match self.status_error() {
            Some(err) => Err(err),
            None => Ok(self),
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, GatewayError> {
        if let Some(err) = self.status_error() {
            return Err(err);
        }
        serde_json::from_slice(&self.body).map_err(|source| GatewayError::Decode {
            status: self.status,
            source,
        })
    }

    fn status_error(&self) -> Option<GatewayError> {
        let status = self.status;
        if status.is_success() || status.is_redirection() || status.is_informational() {
            return None;
        }
        let message = self.server_message().unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
        Some(if status == StatusCode::UNAUTHORIZED {
            GatewayError::Authorization { message }
        } else if status.is_client_error() {
            GatewayError::Validation { status, message }
        } else {
            GatewayError::Server { status, message }
        })
    }
}

#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

struct GatewayInner {
    client: reqwest::Client,
    base_url: String,
    shared: Arc<SessionShared>,
    renewal: RenewalCoordinator,
}

impl Gateway {
    pub(crate) fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        shared: Arc<SessionShared>,
        renewal: RenewalCoordinator,
    ) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                client,
                base_url: base_url.into(),
                shared,
                renewal,
            }),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn renewal(&self) -> &RenewalCoordinator {
        &self.inner.renewal
    }

    /// Sends `request` with the current access token.
    ///
    /// Any response other than 401 is returned as-is. A 401 renews the
    /// session once and replays the request; the replay's response is final
    /// whatever its status. A failed renewal ends the session and yields
    /// [`GatewayError::SessionExpired`].
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, GatewayError> {
        let store = &self.inner.shared.store;
        let sent_with = store.access_token()?;
        let response = self
            .dispatch(request, sent_with.as_deref(), Attempt::Initial)
            .await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        let fresh = match store.access_token()? {
            Some(current) if sent_with.as_deref() != Some(current.as_str()) => {
                debug!(
                    method = %request.method(),
                    path = %request.path(),
                    "access token changed while request was in flight"
                );
                current
            }
            None if sent_with.is_none() => return Ok(response),
            _ => {
                info!(
                    method = %request.method(),
                    path = %request.path(),
                    "request unauthorized; renewing session"
                );
                match self.inner.renewal.acquire().await {
                    RenewalOutcome::Renewed(pair) => pair.access,
                    RenewalOutcome::Failed(_) => {
                        self.inner.shared.expire();
                        return Err(GatewayError::SessionExpired);
                    }
                    // Logged out or logged in again while renewing.
                    RenewalOutcome::Superseded => match store.access_token()? {
                        Some(current) => current,
                        None => {
                            debug!(
                                method = %request.method(),
                                path = %request.path(),
                                "session ended while renewing; not replaying"
                            );
                            return Err(GatewayError::SessionExpired);
                        }
                    },
                }
            }
        };

        self.dispatch(request, Some(&fresh), Attempt::Replay).await
    }

    /// Sends without credentials and without renewal. Used for login and
    /// registration, where a 401 means the submitted credentials are wrong.
    pub async fn send_public(&self, request: &ApiRequest) -> Result<ApiResponse, GatewayError> {
        self.dispatch(request, None, Attempt::Initial).await
    }

    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: &ApiRequest,
    ) -> Result<T, GatewayError> {
        self.send(request).await?.json()
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        self.send_json(&ApiRequest::get(path)).await
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.inner.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        access_token: Option<&str>,
        attempt: Attempt,
    ) -> Result<ApiResponse, GatewayError> {
        let mut headers = request.headers().clone();
        headers.remove(AUTHORIZATION);
        let mut builder = self
            .inner
            .client
            .request(request.method().clone(), self.url(request.path()))
            .headers(headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = access_token {
            builder = builder.bearer_auth(token);
        }
        builder = match request.body() {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Bytes { content_type, data }) => builder
                .header(CONTENT_TYPE, content_type.as_str())
                .body(data.clone()),
            Some(RequestBody::Multipart {
                field,
                filename,
                content_type,
                data,
            }) => {
                let part = Part::bytes(data.to_vec())
                    .file_name(filename.clone())
                    .mime_str(content_type)
                    .map_err(|err| {
                        GatewayError::InvalidRequest(format!(
                            "invalid content type {content_type}: {err}"
                        ))
                    })?;
                builder.multipart(Form::new().part(field.clone(), part))
            }
            None => builder,
        };

        debug!(
            method = %request.method(),
            path = %request.path(),
            attempt = attempt.name(),
            "http request"
        );
        let start = Instant::now();
        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        debug!(
            method = %request.method(),
            path = %request.path(),
            attempt = attempt.name(),
            status = %status,
            elapsed_ms = start.elapsed().as_millis(),
            "http response"
        );
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
