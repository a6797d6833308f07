use std::sync::Arc;
use std::time::Duration;

use legallens_core::{paths, LoginRequest, LoginResponse, RegisterRequest, UserProfile};
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::gateway::{ApiRequest, Gateway};
use crate::notify::{Notice, Notifier};
use crate::renewal::{HttpRenewer, RenewalCoordinator, Renewer, DEFAULT_RENEWAL_TIMEOUT};
use crate::state::{SessionEvent, SessionPhase, SessionState, SessionWatcher};
use crate::store::{CredentialPair, CredentialStore};

pub const LOGIN_FALLBACK_MESSAGE: &str = "Login failed";
pub const REGISTER_FALLBACK_MESSAGE: &str = "Registration failed";

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub base_url: String,
    pub renewal_timeout: Duration,
}

impl SessionConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            renewal_timeout: DEFAULT_RENEWAL_TIMEOUT,
        }
    }

    pub fn with_renewal_timeout(mut self, timeout: Duration) -> Self {
        self.renewal_timeout = timeout;
        self
    }
}

/// State shared by the session facade and the gateway.
pub(crate) struct SessionShared {
    pub(crate) store: Arc<dyn CredentialStore>,
    pub(crate) state: SessionState,
    notifier: Arc<dyn Notifier>,
}

impl SessionShared {
    fn clear_store(&self) {
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear stored credentials");
        }
    }

    /// Ends the session after a failed renewal. The coordinator has already
    /// cleared the pair it failed to renew, so a login that landed since is
    /// left alone. Safe to call from every waiter of the same renewal; only
    /// the call that actually changes the phase raises the notice.
    pub(crate) fn expire(&self) {
        if self.state.apply(SessionEvent::RenewalFailed) {
            self.notifier.notify(Notice::SessionExpired);
        }
    }

    fn reset(&self, event: SessionEvent) {
        self.clear_store();
        self.state.apply(event);
    }
}

/// Session facade handed to the rest of the application.
pub struct Session {
    shared: Arc<SessionShared>,
    gateway: Gateway,
}

impl Session {
    pub fn new(
        client: reqwest::Client,
        config: SessionConfig,
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let renewer = Arc::new(HttpRenewer::new(client.clone(), config.base_url.clone()));
        Self::with_renewer(client, config, store, notifier, renewer)
    }

    pub fn with_renewer(
        client: reqwest::Client,
        config: SessionConfig,
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn Notifier>,
        renewer: Arc<dyn Renewer>,
    ) -> Self {
        let shared = Arc::new(SessionShared {
            store: Arc::clone(&store),
            state: SessionState::new(),
            notifier,
        });
        let renewal = RenewalCoordinator::new(renewer, store, config.renewal_timeout);
        let gateway = Gateway::new(client, config.base_url, Arc::clone(&shared), renewal);
        Self { shared, gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn phase(&self) -> SessionPhase {
        self.shared.state.current()
    }

    pub fn watch(&self) -> SessionWatcher {
        self.shared.state.watch()
    }

    /// Startup check. Without stored credentials this settles on
    /// `Unauthenticated` without touching the network; otherwise the
    /// profile check decides.
    pub async fn initialize(&self) -> SessionPhase {
        if !self.phase().is_checking() {
            debug!(phase = self.phase().name(), "session already initialized");
            return self.phase();
        }

        let stored = match self.shared.store.get() {
            Ok(stored) => stored,
            Err(err) => {
                warn!(error = %err, "failed to read stored credentials");
                None
            }
        };
        if stored.is_none() {
            self.shared.reset(SessionEvent::NoCredentials);
            return self.phase();
        }

        match self.gateway.get_json::<UserProfile>(paths::ME).await {
            Ok(user) => {
                info!(user_id = user.id, "session restored");
                self.shared.state.apply(SessionEvent::ProfileLoaded(user));
            }
            Err(err) => {
                debug!(error = %err, "session check failed");
                self.shared.reset(SessionEvent::ProfileCheckFailed);
            }
        }
        self.phase()
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        match self.try_login(email, password).await {
            Ok(user) => {
                info!(user_id = user.id, "logged in");
                self.shared.state.apply(SessionEvent::LoggedIn(user.clone()));
                Ok(user)
            }
            Err(err) => {
                debug!(error = %err, "login failed");
                self.shared.reset(SessionEvent::LoggedOut);
                Err(err)
            }
        }
    }

    async fn try_login(&self, email: &str, password: &str) -> Result<UserProfile, AuthError> {
        let request = ApiRequest::post(paths::LOGIN).json(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let response = self.gateway.send_public(&request).await?;
        if !response.status().is_success() {
            return Err(AuthError::Rejected {
                status: response.status(),
                message: response
                    .server_message()
                    .unwrap_or_else(|| LOGIN_FALLBACK_MESSAGE.to_string()),
            });
        }
        let tokens: LoginResponse = response.json()?;
        self.shared
            .store
            .set(&CredentialPair::new(tokens.access_token, tokens.refresh_token))?;
        Ok(self.gateway.get_json::<UserProfile>(paths::ME).await?)
    }

    /// Creates an account. Does not log in.
    pub async fn register(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let request = ApiRequest::post(paths::REGISTER).json(&RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let response = self.gateway.send_public(&request).await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(AuthError::Rejected {
            status: response.status(),
            message: response
                .server_message()
                .unwrap_or_else(|| REGISTER_FALLBACK_MESSAGE.to_string()),
        })
    }

    pub fn logout(&self) {
        self.shared.reset(SessionEvent::LoggedOut);
        self.shared.notifier.notify(Notice::LoggedOut);
    }
}
