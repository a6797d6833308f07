//! Single-flight credential renewal.
//!
//! Any number of requests may hit an expired access token at once. The first
//! one to ask for a renewal opens a ticket and a background task
//! performs the single refresh call; every later caller joins that ticket and
//! receives the same outcome. The store is updated (or cleared) before the
//! ticket resolves, and the ticket is retired right before it resolves so
//! the next expiry starts a fresh one.
//!
//! Writes are conditional on the store still holding the pair the renewal
//! started from. A logout or a fresh login in the meantime wins, and the
//! ticket resolves as [`RenewalOutcome::Superseded`].
//!
//! The refresh runs on a spawned task, so dropping the request that started
//! it does not abort it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use legallens_core::{paths, RefreshRequest, RefreshResponse};
use tokio::sync::{Notify, OnceCell};
use tracing::{debug, info, warn};

use crate::error::RenewalFailure;
use crate::store::{CredentialPair, CredentialStore};

pub const DEFAULT_RENEWAL_TIMEOUT: Duration = Duration::from_secs(30);

/// Exchanges a refresh token for new credentials.
#[async_trait]
pub trait Renewer: Send + Sync {
    async fn renew(&self, refresh_token: &str) -> Result<RefreshResponse, RenewalFailure>;
}

/// `POST /auth/refresh {refresh_token}`.
pub struct HttpRenewer {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRenewer {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Renewer for HttpRenewer {
    async fn renew(&self, refresh_token: &str) -> Result<RefreshResponse, RenewalFailure> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), paths::REFRESH);
        let payload = RefreshRequest {
            refresh_token: refresh_token.to_string(),
        };
        let response = self
            .client
            .post(url)
            .json(&payload)
            .send()
            .await
            .map_err(|err| RenewalFailure::Transport(err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(RenewalFailure::Rejected {
                status: status.as_u16(),
            });
        }
        let body = response
            .bytes()
            .await
            .map_err(|err| RenewalFailure::Transport(err.to_string()))?;
        let renewed: RefreshResponse = serde_json::from_slice(&body)
            .map_err(|err| RenewalFailure::InvalidResponse(err.to_string()))?;
        if renewed.access_token.trim().is_empty() {
            return Err(RenewalFailure::InvalidResponse(
                "empty access_token".to_string(),
            ));
        }
        Ok(renewed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewalOutcome {
    Renewed(CredentialPair),
    Failed(RenewalFailure),
    /// The stored credentials changed while the renewal was in flight.
    /// Nothing was written; callers act on whatever the store holds now.
    Superseded,
}

impl RenewalOutcome {
    pub fn is_renewed(&self) -> bool {
        matches!(self, Self::Renewed(_))
    }
}

/// One in-flight renewal attempt and the outcome its waiters share.
pub(crate) struct RenewalTicket {
    id: u64,
    outcome: OnceCell<RenewalOutcome>,
    notify: Notify,
}

impl RenewalTicket {
    fn new(id: u64) -> Self {
        Self {
            id,
            outcome: OnceCell::new(),
            notify: Notify::new(),
        }
    }

    fn id(&self) -> u64 {
        self.id
    }

    fn resolve(&self, outcome: RenewalOutcome) {
        let _ = self.outcome.set(outcome);
        self.notify.notify_waiters();
    }

    async fn wait(&self) -> RenewalOutcome {
        loop {
            if let Some(outcome) = self.outcome.get() {
                return outcome.clone();
            }

            let notified = self.notify.notified();
            if let Some(outcome) = self.outcome.get() {
                return outcome.clone();
            }

            notified.await;
        }
    }
}

#[derive(Clone)]
pub struct RenewalCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    renewer: Arc<dyn Renewer>,
    store: Arc<dyn CredentialStore>,
    timeout: Duration,
    in_flight: Mutex<Option<Arc<RenewalTicket>>>,
    next_ticket: AtomicU64,
    issued: AtomicU64,
}

impl RenewalCoordinator {
    pub fn new(
        renewer: Arc<dyn Renewer>,
        store: Arc<dyn CredentialStore>,
        timeout: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(CoordinatorInner {
                renewer,
                store,
                timeout,
                in_flight: Mutex::new(None),
                next_ticket: AtomicU64::new(1),
                issued: AtomicU64::new(0),
            }),
        }
    }

    /// Joins the in-flight renewal or starts one, and waits for its outcome.
    pub async fn acquire(&self) -> RenewalOutcome {
        let (ticket, started) = self.inner.join_or_start();
        if started {
            let inner = Arc::clone(&self.inner);
            let task_ticket = Arc::clone(&ticket);
            tokio::spawn(async move {
                inner.run(task_ticket).await;
            });
        } else {
            debug!(ticket = ticket.id(), "joined in-flight renewal");
        }
        ticket.wait().await
    }

    /// Number of refresh calls handed to the renewer so far.
    pub fn renewals_issued(&self) -> u64 {
        self.inner.issued.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> bool {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl CoordinatorInner {
    fn join_or_start(&self) -> (Arc<RenewalTicket>, bool) {
        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(ticket) = slot.as_ref() {
            return (Arc::clone(ticket), false);
        }
        let ticket = Arc::new(RenewalTicket::new(
            self.next_ticket.fetch_add(1, Ordering::SeqCst),
        ));
        *slot = Some(Arc::clone(&ticket));
        (ticket, true)
    }

    fn retire(&self, ticket: &RenewalTicket) {
        let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|current| current.id() == ticket.id()) {
            *slot = None;
        }
    }

    async fn run(&self, ticket: Arc<RenewalTicket>) {
        info!(ticket = ticket.id(), "renewing session credentials");
        let outcome = self.renew().await;
        match &outcome {
            RenewalOutcome::Renewed(_) => info!(ticket = ticket.id(), "session credentials renewed"),
            RenewalOutcome::Failed(failure) => {
                warn!(ticket = ticket.id(), error = %failure, "session renewal failed");
            }
            RenewalOutcome::Superseded => {
                info!(ticket = ticket.id(), "credentials changed during renewal; result discarded");
            }
        }
        self.retire(&ticket);
        ticket.resolve(outcome);
    }

    async fn renew(&self) -> RenewalOutcome {
        let current = match self.store.get() {
            Ok(Some(pair)) => pair,
            Ok(None) => return RenewalOutcome::Failed(RenewalFailure::MissingRefreshToken),
            Err(err) => {
                if let Err(clear_err) = self.store.clear() {
                    warn!(error = %clear_err, "failed to clear unreadable credentials");
                }
                return RenewalOutcome::Failed(RenewalFailure::Store(err.to_string()));
            }
        };

        self.issued.fetch_add(1, Ordering::SeqCst);
        let result = match tokio::time::timeout(self.timeout, self.renewer.renew(&current.refresh))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(RenewalFailure::TimedOut(self.timeout)),
        };

        match result {
            Ok(renewed) => {
                let refresh = renewed
                    .refresh_token
                    .filter(|token| !token.trim().is_empty())
                    .unwrap_or_else(|| current.refresh.clone());
                let pair = CredentialPair::new(renewed.access_token, refresh);
                match self.store.swap_if(&current, Some(&pair)) {
                    Ok(true) => RenewalOutcome::Renewed(pair),
                    Ok(false) => RenewalOutcome::Superseded,
                    Err(err) => self.fail(&current, RenewalFailure::Store(err.to_string())),
                }
            }
            Err(failure) => self.fail(&current, failure),
        }
    }

    /// Clears the pair the renewal started from, unless something else has
    /// replaced it since.
    fn fail(&self, current: &CredentialPair, failure: RenewalFailure) -> RenewalOutcome {
        match self.store.swap_if(current, None) {
            Ok(true) => RenewalOutcome::Failed(failure),
            Ok(false) => RenewalOutcome::Superseded,
            Err(err) => {
                warn!(error = %err, "failed to clear credentials after renewal failure");
                RenewalOutcome::Failed(failure)
            }
        }
    }
}
