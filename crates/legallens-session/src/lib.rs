//! Session handling for the LegalLens client: credential storage, the
//! session phase, authenticated requests and single-flight token renewal.

#![deny(clippy::unwrap_used)]
#![allow(clippy::missing_errors_doc)]

mod error;
mod gateway;
mod notify;
mod renewal;
mod session;
mod state;
pub mod store;

pub use crate::error::{AuthError, GatewayError, RenewalFailure, StoreError};
pub use crate::gateway::{ApiRequest, ApiResponse, Gateway, RequestBody};
pub use crate::notify::{Notice, Notifier, RecordingNotifier, TracingNotifier};
pub use crate::renewal::{
    HttpRenewer, RenewalCoordinator, RenewalOutcome, Renewer,
    DEFAULT_RENEWAL_TIMEOUT,
};
pub use crate::session::{
    Session, SessionConfig, LOGIN_FALLBACK_MESSAGE, REGISTER_FALLBACK_MESSAGE,
};
pub use crate::state::{next_phase, SessionEvent, SessionPhase, SessionState, SessionWatcher};
pub use crate::store::{
    CredentialPair, CredentialStore, FileCredentialStore, KeyringCredentialStore,
    MemoryCredentialStore,
};
