use std::sync::{Mutex, PoisonError};

use tracing::{info, warn};

/// User-facing notices raised by the session subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    SessionExpired,
    LoggedOut,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Self::SessionExpired => "Your session has expired. Please log in again.",
            Self::LoggedOut => "Logged out.",
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::SessionExpired => warn!(notice = ?notice, "{}", notice.message()),
            Notice::LoggedOut => info!(notice = ?notice, "{}", notice.message()),
        }
    }
}

/// Keeps every notice it receives; handy for embedding and tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, notice: Notice) -> usize {
        self.notices()
            .into_iter()
            .filter(|seen| *seen == notice)
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}
