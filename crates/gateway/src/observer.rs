//! Session observer: turns gateway signals into notices and navigation.
//!
//! The gateway never navigates. It tears the session down and publishes a
//! [`SessionSignal`]; whoever owns the UI subscribes and runs a
//! [`SessionObserver`] with its own [`Navigator`] and [`Notifier`].

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use campuscard_core::SessionContext;

pub const SESSION_EXPIRED_NOTICE: &str = "session expired, please sign in again";
pub const FORBIDDEN_NOTICE: &str = "no permission to access this resource";

/// Published by the gateway after classifying an auth-related failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSignal {
    /// A 401 was received at `at`; tokens are already cleared.
    Expired { at: DateTime<Utc>, message: String },
    /// A 403 was received.
    Forbidden { message: String },
}

/// Route control of the host application.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;

    /// Replace the current history entry (no back-navigation to it).
    fn replace(&self, path: &str);
}

/// User-visible notices of the host application.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
    fn warning(&self, message: &str);
}

/// Navigator that only tracks the current path (headless clients, tests).
#[derive(Debug)]
pub struct MemoryNavigator {
    current: Mutex<String>,
    replacements: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            current: Mutex::new(initial_path.into()),
            replacements: Mutex::new(Vec::new()),
        }
    }

    /// Every path passed to `replace`, in order.
    pub fn replacements(&self) -> Vec<String> {
        self.replacements
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Simulate user navigation.
    pub fn visit(&self, path: impl Into<String>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = path.into();
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn replace(&self, path: &str) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = path.to_string();
        self.replacements
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(path.to_string());
    }
}

/// Notifier that writes notices to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::error!(notice = message, "user notice");
    }

    fn warning(&self, message: &str) {
        tracing::warn!(notice = message, "user notice");
    }
}

pub struct SessionObserver {
    session: Arc<SessionContext>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
    login_path: String,
}

impl SessionObserver {
    pub fn new(
        session: Arc<SessionContext>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            session,
            navigator,
            notifier,
            login_path: login_path.into(),
        }
    }

    /// React to one signal.
    ///
    /// `Expired`: debounced error notice unless already on the login route,
    /// then a history-replacing redirect to login (skipped when already
    /// there, so concurrent expiries redirect once).
    /// `Forbidden`: warning notice only.
    pub fn handle(&self, signal: &SessionSignal) {
        match signal {
            SessionSignal::Expired { at, message } => {
                let on_login = self.navigator.current_path() == self.login_path;
                if !on_login && self.session.try_claim_expiry_notice(*at) {
                    self.notifier.error(SESSION_EXPIRED_NOTICE);
                }
                if !on_login {
                    tracing::info!(reason = %message, to = %self.login_path, "redirecting to login");
                    self.navigator.replace(&self.login_path);
                }
            }
            SessionSignal::Forbidden { message } => {
                tracing::debug!(reason = %message, "forbidden response");
                self.notifier.warning(FORBIDDEN_NOTICE);
            }
        }
    }

    /// Handle signals from `rx` on a background task until the gateway is dropped.
    pub fn spawn(self, mut rx: broadcast::Receiver<SessionSignal>) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(signal) => self.handle(&signal),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "session observer lagged behind gateway signals");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}
