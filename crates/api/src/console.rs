//! Console wiring: one session, one gateway, one observer, one gate.

use std::sync::Arc;

use tokio::task::JoinHandle;

use campuscard_auth::{GuardOutcome, PermissionGate, PermissionSnapshot, RouteGuard};
use campuscard_core::{GatewayResult, SessionContext};
use campuscard_gateway::{GatewayClient, GatewayConfig, Navigator, Notifier, SessionObserver};

use crate::GatewayIdentitySource;

pub struct Console {
    gateway: GatewayClient,
    gate: Arc<PermissionGate>,
    guard: RouteGuard,
    observer: JoinHandle<()>,
}

impl Console {
    /// Assemble the console and start its session observer.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(
        config: GatewayConfig,
        session: Arc<SessionContext>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> GatewayResult<Self> {
        let login_path = config.login_path.clone();
        let gateway = GatewayClient::new(config, session.clone())?;

        let observer = SessionObserver::new(session.clone(), navigator, notifier, login_path.clone())
            .spawn(gateway.subscribe());

        let source = Arc::new(GatewayIdentitySource::new(gateway.clone()));
        let gate = Arc::new(PermissionGate::new(session, source));
        let guard = RouteGuard::new(login_path, campuscard_auth::guard::DASHBOARD_PATH);

        Ok(Self {
            gateway,
            gate,
            guard,
            observer,
        })
    }

    pub fn gateway(&self) -> &GatewayClient {
        &self.gateway
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        self.gateway.session()
    }

    pub fn gate(&self) -> &Arc<PermissionGate> {
        &self.gate
    }

    /// Load permissions for the shell, unless we are on the login route.
    ///
    /// Returns the installed snapshot, or `None` when loading was skipped.
    pub async fn bootstrap(&self, current_path: &str) -> Option<PermissionSnapshot> {
        if current_path == self.guard.login_path() {
            tracing::debug!(path = current_path, "on login route; skipping permission load");
            return None;
        }
        Some(self.gate.load().await)
    }

    /// Guard a navigation to `target_path`.
    pub fn check_route(&self, target_path: &str, requires_auth: bool) -> GuardOutcome {
        self.guard.check(
            target_path,
            requires_auth,
            self.session().has_token(),
            &self.gate,
        )
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.observer.abort();
    }
}
