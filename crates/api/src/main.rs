//! `campuscard-probe`: bootstrap an admin console session against a live API
//! and log the resulting permission snapshot.

use std::sync::Arc;

use campuscard_api::Console;
use campuscard_api::admin::{self, ADMIN_TOKEN_KEY, AdminLogin};
use campuscard_core::TokenSlot;
use campuscard_gateway::{GatewayConfig, MemoryNavigator, Navigator, Portal, TracingNotifier};

const TOKEN_ENV: &str = "CAMPUSCARD_TOKEN";
const USERNAME_ENV: &str = "CAMPUSCARD_USERNAME";
const PASSWORD_ENV: &str = "CAMPUSCARD_PASSWORD";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    campuscard_observability::init();

    let config = GatewayConfig::from_env(Portal::Admin)?;
    tracing::info!(base_url = %config.base_url, timeout = ?config.timeout, "probe starting");

    let start_path = std::env::args().nth(1).unwrap_or_else(|| "/dashboard".to_string());
    let session = Arc::new(config.in_memory_session());
    let navigator = Arc::new(MemoryNavigator::new(start_path.clone()));
    let console = Console::new(config, session.clone(), navigator.clone(), Arc::new(TracingNotifier))?;

    if let Ok(token) = std::env::var(TOKEN_ENV) {
        session.store_token(&TokenSlot::session(ADMIN_TOKEN_KEY), &token);
    } else if let (Ok(username), Ok(password)) =
        (std::env::var(USERNAME_ENV), std::env::var(PASSWORD_ENV))
    {
        let req = AdminLogin { username, password };
        admin::auth::login_and_store(console.gateway(), &req, false).await?;
    } else {
        tracing::warn!("neither {TOKEN_ENV} nor {USERNAME_ENV}/{PASSWORD_ENV} set; probing anonymously");
    }

    match console.bootstrap(&start_path).await {
        Some(snapshot) => tracing::info!(
            user = ?snapshot.user,
            roles = ?snapshot.roles,
            permissions = snapshot.permissions.len(),
            menus = snapshot.menus.len(),
            super_admin = snapshot.is_super_admin(),
            "permission snapshot"
        ),
        None => tracing::info!(path = %start_path, "login route; nothing to load"),
    }

    tracing::info!(
        path = %navigator.current_path(),
        outcome = ?console.check_route(&start_path, true),
        "route check"
    );

    Ok(())
}
