//! Permission gate: the console's view of "what may this user see".
//!
//! Lifecycle is `Unloaded -> Loading -> Loaded`. The predicates are
//! fail-open: while no snapshot is installed, or the relevant set is empty,
//! they answer `true` so the shell can render before (or without) identity
//! data. The server re-checks every permission.

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use campuscard_core::SessionContext;

use crate::{IdentityInfo, IdentitySource, Permission, Role, UserIdentity};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GateState {
    Unloaded,
    Loading,
    Loaded,
}

/// Roles, permissions and menus of the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSnapshot {
    pub user: Option<UserIdentity>,
    pub roles: Vec<Role>,
    pub permissions: Vec<Permission>,
    pub menus: BTreeSet<String>,
}

impl PermissionSnapshot {
    /// Snapshot used when there is no session or loading failed.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.permissions.is_empty() && self.menus.is_empty()
    }

    pub fn is_super_admin(&self) -> bool {
        self.roles.iter().any(Role::is_super_admin)
    }
}

impl From<IdentityInfo> for PermissionSnapshot {
    fn from(info: IdentityInfo) -> Self {
        Self {
            user: Some(info.user()),
            roles: info.roles,
            permissions: info.permissions,
            menus: info.menus.into_iter().collect(),
        }
    }
}

struct GateInner {
    state: GateState,
    // `None` until the first load completes; replaced wholesale by later loads.
    snapshot: Option<PermissionSnapshot>,
}

pub struct PermissionGate {
    session: Arc<SessionContext>,
    source: Arc<dyn IdentitySource>,
    inner: RwLock<GateInner>,
}

impl PermissionGate {
    pub fn new(session: Arc<SessionContext>, source: Arc<dyn IdentitySource>) -> Self {
        Self {
            session,
            source,
            inner: RwLock::new(GateInner {
                state: GateState::Unloaded,
                snapshot: None,
            }),
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, GateInner> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, GateInner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> GateState {
        self.read().state
    }

    /// True once a snapshot has been installed.
    pub fn is_loaded(&self) -> bool {
        self.read().snapshot.is_some()
    }

    pub fn snapshot(&self) -> Option<PermissionSnapshot> {
        self.read().snapshot.clone()
    }

    /// Fetch identity and install a fresh snapshot.
    ///
    /// Never fails: no session or any fetch error installs the empty
    /// snapshot. A previous snapshot keeps answering until the new one lands.
    pub async fn load(&self) -> PermissionSnapshot {
        self.write().state = GateState::Loading;

        let snapshot = if !self.session.has_token() {
            tracing::debug!("no session token; installing empty permission snapshot");
            PermissionSnapshot::empty()
        } else {
            match self.source.fetch_identity().await {
                Ok(info) => {
                    tracing::info!(
                        user = %info.username,
                        roles = info.roles.len(),
                        permissions = info.permissions.len(),
                        menus = info.menus.len(),
                        "permission snapshot loaded"
                    );
                    PermissionSnapshot::from(info)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "permission load failed; failing open");
                    PermissionSnapshot::empty()
                }
            }
        };

        let mut inner = self.write();
        inner.snapshot = Some(snapshot.clone());
        inner.state = GateState::Loaded;
        snapshot
    }

    /// Whether the user may perform the action guarded by `code`.
    ///
    /// No code means no permission is required.
    pub fn has_perm(&self, code: Option<&str>) -> bool {
        let Some(code) = code.filter(|c| !c.is_empty()) else {
            return true;
        };
        let inner = self.read();
        match inner.snapshot.as_ref() {
            None => true,
            Some(snapshot) if snapshot.permissions.is_empty() => true,
            Some(snapshot) => snapshot.permissions.iter().any(|p| p.grants(code)),
        }
    }

    /// Whether the menu entry / route at `path` may be shown and entered.
    ///
    /// Menus match by exact path only; there is no wildcard form.
    pub fn allow_menu(&self, path: Option<&str>) -> bool {
        let Some(path) = path.filter(|p| !p.is_empty()) else {
            return true;
        };
        let inner = self.read();
        match inner.snapshot.as_ref() {
            None => true,
            Some(snapshot) if snapshot.is_super_admin() => true,
            Some(snapshot) if snapshot.menus.is_empty() => true,
            Some(snapshot) => snapshot.menus.contains(path),
        }
    }
}
