//! The session store: the only mutation path for session state.
//!
//! All mutations replace the whole [`Session`] value under the state lock
//! (copy-and-swap), so two operations issued back-to-back can never observe
//! or produce a half-updated session. Durable writes happen strictly after
//! the in-memory commit and never fail a mutation; a crash between commit
//! and persistence is recovered by the next login, not by trusting storage.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use darzi_auth::{Permission, Role, build_assignments, resolve};
use darzi_core::{Shop, ShopId};

use crate::error::{ErrorKind, SessionError};
use crate::gateway::{AuthGateway, AuthPayload, ShopDirectory};
use crate::session::Session;
use crate::snapshot::{ALL_KEYS, KEY_SELECTED_SHOP, KEY_SNAPSHOT, KEY_VIEW_MODE, SessionSnapshot};
use crate::storage::SessionStorage;
use crate::view::ViewMode;

/// Authentication state of the session service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn(Session),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::LoggedIn(_))
    }
}

/// Owner of the mutable session aggregate.
///
/// One instance per UI context, collaborators injected. Login/logout are
/// serialized by a re-entrancy guard: a second flow started while one is in
/// flight is rejected, never queued.
pub struct SessionService {
    gateway: Arc<dyn AuthGateway>,
    directory: Arc<dyn ShopDirectory>,
    storage: Arc<dyn SessionStorage>,
    state: RwLock<SessionState>,
    last_error: RwLock<Option<ErrorKind>>,
    flow_in_flight: AtomicBool,
}

/// Resets the re-entrancy flag when a flow ends, including on panic/cancel.
struct FlowGuard<'a>(&'a AtomicBool);

impl Drop for FlowGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SessionService {
    pub fn new(
        gateway: Arc<dyn AuthGateway>,
        directory: Arc<dyn ShopDirectory>,
        storage: Arc<dyn SessionStorage>,
    ) -> Self {
        Self {
            gateway,
            directory,
            storage,
            state: RwLock::new(SessionState::LoggedOut),
            last_error: RwLock::new(None),
            flow_in_flight: AtomicBool::new(false),
        }
    }

    // Critical sections under these locks never panic, so a poisoned lock can
    // only come from a caller's panic; recover the guard rather than wedge the
    // session.
    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Read surface
    // ─────────────────────────────────────────────────────────────────────

    pub fn state(&self) -> SessionState {
        self.read_state().clone()
    }

    pub fn session(&self) -> Option<Session> {
        match &*self.read_state() {
            SessionState::LoggedIn(session) => Some(session.clone()),
            SessionState::LoggedOut => None,
        }
    }

    /// Last gateway failure, if any; cleared by the next accepted flow.
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Profile-wide effective role; `Guest` when logged out.
    pub fn effective_role(&self) -> Role {
        match &*self.read_state() {
            SessionState::LoggedIn(session) => session.profile_role,
            SessionState::LoggedOut => Role::Guest,
        }
    }

    /// Role in effect within one specific shop; `Guest` when logged out.
    pub fn shop_scoped_role(&self, shop_id: &ShopId) -> Role {
        match &*self.read_state() {
            SessionState::LoggedIn(session) => {
                resolve::shop_scoped_role(&session.assignments, shop_id)
            }
            SessionState::LoggedOut => Role::Guest,
        }
    }

    /// Capability check with explicit scope; always false when logged out.
    pub fn has_permission(&self, permission: Permission, shop_id: Option<&ShopId>) -> bool {
        match &*self.read_state() {
            SessionState::LoggedIn(session) => {
                resolve::has_permission(&session.assignments, permission, shop_id)
            }
            SessionState::LoggedOut => false,
        }
    }

    /// Shops this session may see, against a freshly fetched directory.
    pub async fn accessible_shops(&self) -> Result<Vec<Shop>, SessionError> {
        let assignments = match &*self.read_state() {
            SessionState::LoggedIn(session) => session.assignments.clone(),
            SessionState::LoggedOut => return Err(SessionError::NotAuthenticated),
        };
        let shops = self
            .directory
            .fetch_shops()
            .await
            .map_err(|err| SessionError::Gateway(err.to_string()))?;
        Ok(resolve::accessible_shops(&assignments, &shops))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Auth flows
    // ─────────────────────────────────────────────────────────────────────

    /// Run the external login flow and install the resulting session.
    pub async fn login(&self) -> Result<Session, SessionError> {
        let _guard = self.begin_flow()?;
        match self.gateway.login().await {
            Ok(payload) => {
                self.set_error(None);
                Ok(self.set_auth(payload))
            }
            Err(err) => {
                tracing::warn!(%err, "login flow rejected by auth gateway");
                self.set_error(Some(ErrorKind::AuthGatewayFailure(err.to_string())));
                Err(SessionError::Gateway(err.to_string()))
            }
        }
    }

    /// Run the external logout flow, then drop the session.
    ///
    /// Gateway rejection leaves the session exactly as it was; nothing is
    /// cleared until the flow succeeds.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let _guard = self.begin_flow()?;
        if !self.read_state().is_authenticated() {
            return Ok(());
        }
        match self.gateway.logout().await {
            Ok(()) => {
                self.set_error(None);
                self.clear_auth();
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%err, "logout flow rejected by auth gateway");
                self.set_error(Some(ErrorKind::AuthGatewayFailure(err.to_string())));
                Err(SessionError::Gateway(err.to_string()))
            }
        }
    }

    fn begin_flow(&self) -> Result<FlowGuard<'_>, SessionError> {
        if self
            .flow_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SessionError::FlowInFlight);
        }
        Ok(FlowGuard(&self.flow_in_flight))
    }

    fn set_error(&self, error: Option<ErrorKind>) {
        *self
            .last_error
            .write()
            .unwrap_or_else(PoisonError::into_inner) = error;
    }

    // ─────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────

    /// Install a freshly authenticated session.
    ///
    /// The whole session is built before the state is replaced; persistence
    /// follows the swap.
    pub fn set_auth(&self, payload: AuthPayload) -> Session {
        let assignments = build_assignments(&payload.assignments);
        let session = Session::build(payload.user, assignments);
        tracing::info!(
            user = %session.user.uid,
            role = %session.profile_role,
            shops = session.assignments.len(),
            "session established"
        );
        *self.write_state() = SessionState::LoggedIn(session.clone());
        self.persist(&session);
        session
    }

    /// Select the shop the session acts within.
    ///
    /// Accepted when the id names an active assignment, or for `SuperAdmin`
    /// sessions, which may browse any shop in the directory. Acceptance
    /// switches to single-shop view. Rejection leaves state untouched.
    pub fn set_selected_shop(&self, shop_id: ShopId) -> Result<(), SessionError> {
        let next = {
            let mut state = self.write_state();
            let SessionState::LoggedIn(session) = &mut *state else {
                return Err(SessionError::NotAuthenticated);
            };
            let assigned = session
                .assignments
                .iter()
                .any(|a| a.is_active() && a.shop_id == shop_id);
            if !assigned && session.profile_role != Role::SuperAdmin {
                return Err(SessionError::PermissionDenied {
                    denied: "select a shop without an active assignment",
                });
            }
            let mut next = session.clone();
            next.selected_shop = Some(shop_id);
            next.view_mode = ViewMode::SingleShop;
            *session = next.clone();
            next
        };
        self.persist(&next);
        Ok(())
    }

    /// Switch between single-shop and all-shops view.
    ///
    /// Entering `AllShops` requires the `ViewAllShops` capability and clears
    /// the selected shop. Rejection leaves state untouched.
    pub fn set_view_mode(&self, mode: ViewMode) -> Result<(), SessionError> {
        let next = {
            let mut state = self.write_state();
            let SessionState::LoggedIn(session) = &mut *state else {
                return Err(SessionError::NotAuthenticated);
            };
            if !mode.permitted_for(&session.assignments) {
                return Err(SessionError::PermissionDenied {
                    denied: "enter the all-shops view",
                });
            }
            let mut next = session.clone();
            next.view_mode = mode;
            if mode == ViewMode::AllShops {
                next.selected_shop = None;
            }
            *session = next.clone();
            next
        };
        self.persist(&next);
        Ok(())
    }

    /// Drop the session and delete every durable key.
    ///
    /// Idempotent: calling while logged out changes nothing.
    pub fn clear_auth(&self) {
        let was_logged_in = {
            let mut state = self.write_state();
            let logged_in = state.is_authenticated();
            *state = SessionState::LoggedOut;
            logged_in
        };
        if !was_logged_in {
            return;
        }
        for key in ALL_KEYS {
            if let Err(err) = self.storage.delete(key) {
                tracing::error!(key, %err, "failed to delete durable session key");
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Persistence & rehydration
    // ─────────────────────────────────────────────────────────────────────

    /// Restore a persisted session on startup.
    ///
    /// The snapshot is re-validated, never trusted: the profile role is
    /// recomputed from the stored assignments, a selected shop without a
    /// surviving active assignment is dropped (unless `SuperAdmin`), and an
    /// `AllShops` mode without the capability is downgraded. Corrupt
    /// snapshots are discarded.
    pub fn hydrate(&self) -> SessionState {
        let raw = match self.storage.get(KEY_SNAPSHOT) {
            Ok(Some(raw)) => raw,
            Ok(None) => return SessionState::LoggedOut,
            Err(err) => {
                tracing::warn!(%err, "session snapshot unreadable, starting logged out");
                return SessionState::LoggedOut;
            }
        };
        let snapshot: SessionSnapshot = match serde_json::from_str(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(%err, "corrupt session snapshot, discarding");
                for key in ALL_KEYS {
                    let _ = self.storage.delete(key);
                }
                return SessionState::LoggedOut;
            }
        };
        if !snapshot.is_authenticated {
            return SessionState::LoggedOut;
        }

        let assignments = snapshot.assignments;
        let profile_role = resolve::effective_role(&assignments);
        let view_mode = if snapshot.view_mode.permitted_for(&assignments) {
            snapshot.view_mode
        } else {
            tracing::warn!("persisted all-shops view no longer permitted, downgrading");
            ViewMode::SingleShop
        };
        let selected_shop = if view_mode == ViewMode::AllShops {
            None
        } else {
            snapshot.selected_shop.filter(|id| {
                profile_role == Role::SuperAdmin
                    || assignments.iter().any(|a| a.is_active() && a.shop_id == *id)
            })
        };

        let session = Session {
            user: snapshot.user,
            profile_role,
            assignments,
            selected_shop,
            view_mode,
        };
        *self.write_state() = SessionState::LoggedIn(session.clone());
        self.persist(&session);
        SessionState::LoggedIn(session)
    }

    /// Write-after-commit persistence of the three durable keys.
    ///
    /// Failures are logged, never surfaced: the next login re-derives state,
    /// so a stale durable value is recoverable and never authoritative.
    fn persist(&self, session: &Session) {
        let snapshot = SessionSnapshot::of(session);
        let payload = match serde_json::to_string(&snapshot) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::error!(%err, "failed to serialize session snapshot");
                return;
            }
        };
        let selected = session
            .selected_shop
            .as_ref()
            .map(|id| id.as_str().to_owned());
        let writes = [
            (KEY_SNAPSHOT, Some(payload)),
            (KEY_VIEW_MODE, Some(session.view_mode.as_str().to_owned())),
            (KEY_SELECTED_SHOP, selected),
        ];
        for (key, value) in writes {
            let result = match &value {
                Some(value) => self.storage.put(key, value),
                None => self.storage.delete(key),
            };
            if let Err(err) = result {
                tracing::error!(key, %err, "failed to persist durable session key");
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
