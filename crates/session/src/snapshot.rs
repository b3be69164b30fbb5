//! Durable session snapshot and the keys it lives under.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use darzi_auth::{Assignment, Role};
use darzi_core::ShopId;

use crate::gateway::UserProfile;
use crate::session::Session;
use crate::view::ViewMode;

/// Scalar key holding the selected shop id (absent when none is selected).
pub const KEY_SELECTED_SHOP: &str = "selectedShopId";
/// Scalar key holding the view mode.
pub const KEY_VIEW_MODE: &str = "viewMode";
/// Namespaced key holding the full session snapshot.
pub const KEY_SNAPSHOT: &str = "darzi.session";

/// All durable keys, written together on every accepted mutation and deleted
/// together on logout.
pub(crate) const ALL_KEYS: [&str; 3] = [KEY_SELECTED_SHOP, KEY_VIEW_MODE, KEY_SNAPSHOT];

/// Durable image of a session.
///
/// Rehydration re-validates everything in here; a stored snapshot is a hint,
/// never an authority. In particular the profile role is recomputed and the
/// selected shop and view mode are re-checked against the assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub user: UserProfile,
    pub profile_role: Role,
    pub assignments: Vec<Assignment>,
    pub selected_shop: Option<ShopId>,
    pub view_mode: ViewMode,
    pub is_authenticated: bool,
    pub persisted_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn of(session: &Session) -> Self {
        Self {
            user: session.user.clone(),
            profile_role: session.profile_role,
            assignments: session.assignments.clone(),
            selected_shop: session.selected_shop.clone(),
            view_mode: session.view_mode,
            is_authenticated: true,
            persisted_at: Utc::now(),
        }
    }
}
