//! The in-memory session aggregate.

use darzi_auth::{Assignment, Role, effective_role};
use darzi_core::ShopId;

use crate::gateway::UserProfile;
use crate::view::ViewMode;

/// A fully built authenticated session.
///
/// # Invariants
/// - `selected_shop`, when set, names an active assignment's shop, except for
///   `SuperAdmin` sessions, which may browse any shop in the directory.
/// - `view_mode == AllShops` only when the session carries the
///   `ViewAllShops` capability.
/// - `profile_role` is the highest-priority role among active assignments,
///   `Guest` when there are none.
///
/// Sessions are built whole and swapped in by the store; no caller ever
/// observes a partially constructed session, and nothing outside the store
/// mutates one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user: UserProfile,
    pub profile_role: Role,
    pub assignments: Vec<Assignment>,
    pub selected_shop: Option<ShopId>,
    pub view_mode: ViewMode,
}

impl Session {
    /// Build a session from canonical assignments.
    ///
    /// Default shop is the first active assignment's shop. The initial view
    /// mode is `SingleShop` when a default shop exists; otherwise `AllShops`
    /// when the effective role carries that capability, else `SingleShop`
    /// with no selection pending user action.
    pub(crate) fn build(user: UserProfile, assignments: Vec<Assignment>) -> Self {
        let profile_role = effective_role(&assignments);
        let selected_shop = assignments
            .iter()
            .find(|a| a.is_active())
            .map(|a| a.shop_id.clone());
        let view_mode = if selected_shop.is_some() {
            ViewMode::SingleShop
        } else if ViewMode::AllShops.permitted_for(&assignments) {
            ViewMode::AllShops
        } else {
            ViewMode::SingleShop
        };
        Self {
            user,
            profile_role,
            assignments,
            selected_shop,
            view_mode,
        }
    }
}
