//! Session display scope and its transition guard.

use serde::{Deserialize, Serialize};

use darzi_auth::{Assignment, Permission, has_permission};

/// Session-level display scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    /// One shop's data at a time.
    SingleShop,
    /// Aggregate view across every accessible shop (privileged).
    AllShops,
}

impl ViewMode {
    /// Whether a session with these assignments may enter this mode.
    ///
    /// `AllShops` requires the `ViewAllShops` capability — unconditionally,
    /// including for sessions with zero assignments. `SingleShop` is always
    /// permitted.
    pub fn permitted_for(self, assignments: &[Assignment]) -> bool {
        match self {
            ViewMode::SingleShop => true,
            ViewMode::AllShops => has_permission(assignments, Permission::ViewAllShops, None),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ViewMode::SingleShop => "singleShop",
            ViewMode::AllShops => "allShops",
        }
    }
}

impl core::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
