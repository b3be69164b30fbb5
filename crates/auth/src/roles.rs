//! The closed role hierarchy.

use serde::{Deserialize, Serialize};

/// Role tier in the shop hierarchy.
///
/// The hierarchy is closed and totally ordered by privilege: `SuperAdmin`
/// outranks everything, `Guest` ranks below every staff role. Ordering goes
/// through [`Role::priority`] — roles are never compared as strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    SuperAdmin,
    Admin,
    Manager,
    Tailor,
    Salesman,
    EmbroideryMan,
    StoneMan,
    Guest,
}

/// Every role, highest privilege first.
pub const ALL_ROLES: [Role; 8] = [
    Role::SuperAdmin,
    Role::Admin,
    Role::Manager,
    Role::Tailor,
    Role::Salesman,
    Role::EmbroideryMan,
    Role::StoneMan,
    Role::Guest,
];

impl Role {
    /// Privilege rank, strictly decreasing down the hierarchy.
    ///
    /// Values are spaced so a tier can be inserted without renumbering.
    pub const fn priority(self) -> u8 {
        match self {
            Role::SuperAdmin => 80,
            Role::Admin => 70,
            Role::Manager => 60,
            Role::Tailor => 50,
            Role::Salesman => 40,
            Role::EmbroideryMan => 30,
            Role::StoneMan => 20,
            Role::Guest => 10,
        }
    }

    /// Parse a wire role name.
    ///
    /// Unknown names yield `None`; intake layers map that to [`Role::Guest`]
    /// (fail-closed) rather than rejecting the record.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "superAdmin" => Some(Role::SuperAdmin),
            "admin" => Some(Role::Admin),
            "manager" => Some(Role::Manager),
            "tailor" => Some(Role::Tailor),
            "salesman" => Some(Role::Salesman),
            "embroideryMan" => Some(Role::EmbroideryMan),
            "stoneMan" => Some(Role::StoneMan),
            "guest" => Some(Role::Guest),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "superAdmin",
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Tailor => "tailor",
            Role::Salesman => "salesman",
            Role::EmbroideryMan => "embroideryMan",
            Role::StoneMan => "stoneMan",
            Role::Guest => "guest",
        }
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.priority().cmp(&other.priority())
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
