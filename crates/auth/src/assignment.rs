//! Shop assignments: the relation binding one user to one shop.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use darzi_core::{ShopId, normalize_shop_ref};

use crate::Role;

/// Whether an assignment currently grants anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssignmentStatus {
    Active,
    Inactive,
}

impl AssignmentStatus {
    pub const fn is_active(self) -> bool {
        matches!(self, AssignmentStatus::Active)
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "active" => Some(AssignmentStatus::Active),
            "inactive" => Some(AssignmentStatus::Inactive),
            _ => None,
        }
    }
}

/// One user's role at one shop.
///
/// # Invariants
/// - `shop_id` is canonical (already normalized).
/// - A user holds at most one assignment per shop; intake enforces this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub shop_id: ShopId,
    pub role: Role,
    pub status: AssignmentStatus,
}

impl Assignment {
    pub fn new(shop_id: impl Into<ShopId>, role: Role, status: AssignmentStatus) -> Self {
        Self {
            shop_id: shop_id.into(),
            role,
            status,
        }
    }

    /// Convenience constructor for an active assignment.
    pub fn active(shop_id: impl Into<ShopId>, role: Role) -> Self {
        Self::new(shop_id, role, AssignmentStatus::Active)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// An assignment exactly as the backing service returns it.
///
/// `shop` may be a bare id string, an id-bearing object, or a single-element
/// array of either; `role` and `status` are free-form strings.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAssignment {
    #[serde(alias = "shopId")]
    pub shop: Value,
    pub role: String,
    pub status: String,
}

impl RawAssignment {
    pub fn new(shop: Value, role: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            shop,
            role: role.into(),
            status: status.into(),
        }
    }
}

/// Build canonical assignments from raw service records.
///
/// Records whose shop reference cannot be normalized are dropped with a
/// warning. Unknown role names resolve to `Guest` and unknown statuses to
/// `Inactive` (fail-closed in both directions). A later record for an
/// already-seen shop is dropped, keeping the first occurrence.
pub fn build_assignments(raw: &[RawAssignment]) -> Vec<Assignment> {
    let mut assignments: Vec<Assignment> = Vec::with_capacity(raw.len());
    for record in raw {
        let Some(shop_id) = normalize_shop_ref(&record.shop) else {
            tracing::warn!(shop = %record.shop, "dropping assignment with malformed shop reference");
            continue;
        };
        if assignments.iter().any(|a| a.shop_id == shop_id) {
            tracing::warn!(shop = %shop_id, "dropping duplicate assignment for shop");
            continue;
        }
        let role = Role::parse(&record.role).unwrap_or_else(|| {
            tracing::warn!(role = %record.role, shop = %shop_id, "unknown role name, treating as guest");
            Role::Guest
        });
        let status = AssignmentStatus::parse(&record.status).unwrap_or_else(|| {
            tracing::warn!(status = %record.status, shop = %shop_id, "unknown assignment status, treating as inactive");
            AssignmentStatus::Inactive
        });
        assignments.push(Assignment {
            shop_id,
            role,
            status,
        });
    }
    assignments
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_from_every_reference_shape() {
        let raw = vec![
            RawAssignment::new(json!("s1"), "manager", "active"),
            RawAssignment::new(json!({"id": "s2"}), "tailor", "active"),
            RawAssignment::new(json!([{"id": "s3"}]), "salesman", "inactive"),
        ];
        let assignments = build_assignments(&raw);
        assert_eq!(
            assignments,
            vec![
                Assignment::active("s1", Role::Manager),
                Assignment::active("s2", Role::Tailor),
                Assignment::new("s3", Role::Salesman, AssignmentStatus::Inactive),
            ]
        );
    }

    #[test]
    fn malformed_shop_reference_is_dropped() {
        let raw = vec![
            RawAssignment::new(json!([]), "manager", "active"),
            RawAssignment::new(json!({"name": "no id"}), "admin", "active"),
            RawAssignment::new(json!("s1"), "tailor", "active"),
        ];
        let assignments = build_assignments(&raw);
        assert_eq!(assignments, vec![Assignment::active("s1", Role::Tailor)]);
    }

    #[test]
    fn unknown_role_falls_back_to_guest() {
        let raw = vec![RawAssignment::new(json!("s1"), "shopOwner", "active")];
        assert_eq!(build_assignments(&raw)[0].role, Role::Guest);
    }

    #[test]
    fn unknown_status_falls_back_to_inactive() {
        let raw = vec![RawAssignment::new(json!("s1"), "manager", "enabled")];
        assert_eq!(build_assignments(&raw)[0].status, AssignmentStatus::Inactive);
    }

    #[test]
    fn duplicate_shop_keeps_first_occurrence() {
        let raw = vec![
            RawAssignment::new(json!("s1"), "tailor", "active"),
            RawAssignment::new(json!({"id": "s1"}), "admin", "active"),
        ];
        let assignments = build_assignments(&raw);
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].role, Role::Tailor);
    }

    #[test]
    fn raw_assignment_deserializes_with_shop_id_alias() {
        let raw: RawAssignment =
            serde_json::from_value(json!({"shopId": "s7", "role": "manager", "status": "active"}))
                .expect("raw assignment should deserialize");
        let assignments = build_assignments(&[raw]);
        assert_eq!(assignments, vec![Assignment::active("s7", Role::Manager)]);
    }
}
