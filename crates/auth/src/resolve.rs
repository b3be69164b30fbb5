//! Pure access resolution over assignment snapshots.
//!
//! Everything here is total: missing or malformed data degrades to
//! `Guest`/empty results, never an error or a panic.

use darzi_core::{Shop, ShopId};

use crate::{Assignment, Permission, Role};

/// The highest-priority role among active assignments.
///
/// `Guest` when the list is empty or every assignment is inactive. Ties are
/// impossible: priority is a total order over distinct roles.
pub fn effective_role(assignments: &[Assignment]) -> Role {
    assignments
        .iter()
        .filter(|a| a.is_active())
        .map(|a| a.role)
        .max()
        .unwrap_or(Role::Guest)
}

/// The role in effect when acting within one specific shop.
///
/// An active assignment for that shop overrides the profile-wide maximum, so
/// authority cannot leak across shop boundaries; without a shop-specific
/// assignment the effective role applies.
pub fn shop_scoped_role(assignments: &[Assignment], shop_id: &ShopId) -> Role {
    assignments
        .iter()
        .find(|a| a.is_active() && a.shop_id == *shop_id)
        .map(|a| a.role)
        .unwrap_or_else(|| effective_role(assignments))
}

/// The shops a session may view or select, against a freshly fetched
/// directory.
///
/// `SuperAdmin` sees the whole directory; everyone else sees the subset
/// matching an active assignment. Assignments referencing shops absent from
/// the directory are skipped silently (stale references).
pub fn accessible_shops(assignments: &[Assignment], all_shops: &[Shop]) -> Vec<Shop> {
    if effective_role(assignments) == Role::SuperAdmin {
        return all_shops.to_vec();
    }
    all_shops
        .iter()
        .filter(|shop| {
            assignments
                .iter()
                .any(|a| a.is_active() && a.shop_id == shop.id)
        })
        .cloned()
        .collect()
}

/// Capability check with an explicit scope.
///
/// With a shop id the check runs against the shop-scoped role; without one it
/// runs against the effective role.
pub fn has_permission(
    assignments: &[Assignment],
    permission: Permission,
    shop_id: Option<&ShopId>,
) -> bool {
    let role = match shop_id {
        Some(id) => shop_scoped_role(assignments, id),
        None => effective_role(assignments),
    };
    role.has_permission(permission)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AssignmentStatus;
    use crate::roles::ALL_ROLES;
    use proptest::prelude::*;

    fn shop(id: &str) -> Shop {
        Shop::new(id, format!("Shop {id}"))
    }

    #[test]
    fn effective_role_of_empty_list_is_guest() {
        assert_eq!(effective_role(&[]), Role::Guest);
    }

    #[test]
    fn effective_role_ignores_inactive_assignments() {
        let assignments = vec![
            Assignment::new("s1", Role::Admin, AssignmentStatus::Inactive),
            Assignment::active("s2", Role::Tailor),
        ];
        assert_eq!(effective_role(&assignments), Role::Tailor);
    }

    #[test]
    fn effective_role_picks_highest_priority() {
        // Manager at s1, tailor at s2 → profile-wide role is manager.
        let assignments = vec![
            Assignment::active("s1", Role::Manager),
            Assignment::active("s2", Role::Tailor),
        ];
        assert_eq!(effective_role(&assignments), Role::Manager);
    }

    #[test]
    fn shop_scoped_role_prefers_local_assignment() {
        let assignments = vec![
            Assignment::active("s1", Role::Manager),
            Assignment::active("s2", Role::Tailor),
        ];
        assert_eq!(
            shop_scoped_role(&assignments, &ShopId::new("s2")),
            Role::Tailor
        );
    }

    #[test]
    fn shop_scoped_role_falls_back_to_effective_role() {
        let assignments = vec![Assignment::active("s1", Role::Manager)];
        assert_eq!(
            shop_scoped_role(&assignments, &ShopId::new("s9")),
            Role::Manager
        );
    }

    #[test]
    fn inactive_local_assignment_does_not_scope() {
        let assignments = vec![
            Assignment::new("s1", Role::Tailor, AssignmentStatus::Inactive),
            Assignment::active("s2", Role::Manager),
        ];
        assert_eq!(
            shop_scoped_role(&assignments, &ShopId::new("s1")),
            Role::Manager
        );
    }

    #[test]
    fn super_admin_sees_whole_directory() {
        // Even with zero assignments matching, the directory comes back whole.
        let assignments = vec![Assignment::active("hq", Role::SuperAdmin)];
        let directory = vec![shop("s1"), shop("s2"), shop("s3")];
        assert_eq!(accessible_shops(&assignments, &directory), directory);
    }

    #[test]
    fn non_super_admin_sees_assigned_subset_regardless_of_order() {
        let assignments = vec![
            Assignment::active("s1", Role::Manager),
            Assignment::active("s3", Role::Tailor),
        ];
        let forward = vec![shop("s1"), shop("s2"), shop("s3"), shop("s4"), shop("s5")];
        let mut reversed = forward.clone();
        reversed.reverse();

        let ids = |shops: Vec<Shop>| {
            let mut ids: Vec<String> = shops.into_iter().map(|s| s.id.into_string()).collect();
            ids.sort();
            ids
        };
        assert_eq!(ids(accessible_shops(&assignments, &forward)), ["s1", "s3"]);
        assert_eq!(ids(accessible_shops(&assignments, &reversed)), ["s1", "s3"]);
    }

    #[test]
    fn stale_assignments_are_filtered_silently() {
        let assignments = vec![
            Assignment::active("s1", Role::Manager),
            Assignment::active("gone", Role::Tailor),
        ];
        let directory = vec![shop("s1")];
        assert_eq!(accessible_shops(&assignments, &directory), vec![shop("s1")]);
    }

    #[test]
    fn permission_checks_respect_scope() {
        // Manager profile-wide, tailor inside s2.
        let assignments = vec![
            Assignment::active("s1", Role::Manager),
            Assignment::active("s2", Role::Tailor),
        ];
        assert!(has_permission(
            &assignments,
            Permission::ViewReports,
            None
        ));
        assert!(!has_permission(
            &assignments,
            Permission::ViewReports,
            Some(&ShopId::new("s2"))
        ));
        assert!(has_permission(
            &assignments,
            Permission::ViewOwnOrders,
            Some(&ShopId::new("s2"))
        ));
    }

    #[test]
    fn no_assignments_means_guest_and_no_permissions() {
        for permission in [
            Permission::ViewReports,
            Permission::ViewAllShops,
            Permission::ViewOwnOrders,
        ] {
            assert!(!has_permission(&[], permission, None));
        }
    }

    proptest! {
        /// `effective_role` always equals the maximum-priority active role.
        #[test]
        fn effective_role_is_max_priority_of_active(
            entries in prop::collection::vec((0usize..ALL_ROLES.len(), any::<bool>()), 0..8)
        ) {
            let assignments: Vec<Assignment> = entries
                .iter()
                .enumerate()
                .map(|(i, (role_idx, active))| Assignment::new(
                    format!("s{i}"),
                    ALL_ROLES[*role_idx],
                    if *active { AssignmentStatus::Active } else { AssignmentStatus::Inactive },
                ))
                .collect();

            let expected = assignments
                .iter()
                .filter(|a| a.is_active())
                .map(|a| a.role)
                .max_by_key(|r| r.priority())
                .unwrap_or(Role::Guest);

            prop_assert_eq!(effective_role(&assignments), expected);
        }
    }
}
