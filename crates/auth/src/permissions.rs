//! Permission matrix: the single source of truth for capability checks.

use serde::{Deserialize, Serialize};

use crate::Role;

/// A capability the UI and command layers gate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Permission {
    ViewReports,
    CreateOrders,
    ViewCustomers,
    ViewAllOrders,
    ManageFabrics,
    ManageUsers,
    ManageShops,
    ViewFinance,
    SellFabrics,
    ViewOwnOrders,
    UpdateOrderStatus,
    ViewAllShops,
}

impl Role {
    /// Permissions granted by this role tier.
    ///
    /// Static table; nothing else grants permissions. Craft roles (tailor,
    /// embroidery, stone work) only see and progress their own orders;
    /// `ManageShops` stays with `SuperAdmin`.
    pub const fn permissions(self) -> &'static [Permission] {
        use Permission::*;
        match self {
            Role::SuperAdmin => &[
                ViewReports,
                CreateOrders,
                ViewCustomers,
                ViewAllOrders,
                ManageFabrics,
                ManageUsers,
                ManageShops,
                ViewFinance,
                SellFabrics,
                ViewOwnOrders,
                UpdateOrderStatus,
                ViewAllShops,
            ],
            Role::Admin => &[
                ViewReports,
                CreateOrders,
                ViewCustomers,
                ViewAllOrders,
                ManageFabrics,
                ManageUsers,
                ViewFinance,
                ViewOwnOrders,
                UpdateOrderStatus,
                ViewAllShops,
            ],
            Role::Manager => &[
                ViewReports,
                CreateOrders,
                ViewCustomers,
                ViewAllOrders,
                ManageFabrics,
                UpdateOrderStatus,
            ],
            Role::Tailor | Role::EmbroideryMan | Role::StoneMan => {
                &[ViewOwnOrders, UpdateOrderStatus]
            }
            Role::Salesman => &[CreateOrders, ViewCustomers, SellFabrics, ViewOwnOrders],
            Role::Guest => &[],
        }
    }

    /// Pure membership test against the static table (fail-closed).
    pub fn has_permission(self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}
