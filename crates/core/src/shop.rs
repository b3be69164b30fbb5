//! The shop record as the external directory publishes it.

use serde::{Deserialize, Serialize};

use crate::ShopId;

/// A shop in the directory.
///
/// Owned by the external directory service; this core treats it as read-only
/// input and never mutates or caches it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Shop {
    pub fn new(id: impl Into<ShopId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: None,
        }
    }
}
