//! External collaborator seams: the auth flow and the shop directory.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use darzi_auth::RawAssignment;
use darzi_core::{Shop, UserId};

/// Profile data the auth flow resolves for a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: UserId,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserProfile {
    pub fn new(uid: impl Into<UserId>, display_name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            display_name: display_name.into(),
            email: None,
        }
    }
}

/// Everything a successful login yields: the resolved profile and the user's
/// shop assignments exactly as the service stores them.
#[derive(Debug, Clone)]
pub struct AuthPayload {
    pub user: UserProfile,
    pub assignments: Vec<RawAssignment>,
}

/// Failure of an external gateway call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("auth flow failed: {0}")]
    Auth(String),

    #[error("network error: {0}")]
    Network(String),
}

/// External authentication flow (sign-in provider, token exchange).
///
/// This core never performs the flow itself; it only consumes the result.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self) -> Result<AuthPayload, GatewayError>;
    async fn logout(&self) -> Result<(), GatewayError>;
}

/// Read-only shop directory.
///
/// No caching or retry policy lives on this side of the seam; callers get a
/// fresh fetch every time.
#[async_trait]
pub trait ShopDirectory: Send + Sync {
    async fn fetch_shops(&self) -> Result<Vec<Shop>, GatewayError>;
}
