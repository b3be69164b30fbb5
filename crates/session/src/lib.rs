//! `darzi-session` — session state machine and policy surface.
//!
//! Owns the mutable session aggregate for the shop suite: who is signed in,
//! which shops they may act in, which shop is selected, and whether the UI is
//! in single-shop or all-shops view. Auth flows, the shop directory, and
//! durable storage are injected seams; this crate holds no network or retry
//! policy of its own.

pub mod error;
pub mod gateway;
pub mod session;
pub mod snapshot;
pub mod storage;
pub mod store;
pub mod view;

pub use error::{ErrorKind, SessionError};
pub use gateway::{AuthGateway, AuthPayload, GatewayError, ShopDirectory, UserProfile};
pub use session::Session;
pub use snapshot::{KEY_SELECTED_SHOP, KEY_SNAPSHOT, KEY_VIEW_MODE, SessionSnapshot};
pub use storage::{InMemorySessionStorage, SessionStorage, StorageError};
pub use store::{SessionService, SessionState};
pub use view::ViewMode;
