//! `darzi-infra` — storage backends for the session core.

pub mod sqlite;

pub use sqlite::SqliteSessionStore;
