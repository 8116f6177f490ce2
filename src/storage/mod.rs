//! Storage implementations.
//!
//! One SQLite database holds the four funnel tables. Uniqueness and
//! at-most-one-poster guarantees live in the store (constraints, conditional
//! updates, per-row claims) rather than in application-level read-then-write
//! checks.

pub mod helpers;
pub mod schema;
pub mod sqlite;

pub use sqlite::{ContentClaim, SqliteStore};
