//! Repository implementations
//!
//! PostgreSQL-backed implementation of the application's persistence port.

mod issue_store;
mod rows;

pub use issue_store::PgIssueStore;
