//! Testing utilities for the civic issues platform
//!
//! This crate provides:
//! - Test fixtures for domain types, with a fully wired in-memory service world
//! - Builder patterns for issues, offices, authorities and requests
//! - Recording mocks of the dispatcher, classifier and blob storage ports
//!
//! # Examples
//!
//! ```
//! use civic_issues_testing::{builders::*, fixtures::*};
//!
//! let citizen = create_test_citizen();
//! let issue = IssueBuilder::new()
//!     .reported_by(citizen.id)
//!     .with_title("Broken streetlight")
//!     .build();
//! assert_eq!(issue.reporter_id, citizen.id);
//! ```

pub mod builders;
pub mod fixtures;
pub mod mocks;

// Re-export commonly used types
pub use builders::*;
pub use fixtures::*;
pub use mocks::*;

// Re-export testing dependencies for convenience
pub use fake;
pub use proptest;
