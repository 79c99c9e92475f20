//! Civic Issues Domain Types
//!
//! Core domain model for the civic issue reporting platform: offices and
//! their authorities, citizens, issues with their status state machine and
//! audit trail, geodesy primitives, domain events and the error taxonomy.
//!
//! ## Architecture
//!
//! - **identifiers**: Strongly-typed UUID-based identifiers for all entities
//! - **geo**: Validated coordinates, haversine distance, bounding boxes
//! - **office**: Offices and authority employees
//! - **citizen**: Reporting citizens and reputation
//! - **issue**: Issues, status transitions, updates, pending decisions
//! - **events**: Domain events published after state changes
//! - **errors**: Error taxonomy with HTTP status codes
//!
//! ## Usage
//!
//! ```rust
//! use civic_issues_domain::{Coordinate, IssueStatus};
//!
//! let office = Coordinate::new(0.0, 0.0).unwrap();
//! let issue = Coordinate::new(0.001, 0.001).unwrap();
//! assert_eq!(office.distance_to(&issue).round(), 157.0);
//!
//! assert!(IssueStatus::UnderReview.can_transition_to(IssueStatus::Forwarded));
//! assert!(!IssueStatus::Resolved.can_transition_to(IssueStatus::InProgress));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod citizen;
pub mod errors;
pub mod events;
pub mod geo;
pub mod identifiers;
pub mod issue;
pub mod office;

pub use identifiers::*;
pub use errors::{AppError, AppResult};

pub use citizen::{Citizen, CITIZEN_FAULT_PENALTY};
pub use events::IssueEvent;
pub use geo::{haversine_meters, BoundingBox, Coordinate};
pub use issue::{
    Assignment, DecisionChange, Fault, Issue, IssueChange, IssueStatus, NewIssue, Notification,
    Priority, ReputationDelta, Update,
};
pub use office::{Authority, Office, REPRESENTATIVE_AUTHORITY, UNASSIGNED_DEPARTMENT};
