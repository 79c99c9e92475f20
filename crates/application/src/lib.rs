//! Application layer for the civic issues platform
//!
//! This crate orchestrates domain logic and coordinates between layers.
//!
//! ## Architecture
//!
//! The application layer sits between the domain and infrastructure layers.
//! Infrastructure concerns reach it only through the traits in [`ports`].
//!
//! ## Modules
//!
//! - `services` - IssueService and ProvisioningService
//! - `lifecycle` - Issue status state machine and its guards
//! - `geo_index` - Nearest-office placement and radius search
//! - `reporting` - Analytics and report aggregation
//! - `validation` - Input validation framework
//! - `dto` - Read models for the API layer
//! - `memory` - In-memory store for development and tests

pub mod dto;
pub mod geo_index;
pub mod lifecycle;
pub mod memory;
pub mod ports;
pub mod reporting;
pub mod services;
pub mod validation;

// Re-export commonly used types
pub use geo_index::{GeoIndex, Located, Ranked};
pub use lifecycle::{LifecycleEngine, Transition};
pub use memory::InMemoryIssueStore;
pub use ports::{
    AssignmentState, BlobStorage, DisabledBlobStorage, FixedPriorityAdvisor, IssueFilter,
    IssueStore, NoOpDispatcher, NotificationDispatcher, PriorityAdvisor,
};
pub use services::{
    IssueService, Principal, ProvisioningService, ServiceConfig, ServiceContext,
};
pub use validation::{Validatable, ValidationResult, ValidationRules};

use civic_issues_domain::AppError;

/// Result type of every service operation
pub type ApplicationResult<T> = Result<T, AppError>;
