//! Data Transfer Objects (DTOs) for API layer
//!
//! Read models returned by the services. They never expose the reporter of an
//! anonymous issue and serialize with camelCase keys.

mod directory;
mod issue;
mod report;

pub use directory::*;
pub use issue::*;
pub use report::*;
