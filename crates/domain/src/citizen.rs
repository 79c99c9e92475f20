//! Citizens: the reporting principals.

use crate::identifiers::CitizenId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Points deducted when a dispute is ruled to be the citizen's fault
pub const CITIZEN_FAULT_PENALTY: i64 = 10;

/// Reporting principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citizen {
    pub id: CitizenId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub reputation_points: i64,
    pub created_at: DateTime<Utc>,
}

impl Citizen {
    /// Fresh citizen with zero reputation
    pub fn new(name: impl Into<String>, phone: Option<String>) -> Self {
        Self {
            id: CitizenId::new(),
            name: name.into(),
            phone,
            reputation_points: 0,
            created_at: Utc::now(),
        }
    }
}
