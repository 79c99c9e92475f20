//! Offices and the authority employees that staff them.

use crate::geo::Coordinate;
use crate::identifiers::{AuthorityId, OfficeId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role tag of the office lead, empowered to forward issues and rule on disputes
pub const REPRESENTATIVE_AUTHORITY: &str = "Representative authority";

/// Bucket used in department breakdowns for issues that were never forwarded
pub const UNASSIGNED_DEPARTMENT: &str = "Unassigned";

/// Administrative unit with a fixed location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Office {
    pub id: OfficeId,
    pub name: String,
    pub location: Coordinate,
    pub employees: Vec<Authority>,
    pub created_at: DateTime<Utc>,
}

impl Office {
    /// New office without staff
    pub fn new(name: impl Into<String>, location: Coordinate) -> Self {
        Self {
            id: OfficeId::new(),
            name: name.into(),
            location,
            employees: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Employee holding `role` in this office, compared case-insensitively
    pub fn employee_with_role(&self, role: &str) -> Option<&Authority> {
        self.employees
            .iter()
            .filter(|e| e.role.eq_ignore_ascii_case(role.trim()))
            .min_by_key(|e| e.id)
    }

    /// The office's representative authority, if provisioned
    pub fn representative(&self) -> Option<&Authority> {
        self.employee_with_role(REPRESENTATIVE_AUTHORITY)
    }
}

/// Employee principal of an office
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authority {
    pub id: AuthorityId,
    pub name: String,
    pub email: String,
    pub office_id: OfficeId,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Authority {
    /// Whether this authority leads its office
    pub fn is_representative(&self) -> bool {
        self.role.eq_ignore_ascii_case(REPRESENTATIVE_AUTHORITY)
    }

    /// Whether this authority works in `office_id`
    pub fn belongs_to(&self, office_id: OfficeId) -> bool {
        self.office_id == office_id
    }
}
