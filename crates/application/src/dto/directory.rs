//! Office, authority and citizen read models

use chrono::{DateTime, Utc};
use civic_issues_domain::{Authority, AuthorityId, Citizen, CitizenId, Office, OfficeId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorityDto {
    pub id: AuthorityId,
    pub name: String,
    pub email: String,
    pub office_id: OfficeId,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
    pub is_representative: bool,
}

impl From<&Authority> for AuthorityDto {
    fn from(a: &Authority) -> Self {
        Self {
            id: a.id,
            name: a.name.clone(),
            email: a.email.clone(),
            office_id: a.office_id,
            role: a.role.clone(),
            department_name: a.department_name.clone(),
            is_representative: a.is_representative(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeDto {
    pub id: OfficeId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub employees: Vec<AuthorityDto>,
    pub created_at: DateTime<Utc>,
}

impl From<&Office> for OfficeDto {
    fn from(o: &Office) -> Self {
        Self {
            id: o.id,
            name: o.name.clone(),
            latitude: o.location.lat(),
            longitude: o.location.lon(),
            employees: o.employees.iter().map(AuthorityDto::from).collect(),
            created_at: o.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenDto {
    pub id: CitizenId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub reputation_points: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&Citizen> for CitizenDto {
    fn from(c: &Citizen) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            phone: c.phone.clone(),
            reputation_points: c.reputation_points,
            created_at: c.created_at,
        }
    }
}
