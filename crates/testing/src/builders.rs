//! Fluent builder pattern for constructing test data.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use civic_issues_application::validation::{AttachmentSlot, AttachmentUpload, CreateIssueRequest};
use civic_issues_domain::{
    Assignment, Authority, AuthorityId, CitizenId, Coordinate, Issue, IssueStatus, NewIssue,
    Office, OfficeId, Priority, REPRESENTATIVE_AUTHORITY,
};

fn coordinate(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon).expect("test coordinate out of range")
}

/// Builder for creating Issue test instances
#[derive(Clone)]
pub struct IssueBuilder {
    title: String,
    description: String,
    address: Option<String>,
    location: Coordinate,
    office_id: OfficeId,
    reporter_id: CitizenId,
    is_anonymous: bool,
    priority: Priority,
    status: IssueStatus,
    assignment: Option<Assignment>,
    created_at: Option<DateTime<Utc>>,
}

impl IssueBuilder {
    pub fn new() -> Self {
        Self {
            title: "Broken streetlight".to_string(),
            description: "The streetlight at the corner has been dark for a week".to_string(),
            address: Some("2nd Main Road".to_string()),
            location: coordinate(0.0, 0.0),
            office_id: OfficeId::new(),
            reporter_id: CitizenId::new(),
            is_anonymous: false,
            priority: Priority::Normal,
            status: IssueStatus::UnderReview,
            assignment: None,
            created_at: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn at(mut self, lat: f64, lon: f64) -> Self {
        self.location = coordinate(lat, lon);
        self
    }

    pub fn in_office(mut self, office_id: OfficeId) -> Self {
        self.office_id = office_id;
        self
    }

    pub fn reported_by(mut self, citizen_id: CitizenId) -> Self {
        self.reporter_id = citizen_id;
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.is_anonymous = true;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: IssueStatus) -> Self {
        self.status = status;
        self
    }

    pub fn assigned_to(mut self, authority_id: AuthorityId, department: impl Into<String>) -> Self {
        self.assignment = Some(Assignment {
            assigned_to_id: authority_id,
            department_name: department.into(),
            assigned_at: Utc::now(),
        });
        if self.status == IssueStatus::UnderReview {
            self.status = IssueStatus::Forwarded;
        }
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn build(self) -> Issue {
        let mut issue = Issue::new(NewIssue {
            title: self.title,
            description: self.description,
            address: self.address,
            location: self.location,
            office_id: self.office_id,
            reporter_id: self.reporter_id,
            is_anonymous: self.is_anonymous,
            priority: self.priority,
            image_url: None,
            audio_url: None,
        });
        issue.status = self.status;
        issue.assignment = self.assignment;
        if let Some(at) = self.created_at {
            issue.created_at = at;
            issue.updated_at = at;
        }
        issue
    }
}

impl Default for IssueBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating Office test instances
#[derive(Clone)]
pub struct OfficeBuilder {
    name: String,
    location: Coordinate,
}

impl OfficeBuilder {
    pub fn new() -> Self {
        Self {
            name: "Ward 7 Office".to_string(),
            location: coordinate(0.0, 0.0),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn at(mut self, lat: f64, lon: f64) -> Self {
        self.location = coordinate(lat, lon);
        self
    }

    pub fn build(self) -> Office {
        Office::new(self.name, self.location)
    }
}

impl Default for OfficeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for creating Authority test instances
#[derive(Clone)]
pub struct AuthorityBuilder {
    name: String,
    email: String,
    office_id: OfficeId,
    role: String,
    department_name: Option<String>,
}

impl AuthorityBuilder {
    pub fn new(office_id: OfficeId) -> Self {
        Self {
            name: "Asha Rao".to_string(),
            email: "asha.rao@ward7.gov.in".to_string(),
            office_id,
            role: "Road Engineer".to_string(),
            department_name: Some("engineering".to_string()),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    pub fn representative(mut self) -> Self {
        self.role = REPRESENTATIVE_AUTHORITY.to_string();
        self.department_name = Some("administration".to_string());
        self
    }

    pub fn in_department(mut self, department: impl Into<String>) -> Self {
        self.department_name = Some(department.into());
        self
    }

    pub fn build(self) -> Authority {
        Authority {
            id: AuthorityId::new(),
            name: self.name,
            email: self.email,
            office_id: self.office_id,
            role: self.role,
            department_name: self.department_name,
            created_at: Utc::now(),
        }
    }
}

/// Builder for issue submissions
#[derive(Clone)]
pub struct CreateIssueRequestBuilder {
    request: CreateIssueRequest,
}

impl CreateIssueRequestBuilder {
    pub fn new() -> Self {
        Self {
            request: CreateIssueRequest {
                title: "Pothole on 4th Cross".to_string(),
                description: "A deep pothole is causing two-wheelers to skid".to_string(),
                address: Some("4th Cross, Ward 7".to_string()),
                latitude: 0.001,
                longitude: 0.001,
                is_anonymous: false,
                image: None,
                audio: None,
            },
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.request.title = title.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.request.description = description.into();
        self
    }

    pub fn at(mut self, lat: f64, lon: f64) -> Self {
        self.request.latitude = lat;
        self.request.longitude = lon;
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.request.is_anonymous = true;
        self
    }

    pub fn with_image(mut self, content_type: &str, bytes: impl Into<Bytes>) -> Self {
        self.request.image = Some(AttachmentUpload::new(
            AttachmentSlot::Image,
            "photo.jpg",
            content_type,
            bytes,
        ));
        self
    }

    pub fn with_audio(mut self, content_type: &str, bytes: impl Into<Bytes>) -> Self {
        self.request.audio = Some(AttachmentUpload::new(
            AttachmentSlot::Audio,
            "note.mp3",
            content_type,
            bytes,
        ));
        self
    }

    pub fn build(self) -> CreateIssueRequest {
        self.request
    }
}

impl Default for CreateIssueRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_moves_issue_forward() {
        let issue = IssueBuilder::new()
            .assigned_to(AuthorityId::new(), "health")
            .build();
        assert_eq!(issue.status, IssueStatus::Forwarded);
        assert_eq!(issue.department_name(), Some("health"));
    }

    #[test]
    fn test_representative_builder() {
        let authority = AuthorityBuilder::new(OfficeId::new()).representative().build();
        assert!(authority.is_representative());
    }
}
