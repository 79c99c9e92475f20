//! Error types for the civic issues domain.
//!
//! The hierarchy follows the platform's error taxonomy: validation, not found,
//! unauthorized, conflict, upstream unavailable and internal failures. Every
//! variant carries a stable machine-readable code and maps to an HTTP status.

use crate::identifiers::*;
use crate::issue::IssueStatus;

/// Top-level application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed input
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(#[from] NotFoundError),

    /// Role or ownership guard failed
    #[error("Unauthorized: {0}")]
    Authorization(#[from] AuthorizationError),

    /// Request conflicts with current state
    #[error("Conflict: {0}")]
    Conflict(#[from] ConflictError),

    /// External collaborator failed (storage, classifier, messaging)
    #[error("Upstream unavailable: {0}")]
    Integration(#[from] IntegrationError),

    /// Persistence failure
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Invariant violation or other unexpected failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Get the specific error code for this error
    ///
    /// Error codes are used in API responses for programmatic error handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(e) => e.code(),
            Self::NotFound(e) => e.code(),
            Self::Authorization(e) => e.code(),
            Self::Conflict(e) => e.code(),
            Self::Integration(e) => e.code(),
            Self::Database(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::Authorization(
                AuthorizationError::AuthenticationRequired | AuthorizationError::InvalidToken(_),
            ) => 401,
            Self::Authorization(_) => 403,
            Self::Conflict(_) => 409,
            Self::Integration(_) => 503,
            Self::Database(_) | Self::Internal(_) => 500,
        }
    }

    /// Whether the message may contain backend details that should not reach clients
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }

}

/// Input validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Field validation failed
    #[error("Field validation failed: {field} - {message}")]
    FieldValidation {
        /// Offending field
        field: String,
        /// What is wrong with it
        message: String,
    },

    /// Multiple validation errors
    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<String>),

    /// Latitude or longitude outside the legal range
    #[error("Invalid coordinates: ({lat}, {lon})")]
    InvalidCoordinates {
        /// Latitude as supplied
        lat: f64,
        /// Longitude as supplied
        lon: f64,
    },

    /// Attachment has the wrong media family or exceeds the size ceiling
    #[error("Invalid attachment '{slot}': {reason}")]
    InvalidAttachment {
        /// Attachment slot (image or audio)
        slot: String,
        /// Why it was rejected
        reason: String,
    },
}

impl ValidationError {
    /// Shorthand for a single field failure
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FieldValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::FieldValidation { .. } | Self::Multiple(_) => "VALIDATION_ERROR",
            Self::InvalidCoordinates { .. } => "INVALID_COORDINATES",
            Self::InvalidAttachment { .. } => "INVALID_ATTACHMENT",
        }
    }
}

/// Missing entity errors
#[derive(Debug, thiserror::Error)]
pub enum NotFoundError {
    /// Office not found
    #[error("Office not found: {0}")]
    Office(OfficeId),

    /// No office exists to own a new issue
    #[error("No offices available")]
    NoOfficesAvailable,

    /// Issue not found
    #[error("Issue not found: {0}")]
    Issue(IssueId),

    /// Authority not found
    #[error("Authority not found: {0}")]
    Authority(AuthorityId),

    /// No employee with the requested role in the office
    #[error("No employee with role '{role}' in office {office_id}")]
    Employee {
        /// Office searched
        office_id: OfficeId,
        /// Role requested
        role: String,
    },

    /// Citizen not found
    #[error("Citizen not found: {0}")]
    Citizen(CitizenId),

    /// Pending decision not found for the issue
    #[error("Notification not found: {0}")]
    Notification(NotificationId),
}

impl NotFoundError {
    /// Machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Office(_) => "OFFICE_NOT_FOUND",
            Self::NoOfficesAvailable => "NO_OFFICES_AVAILABLE",
            Self::Issue(_) => "ISSUE_NOT_FOUND",
            Self::Authority(_) => "AUTHORITY_NOT_FOUND",
            Self::Employee { .. } => "EMPLOYEE_NOT_FOUND",
            Self::Citizen(_) => "CITIZEN_NOT_FOUND",
            Self::Notification(_) => "NOTIFICATION_NOT_FOUND",
        }
    }
}

/// Authorization errors
#[derive(Debug, thiserror::Error)]
pub enum AuthorizationError {
    /// Authentication required
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Bearer token could not be verified
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Principal kind not allowed to perform the action
    #[error("Insufficient permissions for action: {action}")]
    InsufficientPermissions {
        /// Action attempted
        action: String,
    },

    /// Authority is not the representative of the owning office
    #[error("Only the representative authority may {action}")]
    NotRepresentative {
        /// Action attempted
        action: String,
    },

    /// Authority belongs to a different office than the issue
    #[error("Issue {issue_id} belongs to another office")]
    OfficeMismatch {
        /// Issue concerned
        issue_id: IssueId,
    },

    /// Citizen does not own the issue
    #[error("Issue {issue_id} was reported by another citizen")]
    NotIssueOwner {
        /// Issue concerned
        issue_id: IssueId,
    },
}

impl AuthorizationError {
    /// Shorthand for a permission failure
    pub fn insufficient(action: impl Into<String>) -> Self {
        Self::InsufficientPermissions {
            action: action.into(),
        }
    }

    /// Machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthenticationRequired => "AUTHENTICATION_REQUIRED",
            Self::InvalidToken(_) => "INVALID_TOKEN",
            Self::InsufficientPermissions { .. } => "INSUFFICIENT_PERMISSIONS",
            Self::NotRepresentative { .. } => "NOT_REPRESENTATIVE",
            Self::OfficeMismatch { .. } => "OFFICE_MISMATCH",
            Self::NotIssueOwner { .. } => "NOT_ISSUE_OWNER",
        }
    }
}

/// State conflicts
#[derive(Debug, thiserror::Error)]
pub enum ConflictError {
    /// Citizen already upvoted the issue
    #[error("Citizen {citizen_id} has already upvoted issue {issue_id}")]
    AlreadyVoted {
        /// Issue voted on
        issue_id: IssueId,
        /// Voter
        citizen_id: CitizenId,
    },

    /// Citizen has not upvoted the issue
    #[error("Citizen {citizen_id} has not upvoted issue {issue_id}")]
    NotVoted {
        /// Issue concerned
        issue_id: IssueId,
        /// Citizen concerned
        citizen_id: CitizenId,
    },

    /// Requested status change is not in the transition table
    #[error("Issue status transition not allowed: {from} -> {to}")]
    InvalidStatusTransition {
        /// Current status
        from: IssueStatus,
        /// Requested status
        to: IssueStatus,
    },

    /// Issue is not waiting for a citizen decision
    #[error("Issue {0} is not awaiting a resolution decision")]
    NotAwaitingDecision(IssueId),

    /// Issue has no open dispute
    #[error("Issue {0} is not disputed")]
    NotDisputed(IssueId),

    /// Office name already taken
    #[error("Duplicate office: {0}")]
    DuplicateOffice(String),

    /// Role already held within the office
    #[error("Role '{role}' already held in office {office_id}")]
    DuplicateRole {
        /// Office concerned
        office_id: OfficeId,
        /// Role requested
        role: String,
    },

    /// Entity with this identifier already exists
    #[error("Duplicate identifier: {0}")]
    DuplicateId(String),

    /// Issue changed since it was read
    #[error("Issue {0} was modified concurrently")]
    ConcurrentModification(IssueId),
}

impl ConflictError {
    /// Machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyVoted { .. } => "ALREADY_VOTED",
            Self::NotVoted { .. } => "NOT_VOTED",
            Self::InvalidStatusTransition { .. } => "INVALID_STATUS_TRANSITION",
            Self::NotAwaitingDecision(_) => "NOT_AWAITING_DECISION",
            Self::NotDisputed(_) => "NOT_DISPUTED",
            Self::DuplicateOffice(_) => "DUPLICATE_OFFICE",
            Self::DuplicateRole { .. } => "DUPLICATE_ROLE",
            Self::DuplicateId(_) => "DUPLICATE_ID",
            Self::ConcurrentModification(_) => "CONCURRENT_MODIFICATION",
        }
    }
}

/// External collaborator errors
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    /// Blob storage rejected or failed the upload
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Priority classifier failed
    #[error("Classifier error: {0}")]
    Classifier(String),

    /// Messaging egress failed
    #[error("Messaging error: {0}")]
    Messaging(String),

    /// Timeout waiting for service
    #[error("Timeout waiting for {service}: {timeout_ms}ms")]
    Timeout {
        /// Collaborator name
        service: String,
        /// Budget that elapsed
        timeout_ms: u64,
    },
}

impl IntegrationError {
    /// Machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::UploadFailed(_) => "UPLOAD_FAILED",
            Self::Classifier(_) => "CLASSIFIER_UNAVAILABLE",
            Self::Messaging(_) => "MESSAGING_UNAVAILABLE",
            Self::Timeout { .. } => "UPSTREAM_TIMEOUT",
        }
    }
}

/// Database errors
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// Connection pool exhausted
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Query execution failed
    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    /// Transaction failed
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Stored row could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Application-wide result type
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::from(NotFoundError::NoOfficesAvailable);
        assert_eq!(err.error_code(), "NO_OFFICES_AVAILABLE");
        assert_eq!(err.http_status(), 404);

        let err = AppError::from(AuthorizationError::AuthenticationRequired);
        assert_eq!(err.http_status(), 401);

        let err = AppError::from(AuthorizationError::NotRepresentative {
            action: "forward issues".into(),
        });
        assert_eq!(err.http_status(), 403);
        assert_eq!(err.error_code(), "NOT_REPRESENTATIVE");
    }

    #[test]
    fn test_conflicts_map_to_409() {
        let err = AppError::from(ConflictError::AlreadyVoted {
            issue_id: IssueId::new(),
            citizen_id: CitizenId::new(),
        });
        assert_eq!(err.http_status(), 409);
        assert_eq!(err.error_code(), "ALREADY_VOTED");
    }

    #[test]
    fn test_upstream_and_internal() {
        let err = AppError::from(IntegrationError::UploadFailed("s3 down".into()));
        assert_eq!(err.http_status(), 503);

        let err = AppError::from(DatabaseError::QueryFailed("boom".into()));
        assert!(err.is_internal());
        assert_eq!(err.http_status(), 500);
    }
}
