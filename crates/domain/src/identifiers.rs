//! Strongly-typed identifier types for the civic issues domain.
//!
//! Every entity gets its own newtype over a UUID v7 so that an office id can
//! never be passed where an issue id is expected. The derived ordering is the
//! UUID byte order, which doubles as the deterministic tie-break used by
//! geographic queries.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new ID with a time-ordered UUID v7
            #[inline]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Create an ID from an existing UUID
            #[inline]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get a reference to the underlying UUID
            #[inline]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Convert to the underlying UUID
            #[inline]
            pub fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(OfficeId, "Unique identifier for administrative offices");

define_id!(
    AuthorityId,
    "Unique identifier for authority employees of an office"
);

define_id!(CitizenId, "Unique identifier for citizens");

define_id!(IssueId, "Unique identifier for reported issues");

define_id!(UpdateId, "Unique identifier for issue audit-trail updates");

define_id!(
    NotificationId,
    "Unique identifier for pending resolution decisions"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_creation() {
        let id = IssueId::new();
        assert_ne!(id.to_string(), "");
    }

    #[test]
    fn test_id_from_string() {
        let id1 = OfficeId::new();
        let s = id1.to_string();
        let id2: OfficeId = s.parse().unwrap();
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_id_ordering_follows_uuid() {
        let low = OfficeId::from_uuid(Uuid::from_u128(1));
        let high = OfficeId::from_uuid(Uuid::from_u128(2));
        assert!(low < high);
    }

    #[test]
    fn test_id_serialization_is_transparent() {
        let uuid = Uuid::now_v7();
        let id = CitizenId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }

    #[test]
    fn test_different_id_types() {
        let uuid = Uuid::now_v7();
        let issue_id = IssueId::from_uuid(uuid);
        let office_id = OfficeId::from_uuid(uuid);
        assert_eq!(issue_id.as_uuid(), office_id.as_uuid());
    }
}
