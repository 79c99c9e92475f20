//! Attachment media-type and size rules

use bytes::Bytes;
use civic_issues_domain::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which attachment slot of an issue a file fills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentSlot {
    Image,
    Audio,
}

impl AttachmentSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
        }
    }

    /// Storage folder for files in this slot
    pub fn folder(&self) -> &'static str {
        match self {
            Self::Image => "issues/images",
            Self::Audio => "issues/audio",
        }
    }

    /// Whether a declared media type belongs to this slot's family
    pub fn accepts(&self, content_type: &str) -> bool {
        let family = content_type
            .split('/')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        family == self.as_str() && content_type.contains('/')
    }
}

impl fmt::Display for AttachmentSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uploaded file received with a new issue
#[derive(Debug, Clone)]
pub struct AttachmentUpload {
    pub slot: AttachmentSlot,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl AttachmentUpload {
    pub fn new(
        slot: AttachmentSlot,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            slot,
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Reject files outside the slot's media family, empty files and files
    /// above `max_bytes`
    pub fn validate(&self, max_bytes: u64) -> Result<(), ValidationError> {
        let reject = |reason: String| ValidationError::InvalidAttachment {
            slot: self.slot.to_string(),
            reason,
        };

        if !self.slot.accepts(&self.content_type) {
            return Err(reject(format!(
                "expected an {}/* file, got '{}'",
                self.slot, self.content_type
            )));
        }
        if self.bytes.is_empty() {
            return Err(reject("file is empty".to_string()));
        }
        if self.size() > max_bytes {
            return Err(reject(format!(
                "file is {} bytes, the limit is {} bytes",
                self.size(),
                max_bytes
            )));
        }
        Ok(())
    }
}
