//! Mock implementations of the collaborator ports.
//!
//! Each mock records what it was asked to do so tests can assert on it.

use async_trait::async_trait;
use bytes::Bytes;
use civic_issues_application::ports::{BlobStorage, NotificationDispatcher, PriorityAdvisor};
use civic_issues_domain::errors::IntegrationError;
use civic_issues_domain::{IssueEvent, Priority};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Recording notification dispatcher
pub struct MockNotificationDispatcher {
    pub dispatched: Arc<RwLock<Vec<IssueEvent>>>,
    fail: bool,
}

impl MockNotificationDispatcher {
    pub fn new() -> Self {
        Self {
            dispatched: Arc::new(RwLock::new(Vec::new())),
            fail: false,
        }
    }

    /// Dispatcher that records the event and then reports a messaging failure
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn events(&self) -> Vec<IssueEvent> {
        self.dispatched.read().clone()
    }

    pub fn topics(&self) -> Vec<&'static str> {
        self.dispatched.read().iter().map(|e| e.topic()).collect()
    }

    pub fn event_count(&self) -> usize {
        self.dispatched.read().len()
    }

    /// Wait until at least `count` events were dispatched; dispatch runs on a
    /// spawned task
    pub async fn wait_for(&self, count: usize) -> Vec<IssueEvent> {
        for _ in 0..200 {
            if self.event_count() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.events()
    }
}

impl Default for MockNotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationDispatcher for MockNotificationDispatcher {
    async fn dispatch(&self, event: &IssueEvent) -> Result<(), IntegrationError> {
        self.dispatched.write().push(event.clone());
        if self.fail {
            return Err(IntegrationError::Messaging("broker unreachable".to_string()));
        }
        Ok(())
    }
}

/// How the stub classifier answers
#[derive(Debug, Clone, Copy)]
pub enum AdvisorBehavior {
    Answer(Priority),
    Fail,
    /// Never answers within any realistic budget
    Hang,
}

/// Scripted priority advisor
pub struct StubPriorityAdvisor {
    behavior: AdvisorBehavior,
    calls: AtomicUsize,
}

impl StubPriorityAdvisor {
    pub fn new(behavior: AdvisorBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn answering(priority: Priority) -> Self {
        Self::new(AdvisorBehavior::Answer(priority))
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for StubPriorityAdvisor {
    fn default() -> Self {
        Self::answering(Priority::Normal)
    }
}

#[async_trait]
impl PriorityAdvisor for StubPriorityAdvisor {
    async fn classify(&self, _text: &str) -> Result<Priority, IntegrationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            AdvisorBehavior::Answer(priority) => Ok(priority),
            AdvisorBehavior::Fail => Err(IntegrationError::Classifier("quota exceeded".to_string())),
            AdvisorBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Priority::Severe)
            }
        }
    }
}

/// A blob that was stored
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub folder: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
    pub url: String,
}

/// In-memory blob storage
pub struct MemoryBlobStorage {
    pub blobs: Arc<RwLock<Vec<StoredBlob>>>,
    fail: bool,
}

impl MemoryBlobStorage {
    pub fn new() -> Self {
        Self {
            blobs: Arc::new(RwLock::new(Vec::new())),
            fail: false,
        }
    }

    /// Storage that rejects every upload
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    pub fn stored(&self) -> Vec<StoredBlob> {
        self.blobs.read().clone()
    }
}

impl Default for MemoryBlobStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    async fn store(
        &self,
        bytes: Bytes,
        folder: &str,
        file_name: &str,
        content_type: &str,
    ) -> Result<String, IntegrationError> {
        if self.fail {
            return Err(IntegrationError::UploadFailed("bucket unavailable".to_string()));
        }
        let mut blobs = self.blobs.write();
        let url = format!("memory://{}/{}-{}", folder, blobs.len(), file_name);
        blobs.push(StoredBlob {
            folder: folder.to_string(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
            url: url.clone(),
        });
        Ok(url)
    }
}
