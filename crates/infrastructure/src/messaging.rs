//! Messaging module - issue event egress over Redis pub/sub
//!
//! Every committed lifecycle event is wrapped in an [`EventMessage`] envelope
//! and published once to `{channel_prefix}{topic}`. Delivery is at-most-once:
//! a subscriber that is not listening misses the message. Downstream SMS
//! gateways read the `sms` field of the envelope.

use async_trait::async_trait;
use civic_issues_application::NotificationDispatcher;
use civic_issues_common::RedisConfig;
use civic_issues_domain::errors::IntegrationError;
use civic_issues_domain::{Fault, IssueEvent};
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::{Error, Result};

const SOURCE: &str = "civic-issues";

/// Event message wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMessage<T> {
    /// Unique message ID
    pub id: String,
    /// Event type name
    pub event_type: String,
    /// Event timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Event payload
    pub payload: T,
    /// Source service/component
    pub source: String,
    /// Short text for the citizen's phone
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms: Option<String>,
}

impl<T: Serialize> EventMessage<T> {
    /// Create a new event message.
    pub fn new(event_type: impl Into<String>, payload: T, source: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            event_type: event_type.into(),
            timestamp: chrono::Utc::now(),
            payload,
            source: source.into(),
            sms: None,
        }
    }

    /// Attach the SMS text.
    pub fn with_sms(mut self, body: impl Into<String>) -> Self {
        self.sms = Some(body.into());
        self
    }
}

impl<'a> EventMessage<&'a IssueEvent> {
    /// Envelope for an issue event, SMS text included.
    pub fn for_event(event: &'a IssueEvent) -> Self {
        Self::new(event.topic(), event, SOURCE).with_sms(sms_body(event))
    }
}

/// Text sent to the reporting citizen for an event
pub fn sms_body(event: &IssueEvent) -> String {
    match event {
        IssueEvent::IssueCreated { issue_id, .. } => {
            format!("Issue {} has been submitted successfully", issue_id)
        }
        IssueEvent::IssueForwarded {
            issue_id,
            department_name,
            ..
        } => format!(
            "Issue {} has been forwarded to the {} department",
            issue_id, department_name
        ),
        IssueEvent::StatusChanged {
            issue_id,
            new_status,
            description,
            ..
        } => format!(
            "Issue {} is now {}: {}",
            issue_id,
            new_status.as_str(),
            description
        ),
        IssueEvent::IssueResolved { title, .. } => {
            format!("Issue with title {} has been resolved successfully", title)
        }
        IssueEvent::ResolutionConfirmed { issue_id, .. } => {
            format!("Thank you for confirming the resolution of issue {}", issue_id)
        }
        IssueEvent::ResolutionDisputed { issue_id, .. } => {
            format!("Your dispute on issue {} has been recorded", issue_id)
        }
        IssueEvent::DisputeRuled {
            issue_id,
            fault: Fault::Citizen,
            reputation_delta,
            ..
        } => format!(
            "The dispute on issue {} was ruled against you ({} reputation points)",
            issue_id, reputation_delta
        ),
        IssueEvent::DisputeRuled {
            issue_id,
            fault: Fault::Authority,
            ..
        } => format!("The dispute on issue {} was upheld", issue_id),
    }
}

/// Messaging health status.
#[derive(Debug, Clone)]
pub struct MessagingHealthStatus {
    /// Whether Redis answered PING
    pub healthy: bool,
    /// Round-trip latency
    pub latency: Duration,
    /// Error message if unhealthy
    pub error: Option<String>,
}

/// Redis-backed notification dispatcher.
#[derive(Clone)]
pub struct RedisDispatcher {
    connection: ConnectionManager,
    channel_prefix: String,
}

impl RedisDispatcher {
    /// Connect to the configured Redis server.
    #[instrument(skip(config))]
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| Error::Configuration("redis.url not set".to_string()))?;
        info!("Initializing Redis messaging");

        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        info!("Redis messaging initialized successfully");
        Ok(Self {
            connection,
            channel_prefix: config.channel_prefix.clone(),
        })
    }

    /// Build the full channel name with prefix.
    pub fn full_channel(&self, topic: &str) -> String {
        format!("{}{}", self.channel_prefix, topic)
    }

    async fn publish(&self, event: &IssueEvent) -> Result<usize> {
        let channel = self.full_channel(event.topic());
        let payload = serde_json::to_string(&EventMessage::for_event(event))?;

        let mut conn = self.connection.clone();
        let receivers: usize = conn.publish(&channel, payload).await?;
        Ok(receivers)
    }

    /// Check messaging health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> MessagingHealthStatus {
        let start = std::time::Instant::now();

        let mut conn = self.connection.clone();
        match redis::cmd("PING").query_async::<_, String>(&mut conn).await {
            Ok(response) if response == "PONG" => MessagingHealthStatus {
                healthy: true,
                latency: start.elapsed(),
                error: None,
            },
            Ok(response) => MessagingHealthStatus {
                healthy: false,
                latency: start.elapsed(),
                error: Some(format!("Unexpected response: {}", response)),
            },
            Err(e) => {
                warn!(error = %e, "Messaging health check failed");
                MessagingHealthStatus {
                    healthy: false,
                    latency: start.elapsed(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

#[async_trait]
impl NotificationDispatcher for RedisDispatcher {
    #[instrument(skip(self, event), fields(topic = event.topic(), issue_id = %event.issue_id()))]
    async fn dispatch(&self, event: &IssueEvent) -> std::result::Result<(), IntegrationError> {
        match self.publish(event).await {
            Ok(receivers) => {
                debug!(receivers, "Event published");
                Ok(())
            }
            Err(e) => Err(IntegrationError::Messaging(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civic_issues_domain::{CitizenId, IssueId, IssueStatus, NotificationId, OfficeId};

    #[test]
    fn test_envelope_carries_event_and_sms() {
        let event = IssueEvent::IssueResolved {
            issue_id: IssueId::new(),
            office_id: OfficeId::new(),
            reporter_id: CitizenId::new(),
            notification_id: NotificationId::new(),
            title: "Broken streetlight".to_string(),
            message: "Lamp replaced".to_string(),
        };

        let json = serde_json::to_value(EventMessage::for_event(&event)).unwrap();
        assert_eq!(json["event_type"], "issue.resolved");
        assert_eq!(json["source"], "civic-issues");
        assert_eq!(json["payload"]["type"], "issue_resolved");
        assert_eq!(
            json["sms"],
            "Issue with title Broken streetlight has been resolved successfully"
        );
    }

    #[test]
    fn test_status_change_sms_names_new_status() {
        let event = IssueEvent::StatusChanged {
            issue_id: IssueId::new(),
            office_id: OfficeId::new(),
            reporter_id: CitizenId::new(),
            old_status: IssueStatus::Forwarded,
            new_status: IssueStatus::InProgress,
            description: "Crew dispatched".to_string(),
        };
        assert!(sms_body(&event).ends_with("is now IN_PROGRESS: Crew dispatched"));
    }

    #[test]
    fn test_citizen_fault_sms_mentions_points() {
        let event = IssueEvent::DisputeRuled {
            issue_id: IssueId::new(),
            office_id: OfficeId::new(),
            reporter_id: CitizenId::new(),
            fault: Fault::Citizen,
            reputation_delta: -10,
        };
        assert!(sms_body(&event).contains("-10 reputation points"));
    }
}
