//! Application state and dependency injection.
//!
//! Every collaborator behind the application ports is chosen once at start-up
//! from [`AppConfig`] and shared with the handlers through Axum's state
//! extraction.

use crate::config::ApiConfig;
use civic_issues_application::{
    BlobStorage, FixedPriorityAdvisor, InMemoryIssueStore, IssueService, IssueStore,
    NoOpDispatcher, NotificationDispatcher, PriorityAdvisor, ProvisioningService, ServiceConfig,
};
use civic_issues_common::{AppConfig, StorageProvider};
use civic_issues_infrastructure::{
    DatabasePool, HttpPriorityAdvisor, LocalBlobStorage, PgIssueStore, RedisDispatcher,
    S3BlobStorage,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Application state shared across all requests
#[derive(Clone)]
pub struct AppState {
    /// API configuration
    pub config: Arc<ApiConfig>,

    /// Issue lifecycle, search and reporting
    pub issues: Arc<IssueService>,

    /// Offices, authorities and citizens
    pub provisioning: Arc<ProvisioningService>,

    /// Database pool, when persistence is PostgreSQL
    pub database: Option<DatabasePool>,
}

/// Collaborators behind the application ports
pub struct Backends {
    /// Durable storage
    pub store: Arc<dyn IssueStore>,
    /// Attachment storage
    pub storage: Arc<dyn BlobStorage>,
    /// Notification egress
    pub dispatcher: Arc<dyn NotificationDispatcher>,
    /// Priority classifier
    pub advisor: Arc<dyn PriorityAdvisor>,
}

impl Backends {
    /// In-memory store, local files under `./uploads`, no messaging, NORMAL priority
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(InMemoryIssueStore::new()),
            storage: Arc::new(LocalBlobStorage::new(&Default::default())),
            dispatcher: Arc::new(NoOpDispatcher),
            advisor: Arc::new(FixedPriorityAdvisor::default()),
        }
    }
}

impl AppState {
    /// Assemble state from already built collaborators.
    pub fn new(config: ApiConfig, backends: Backends, service_config: ServiceConfig) -> Self {
        let issues = IssueService::new(
            Arc::clone(&backends.store),
            backends.storage,
            backends.dispatcher,
            backends.advisor,
            service_config,
        );

        Self {
            config: Arc::new(config),
            issues: Arc::new(issues),
            provisioning: Arc::new(ProvisioningService::new(backends.store)),
            database: None,
        }
    }

    /// Connect every backend the configuration names.
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let mut backends = Backends::in_memory();
        let mut database = None;

        match config.database.url {
            Some(_) => {
                let pool = DatabasePool::new(&config.database).await?;
                if config.database.run_migrations {
                    pool.migrate().await?;
                }
                backends.store = Arc::new(PgIssueStore::new(pool.pool().clone()));
                database = Some(pool);
                info!("Using PostgreSQL issue store");
            }
            None => warn!("database.url not set; issues are kept in memory"),
        }

        backends.storage = match config.storage.provider {
            StorageProvider::S3 => Arc::new(S3BlobStorage::new(&config.storage).await?),
            StorageProvider::LocalFileSystem => {
                info!(root = %config.storage.local_root, "Storing attachments on the local filesystem");
                Arc::new(LocalBlobStorage::new(&config.storage))
            }
        };

        if config.redis.url.is_some() {
            backends.dispatcher = Arc::new(RedisDispatcher::new(&config.redis).await?);
            info!(prefix = %config.redis.channel_prefix, "Publishing issue events to Redis");
        } else {
            warn!("redis.url not set; issue events are only logged");
        }

        if config.classifier.enabled {
            backends.advisor = Arc::new(HttpPriorityAdvisor::new(
                &config.classifier,
                config.issues.classifier_timeout(),
            )?);
            info!(model = %config.classifier.model, "Priority classifier enabled");
        }

        let mut state = Self::new(
            ApiConfig::from(config),
            backends,
            ServiceConfig::from(&config.issues),
        );
        state.database = database;
        Ok(state)
    }

    /// Get the JWT secret
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt_secret
    }
}
