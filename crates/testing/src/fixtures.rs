//! Test fixtures for generating domain entities with realistic data.
//!
//! `TestWorld` wires the in-memory store and the recording mocks into the
//! application services, seeded with one office, its representative, an
//! engineer and a citizen.

use crate::builders::{AuthorityBuilder, OfficeBuilder};
use crate::mocks::{AdvisorBehavior, MemoryBlobStorage, MockNotificationDispatcher, StubPriorityAdvisor};
use civic_issues_application::{
    InMemoryIssueStore, IssueService, IssueStore, ProvisioningService, ServiceConfig,
    ServiceContext,
};
use civic_issues_domain::{Authority, Citizen, Issue, Office};
use fake::{
    faker::{address::en::CityName, name::en::Name, phone_number::en::PhoneNumber},
    Fake,
};
use std::sync::Arc;

/// Create a test citizen with a random name
pub fn create_test_citizen() -> Citizen {
    Citizen::new(Name().fake::<String>(), Some(PhoneNumber().fake()))
}

/// Create a test office at the given coordinate
pub fn create_test_office_at(lat: f64, lon: f64) -> Office {
    OfficeBuilder::new()
        .named(format!("{} Ward Office", CityName().fake::<String>()))
        .at(lat, lon)
        .build()
}

/// Create a test authority employed by `office`
pub fn create_test_authority(office: &Office, role: &str) -> Authority {
    let name: String = Name().fake();
    let email = format!(
        "{}@{}.gov.in",
        name.to_lowercase().replace(' ', "."),
        office.id
    );
    AuthorityBuilder::new(office.id)
        .named(name)
        .with_email(email)
        .with_role(role)
        .build()
}

/// Role given to the seeded engineer
pub const ENGINEER_ROLE: &str = "Road Engineer";
/// Department given to the seeded engineer
pub const ENGINEER_DEPARTMENT: &str = "engineering";

/// Fully wired services over in-memory collaborators
pub struct TestWorld {
    pub store: Arc<InMemoryIssueStore>,
    pub dispatcher: Arc<MockNotificationDispatcher>,
    pub advisor: Arc<StubPriorityAdvisor>,
    pub storage: Arc<MemoryBlobStorage>,
    pub issues: IssueService,
    pub provisioning: ProvisioningService,
    pub office: Office,
    pub representative: Authority,
    pub engineer: Authority,
    pub citizen: Citizen,
}

impl TestWorld {
    /// Seeded world with the office at the origin and a classifier answering NORMAL
    pub async fn new() -> Self {
        Self::builder().build().await
    }

    pub fn builder() -> TestWorldBuilder {
        TestWorldBuilder::default()
    }

    pub fn citizen_ctx(&self) -> ServiceContext {
        ServiceContext::citizen(self.citizen.id, "test-citizen")
    }

    pub fn representative_ctx(&self) -> ServiceContext {
        ServiceContext::authority(self.representative.id, "test-representative")
    }

    pub fn engineer_ctx(&self) -> ServiceContext {
        ServiceContext::authority(self.engineer.id, "test-engineer")
    }

    pub fn admin_ctx(&self) -> ServiceContext {
        ServiceContext::admin("test-admin")
    }

    /// Register another citizen in the store
    pub async fn add_citizen(&self) -> Citizen {
        let citizen = create_test_citizen();
        self.store
            .insert_citizen(&citizen)
            .await
            .expect("citizen insert failed");
        citizen
    }

    /// Register another office with a representative
    pub async fn add_office_at(&self, lat: f64, lon: f64) -> (Office, Authority) {
        let office = create_test_office_at(lat, lon);
        self.store.insert_office(&office).await.expect("office insert failed");
        let representative = AuthorityBuilder::new(office.id)
            .with_email(format!("rep@{}.gov.in", office.id))
            .representative()
            .build();
        self.store
            .insert_authority(&representative)
            .await
            .expect("authority insert failed");
        (office, representative)
    }

    /// Insert an issue directly, bypassing placement
    pub async fn seed_issue(&self, issue: Issue) -> Issue {
        self.store.insert_issue(&issue).await.expect("issue insert failed");
        issue
    }

    pub async fn reload(&self, issue: &Issue) -> Issue {
        self.store
            .get_issue(issue.id)
            .await
            .expect("issue lookup failed")
            .expect("issue missing")
    }

    pub async fn reload_citizen(&self, citizen: &Citizen) -> Citizen {
        self.store
            .get_citizen(citizen.id)
            .await
            .expect("citizen lookup failed")
            .expect("citizen missing")
    }
}

/// Configures the collaborators of a `TestWorld`
pub struct TestWorldBuilder {
    office_location: (f64, f64),
    advisor: AdvisorBehavior,
    storage: MemoryBlobStorage,
    dispatcher: MockNotificationDispatcher,
    config: ServiceConfig,
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self {
            office_location: (0.0, 0.0),
            advisor: AdvisorBehavior::Answer(civic_issues_domain::Priority::Normal),
            storage: MemoryBlobStorage::new(),
            dispatcher: MockNotificationDispatcher::new(),
            config: ServiceConfig::default(),
        }
    }
}

impl TestWorldBuilder {
    pub fn office_at(mut self, lat: f64, lon: f64) -> Self {
        self.office_location = (lat, lon);
        self
    }

    pub fn with_advisor(mut self, behavior: AdvisorBehavior) -> Self {
        self.advisor = behavior;
        self
    }

    pub fn with_storage(mut self, storage: MemoryBlobStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: MockNotificationDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn build(self) -> TestWorld {
        let store = Arc::new(InMemoryIssueStore::new());
        let dispatcher = Arc::new(self.dispatcher);
        let advisor = Arc::new(StubPriorityAdvisor::new(self.advisor));
        let storage = Arc::new(self.storage);

        let (lat, lon) = self.office_location;
        let office = create_test_office_at(lat, lon);
        store.insert_office(&office).await.expect("office insert failed");

        let representative = AuthorityBuilder::new(office.id)
            .named("Office Representative")
            .with_email(format!("rep@{}.gov.in", office.id))
            .representative()
            .build();
        let engineer = AuthorityBuilder::new(office.id)
            .with_email(format!("engineer@{}.gov.in", office.id))
            .with_role(ENGINEER_ROLE)
            .in_department(ENGINEER_DEPARTMENT)
            .build();
        store
            .insert_authority(&representative)
            .await
            .expect("authority insert failed");
        store
            .insert_authority(&engineer)
            .await
            .expect("authority insert failed");

        let citizen = create_test_citizen();
        store
            .insert_citizen(&citizen)
            .await
            .expect("citizen insert failed");

        let office = store
            .get_office(office.id)
            .await
            .expect("office lookup failed")
            .expect("office missing");

        let issues = IssueService::new(
            store.clone(),
            storage.clone(),
            dispatcher.clone(),
            advisor.clone(),
            self.config,
        );
        let provisioning = ProvisioningService::new(store.clone());

        TestWorld {
            store,
            dispatcher,
            advisor,
            storage,
            issues,
            provisioning,
            office,
            representative,
            engineer,
            citizen,
        }
    }
}
