//! Provisioning Service
//!
//! Administrative creation of offices, their authority employees and citizens.

use super::ServiceContext;
use crate::dto::{AuthorityDto, CitizenDto, OfficeDto};
use crate::ports::IssueStore;
use crate::validation::{
    CreateAuthorityRequest, CreateCitizenRequest, CreateOfficeRequest, Validatable,
};
use crate::ApplicationResult;
use chrono::Utc;
use civic_issues_domain::errors::NotFoundError;
use civic_issues_domain::{Authority, AuthorityId, Citizen, Coordinate, Office, OfficeId};
use std::sync::Arc;
use tracing::{info, instrument};

pub struct ProvisioningService {
    store: Arc<dyn IssueStore>,
}

impl ProvisioningService {
    pub fn new(store: Arc<dyn IssueStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn create_office(
        &self,
        ctx: &ServiceContext,
        request: CreateOfficeRequest,
    ) -> ApplicationResult<OfficeDto> {
        ctx.require_admin("create offices")?;
        request.validate_all().ensure_valid()?;

        let location = Coordinate::new(request.latitude, request.longitude)?;
        let office = Office::new(request.name.trim(), location);
        self.store.insert_office(&office).await?;

        info!(office_id = %office.id, name = %office.name, "Office created");
        Ok(OfficeDto::from(&office))
    }

    #[instrument(skip(self, ctx), fields(correlation_id = %ctx.correlation_id))]
    pub async fn list_offices(&self, ctx: &ServiceContext) -> ApplicationResult<Vec<OfficeDto>> {
        ctx.require_admin("list offices")?;
        let offices = self.store.list_offices().await?;
        Ok(offices.iter().map(OfficeDto::from).collect())
    }

    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn add_authority(
        &self,
        ctx: &ServiceContext,
        office_id: OfficeId,
        request: CreateAuthorityRequest,
    ) -> ApplicationResult<AuthorityDto> {
        ctx.require_admin("add authorities")?;
        request.validate_all().ensure_valid()?;

        self.store
            .get_office(office_id)
            .await?
            .ok_or(NotFoundError::Office(office_id))?;

        let authority = Authority {
            id: AuthorityId::new(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_lowercase(),
            office_id,
            role: request.role.trim().to_string(),
            department_name: request
                .department_name
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            created_at: Utc::now(),
        };
        self.store.insert_authority(&authority).await?;

        info!(
            authority_id = %authority.id,
            office_id = %office_id,
            role = %authority.role,
            "Authority added"
        );
        Ok(AuthorityDto::from(&authority))
    }

    #[instrument(skip(self, ctx, request), fields(correlation_id = %ctx.correlation_id))]
    pub async fn create_citizen(
        &self,
        ctx: &ServiceContext,
        request: CreateCitizenRequest,
    ) -> ApplicationResult<CitizenDto> {
        ctx.require_admin("register citizens")?;
        request.validate_all().ensure_valid()?;

        let citizen = Citizen::new(request.name.trim(), request.phone);
        self.store.insert_citizen(&citizen).await?;

        info!(citizen_id = %citizen.id, "Citizen registered");
        Ok(CitizenDto::from(&citizen))
    }
}
