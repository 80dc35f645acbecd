//! Organization repository.

use std::sync::Arc;

use crate::entities::{Organization, organization};
use onboard_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Organization repository for database operations.
#[derive(Clone)]
pub struct OrganizationRepository {
    db: Arc<DatabaseConnection>,
}

impl OrganizationRepository {
    /// Create a new organization repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an organization by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<organization::Model>> {
        Organization::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an organization by email.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<organization::Model>> {
        Organization::find()
            .filter(organization::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the organization created from an account request.
    pub async fn find_by_account_request_id(
        &self,
        account_request_id: &str,
    ) -> AppResult<Option<organization::Model>> {
        Organization::find()
            .filter(organization::Column::AccountRequestId.eq(account_request_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new organization.
    pub async fn create(&self, model: organization::ActiveModel) -> AppResult<organization::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
