//! Account request repository.

use std::sync::Arc;

use crate::entities::{
    AccountRequest,
    account_request::{self, AccountRequestStatus},
};
use onboard_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr,
};

/// Account request repository for database operations.
#[derive(Clone)]
pub struct AccountRequestRepository {
    db: Arc<DatabaseConnection>,
}

/// Unique-index violations surface as [`AppError::Conflict`] so callers can
/// report them against the offending field.
fn map_write_error(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => AppError::Conflict(detail),
        _ => AppError::Database(err.to_string()),
    }
}

impl AccountRequestRepository {
    /// Create a new account request repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an account request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<account_request::Model>> {
        AccountRequest::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an account request by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<account_request::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Account request {id}")))
    }

    /// Find another account request using `email`.
    ///
    /// `exclude_id` skips the record being updated.
    pub async fn find_by_email(
        &self,
        email: &str,
        exclude_id: Option<&str>,
    ) -> AppResult<Option<account_request::Model>> {
        let mut query = AccountRequest::find().filter(account_request::Column::Email.eq(email));

        if let Some(id) = exclude_id {
            query = query.filter(account_request::Column::Id.ne(id));
        }

        query
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a new account request.
    pub async fn create(
        &self,
        model: account_request::ActiveModel,
    ) -> AppResult<account_request::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_write_error)
    }

    /// Write changed columns of an account request in a single UPDATE.
    pub async fn update(
        &self,
        model: account_request::ActiveModel,
    ) -> AppResult<account_request::Model> {
        model.update(self.db.as_ref()).await.map_err(map_write_error)
    }

    /// Delete an account request. Linked organizations keep their row.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        AccountRequest::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(())
    }

    /// Requests past the initial `requested` state, newest first.
    pub async fn find_closed(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<account_request::Model>> {
        AccountRequest::find()
            .filter(account_request::Column::Status.is_in(AccountRequestStatus::CLOSED))
            .order_by_desc(account_request::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count requests matched by the `closed` scope.
    pub async fn count_closed(&self) -> AppResult<u64> {
        AccountRequest::find()
            .filter(account_request::Column::Status.is_in(AccountRequestStatus::CLOSED))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Requests in a single status, newest first.
    pub async fn find_by_status(
        &self,
        status: AccountRequestStatus,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<account_request::Model>> {
        AccountRequest::find()
            .filter(account_request::Column::Status.eq(status))
            .order_by_desc(account_request::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
