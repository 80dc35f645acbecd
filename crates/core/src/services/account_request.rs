//! Account request service: validation, identity tokens and review transitions.

use chrono::Utc;
use onboard_common::{AppError, AppResult, error::field_error, id::IdGenerator};
use onboard_db::entities::account_request::{self, AccountRequestStatus};
use onboard_db::repositories::{
    AccountRequestRepository, OrganizationRepository, UserRepository,
};
use sea_orm::{IntoActiveModel, Set};
use serde::Deserialize;
use tracing::{debug, info, warn};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::services::identity_token::IdentityTokenSigner;
use crate::services::notifier::{AccountRequestMail, NotifierService};

/// Minimum length of `request_details`, in characters.
pub const MIN_REQUEST_DETAILS_LEN: u64 = 50;

const BLANK: &str = "can't be blank";
const EMAIL_TAKEN: &str = "has already been taken";
const EMAIL_USED_BY_ORGANIZATION: &str = "already used by an existing Organization";
const EMAIL_USED_BY_USER: &str = "already used by an existing User";

fn validate_present(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(field_error("blank", BLANK));
    }
    Ok(())
}

/// Writable fields of an account request, validated on every write.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AccountRequestInput {
    #[validate(custom(function = "validate_present"))]
    pub name: String,
    #[validate(
        custom(function = "validate_present"),
        email(code = "invalid", message = "is invalid")
    )]
    pub email: String,
    #[validate(custom(function = "validate_present"))]
    pub organization_name: String,
    #[serde(default)]
    pub organization_website: Option<String>,
    #[validate(
        custom(function = "validate_present"),
        length(
            min = MIN_REQUEST_DETAILS_LEN,
            code = "too_short",
            message = "is too short (minimum is 50 characters)"
        )
    )]
    pub request_details: String,
}

impl From<&account_request::Model> for AccountRequestInput {
    fn from(model: &account_request::Model) -> Self {
        Self {
            name: model.name.clone(),
            email: model.email.clone(),
            organization_name: model.organization_name.clone(),
            organization_website: model.organization_website.clone(),
            request_details: model.request_details.clone(),
        }
    }
}

/// Partial update of an account request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequestInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub organization_name: Option<String>,
    pub organization_website: Option<Option<String>>,
    pub request_details: Option<String>,
}

/// Service for managing account requests.
#[derive(Clone)]
pub struct AccountRequestService {
    account_request_repo: AccountRequestRepository,
    organization_repo: OrganizationRepository,
    user_repo: UserRepository,
    signer: IdentityTokenSigner,
    notifier: NotifierService,
    id_gen: IdGenerator,
}

impl AccountRequestService {
    /// Create a new account request service.
    #[must_use]
    pub const fn new(
        account_request_repo: AccountRequestRepository,
        organization_repo: OrganizationRepository,
        user_repo: UserRepository,
        signer: IdentityTokenSigner,
        notifier: NotifierService,
    ) -> Self {
        Self {
            account_request_repo,
            organization_repo,
            user_repo,
            signer,
            notifier,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get an account request by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<account_request::Model>> {
        self.account_request_repo.find_by_id(id).await
    }

    /// Get an account request by ID, failing if it does not exist.
    pub async fn get_by_id(&self, id: &str) -> AppResult<account_request::Model> {
        self.account_request_repo.get_by_id(id).await
    }

    /// Requests that have left the `requested` state.
    pub async fn list_closed(
        &self,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<account_request::Model>> {
        self.account_request_repo.find_closed(limit, offset).await
    }

    /// Count requests that have left the `requested` state.
    pub async fn count_closed(&self) -> AppResult<u64> {
        self.account_request_repo.count_closed().await
    }

    /// Requests in a given status.
    pub async fn list_by_status(
        &self,
        status: AccountRequestStatus,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<account_request::Model>> {
        self.account_request_repo
            .find_by_status(status, limit, offset)
            .await
    }

    /// Submit a new account request. Starts in `requested`.
    pub async fn create(&self, input: AccountRequestInput) -> AppResult<account_request::Model> {
        self.check(&input, None).await?;

        let now = Utc::now();
        let model = account_request::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            email: Set(input.email),
            organization_name: Set(input.organization_name),
            organization_website: Set(input.organization_website),
            request_details: Set(input.request_details),
            status: Set(AccountRequestStatus::default()),
            confirmed_at: Set(None),
            rejection_reason: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let created = self
            .account_request_repo
            .create(model)
            .await
            .map_err(email_conflict)?;

        info!(account_request_id = %created.id, "Account request submitted");
        Ok(created)
    }

    /// Change the requester-supplied fields of an account request.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateAccountRequestInput,
    ) -> AppResult<account_request::Model> {
        let current = self.account_request_repo.get_by_id(id).await?;

        let mut fields = AccountRequestInput::from(&current);
        if let Some(name) = input.name {
            fields.name = name;
        }
        if let Some(email) = input.email {
            fields.email = email;
        }
        if let Some(organization_name) = input.organization_name {
            fields.organization_name = organization_name;
        }
        if let Some(organization_website) = input.organization_website {
            fields.organization_website = organization_website;
        }
        if let Some(request_details) = input.request_details {
            fields.request_details = request_details;
        }

        self.check(&fields, Some(&current.id)).await?;

        let mut active = current.into_active_model();
        active.name = Set(fields.name);
        active.email = Set(fields.email);
        active.organization_name = Set(fields.organization_name);
        active.organization_website = Set(fields.organization_website);
        active.request_details = Set(fields.request_details);
        active.updated_at = Set(Utc::now().into());

        self.account_request_repo
            .update(active)
            .await
            .map_err(email_conflict)
    }

    /// Sign an identity token for a persisted account request.
    ///
    /// Records that were never loaded from the database have no stable ID
    /// yet and are refused.
    pub fn identity_token(&self, record: &account_request::ActiveModel) -> AppResult<String> {
        let id = record.persisted_id().ok_or_else(|| {
            AppError::Internal("account request must be persisted before issuing a token".to_string())
        })?;

        self.signer.issue(id)
    }

    /// Resolve an identity token to its account request.
    ///
    /// Every failure (bad token, wrong key, unknown ID, lookup error) is `None`.
    pub async fn get_by_identity_token(&self, token: &str) -> Option<account_request::Model> {
        let id = self.signer.verify(token)?;

        match self.account_request_repo.find_by_id(&id).await {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "Identity token lookup failed");
                None
            }
        }
    }

    /// Whether an organization has already been created from this request.
    pub async fn is_processed(&self, record: &account_request::Model) -> AppResult<bool> {
        Ok(self
            .organization_repo
            .find_by_account_request_id(&record.id)
            .await?
            .is_some())
    }

    /// Approve a request: confirm it, move it to `pending` and queue the approval mail.
    pub async fn approve(
        &self,
        record: account_request::Model,
    ) -> AppResult<account_request::Model> {
        self.check(&AccountRequestInput::from(&record), Some(&record.id))
            .await?;

        let now = Utc::now();
        let status = record.status.approve();
        let mut active = record.into_active_model();
        active.status = Set(status);
        active.confirmed_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());

        let approved = self.account_request_repo.update(active).await.map_err(email_conflict)?;

        self.notifier
            .enqueue(AccountRequestMail::Approval {
                account_request_id: approved.id.clone(),
            })
            .await?;

        info!(account_request_id = %approved.id, "Account request approved");
        Ok(approved)
    }

    /// Reject a request with a reason and queue the rejection mail.
    pub async fn reject(
        &self,
        record: account_request::Model,
        reason: &str,
    ) -> AppResult<account_request::Model> {
        self.check(&AccountRequestInput::from(&record), Some(&record.id))
            .await?;

        let status = record.status.reject();
        let mut active = record.into_active_model();
        active.status = Set(status);
        active.rejection_reason = Set(Some(reason.to_string()));
        active.updated_at = Set(Utc::now().into());

        let rejected = self.account_request_repo.update(active).await.map_err(email_conflict)?;

        self.notifier
            .enqueue(AccountRequestMail::Rejection {
                account_request: rejected.clone(),
                reason: reason.to_string(),
            })
            .await?;

        info!(account_request_id = %rejected.id, "Account request rejected");
        Ok(rejected)
    }

    /// Run field rules and the three email uniqueness checks, collecting every failure.
    async fn check(&self, input: &AccountRequestInput, exclude_id: Option<&str>) -> AppResult<()> {
        let mut errors = input.validate().err().unwrap_or_else(ValidationErrors::new);

        if !input.email.trim().is_empty() {
            if self
                .account_request_repo
                .find_by_email(&input.email, exclude_id)
                .await?
                .is_some()
            {
                errors.add("email", field_error("taken", EMAIL_TAKEN));
            }

            if self
                .organization_repo
                .find_by_email(&input.email)
                .await?
                .is_some()
            {
                errors.add(
                    "email",
                    field_error("used_by_organization", EMAIL_USED_BY_ORGANIZATION),
                );
            }

            if self.user_repo.find_by_email(&input.email).await?.is_some() {
                errors.add("email", field_error("used_by_user", EMAIL_USED_BY_USER));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            debug!(errors = %errors, "Account request failed validation");
            Err(AppError::InvalidRecord(errors))
        }
    }
}

/// A unique-index hit on write means another request claimed the email first.
fn email_conflict(err: AppError) -> AppError {
    match err {
        AppError::Conflict(_) => AppError::invalid_field("email", "taken", EMAIL_TAKEN),
        other => other,
    }
}
