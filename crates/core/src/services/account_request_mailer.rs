//! Renders and sends queued account request mail.

use onboard_common::AppResult;
use onboard_db::repositories::AccountRequestRepository;
use tracing::{info, warn};

use crate::services::email::{EmailDeliveryResult, EmailService};
use crate::services::identity_token::IdentityTokenSigner;
use crate::services::notifier::AccountRequestMail;

/// Turns an [`AccountRequestMail`] into an outgoing email.
#[derive(Clone)]
pub struct AccountRequestMailer {
    account_request_repo: AccountRequestRepository,
    signer: IdentityTokenSigner,
    email: EmailService,
}

impl AccountRequestMailer {
    #[must_use]
    pub const fn new(
        account_request_repo: AccountRequestRepository,
        signer: IdentityTokenSigner,
        email: EmailService,
    ) -> Self {
        Self {
            account_request_repo,
            signer,
            email,
        }
    }

    /// Deliver one mail.
    ///
    /// An approval for a request deleted since it was queued is dropped.
    pub async fn deliver(&self, mail: &AccountRequestMail) -> AppResult<EmailDeliveryResult> {
        let message = match mail {
            AccountRequestMail::Approval { account_request_id } => {
                let Some(request) = self
                    .account_request_repo
                    .find_by_id(account_request_id)
                    .await?
                else {
                    warn!(%account_request_id, "Account request vanished before approval mail");
                    return Ok(EmailDeliveryResult {
                        success: false,
                        detail: Some("account request not found".to_string()),
                    });
                };

                let token = self.signer.issue(&request.id)?;
                let url = self.email.confirmation_url(&token)?;
                self.email.render_approval_request(&request, &url)
            }
            AccountRequestMail::Rejection {
                account_request,
                reason,
            } => self.email.render_rejection(account_request, reason),
        };

        let result = self.email.send(message).await?;
        info!(
            kind = mail.kind(),
            account_request_id = %mail.account_request_id(),
            success = result.success,
            "Account request mail processed"
        );
        Ok(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use onboard_db::entities::account_request::{self, AccountRequestStatus};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;
    use url::Url;

    fn request() -> account_request::Model {
        account_request::Model {
            id: "req1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            organization_name: "Engines".to_string(),
            organization_website: None,
            request_details: "x".repeat(60),
            status: AccountRequestStatus::Pending,
            confirmed_at: Some(Utc::now().into()),
            rejection_reason: None,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn mailer(db: MockDatabase) -> AccountRequestMailer {
        AccountRequestMailer::new(
            AccountRequestRepository::new(Arc::new(db.into_connection())),
            IdentityTokenSigner::new(b"secret"),
            EmailService::disabled(
                "Onboard".to_string(),
                Url::parse("https://onboard.example.com/").unwrap(),
            ),
        )
    }

    #[tokio::test]
    async fn test_approval_loads_request() {
        let mailer = mailer(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[request()]]),
        );

        let result = mailer
            .deliver(&AccountRequestMail::Approval {
                account_request_id: "req1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result.detail.as_deref(), Some("email disabled"));
    }

    #[tokio::test]
    async fn test_approval_for_missing_request_is_dropped() {
        let mailer = mailer(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<account_request::Model>::new()]),
        );

        let result = mailer
            .deliver(&AccountRequestMail::Approval {
                account_request_id: "gone".to_string(),
            })
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(result.detail.as_deref(), Some("account request not found"));
    }

    #[tokio::test]
    async fn test_rejection_needs_no_lookup() {
        let mailer = mailer(MockDatabase::new(DatabaseBackend::Postgres));

        let result = mailer
            .deliver(&AccountRequestMail::Rejection {
                account_request: request(),
                reason: "no".to_string(),
            })
            .await
            .unwrap();

        assert!(!result.success);
    }
}
