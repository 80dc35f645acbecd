//! Account request mail worker.

use std::sync::Arc;

use apalis::prelude::*;
use onboard_core::AccountRequestMailer;
use tracing::{error, info};

use crate::jobs::AccountRequestMailJob;

/// Retries after the first failed attempt, so a job runs at most six times.
pub const MAIL_RETRIES: usize = 5;

/// Context for the mail worker.
#[derive(Clone)]
pub struct MailerContext {
    pub mailer: AccountRequestMailer,
}

impl MailerContext {
    /// Create a new mailer context.
    #[must_use]
    pub const fn new(mailer: AccountRequestMailer) -> Self {
        Self { mailer }
    }
}

/// Worker function for account request mail.
///
/// # Errors
/// Returns an error if rendering or SMTP delivery fails, so the job is retried.
pub async fn account_request_mail_worker(
    job: AccountRequestMailJob,
    ctx: Data<MailerContext>,
) -> Result<(), Error> {
    let mail = &job.mail;
    info!(
        kind = mail.kind(),
        account_request_id = %mail.account_request_id(),
        queued_at = %job.queued_at,
        "Delivering account request mail"
    );

    match ctx.mailer.deliver(mail).await {
        Ok(result) => {
            info!(
                account_request_id = %mail.account_request_id(),
                success = result.success,
                "Account request mail finished"
            );
            Ok(())
        }
        Err(e) => {
            error!(
                account_request_id = %mail.account_request_id(),
                error = %e,
                "Failed to deliver account request mail"
            );
            let source: Box<dyn std::error::Error + Send + Sync> = Box::new(e);
            Err(Error::Failed(Arc::new(source)))
        }
    }
}
