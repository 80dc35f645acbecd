//! Account request mail job.

use chrono::{DateTime, Utc};
use onboard_core::AccountRequestMail;
use serde::{Deserialize, Serialize};

/// Job to render and send one account request mail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRequestMailJob {
    /// The mail to deliver.
    pub mail: AccountRequestMail,

    /// When the transition queued the mail.
    pub queued_at: DateTime<Utc>,
}

impl AccountRequestMailJob {
    /// Create a new mail job stamped with the current time.
    #[must_use]
    pub fn new(mail: AccountRequestMail) -> Self {
        Self {
            mail,
            queued_at: Utc::now(),
        }
    }
}
