//! Account request notification outbox.
//!
//! Services hand [`AccountRequestMail`] messages to an [`AccountRequestNotifier`]
//! and never wait for delivery. The Redis-backed implementation lives in the
//! queue crate.

use async_trait::async_trait;
use onboard_common::AppResult;
use onboard_db::entities::account_request;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Mail requested by an account request transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AccountRequestMail {
    /// The request was approved; the mailer loads it by ID.
    #[serde(rename_all = "camelCase")]
    Approval { account_request_id: String },
    /// The request was rejected; carries the record as it was saved.
    #[serde(rename_all = "camelCase")]
    Rejection {
        account_request: account_request::Model,
        reason: String,
    },
}

impl AccountRequestMail {
    /// ID of the account request this mail is about.
    #[must_use]
    pub fn account_request_id(&self) -> &str {
        match self {
            Self::Approval { account_request_id } => account_request_id,
            Self::Rejection {
                account_request, ..
            } => &account_request.id,
        }
    }

    /// Short name used in logs and job metadata.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Approval { .. } => "approval",
            Self::Rejection { .. } => "rejection",
        }
    }
}

/// Outbox for account request mail.
#[async_trait]
pub trait AccountRequestNotifier: Send + Sync {
    /// Queue a mail for later delivery.
    async fn enqueue(&self, mail: AccountRequestMail) -> AppResult<()>;
}

/// A no-op notifier for when email is disabled.
#[derive(Clone, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl AccountRequestNotifier for NoOpNotifier {
    async fn enqueue(&self, mail: AccountRequestMail) -> AppResult<()> {
        tracing::debug!(
            kind = mail.kind(),
            account_request_id = %mail.account_request_id(),
            "Dropping account request mail (notifier disabled)"
        );
        Ok(())
    }
}

/// Notifier that keeps queued mail in memory.
#[derive(Default)]
pub struct InMemoryNotifier {
    queued: Mutex<Vec<AccountRequestMail>>,
}

impl InMemoryNotifier {
    /// Create an empty in-memory outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mail queued so far, oldest first.
    pub async fn queued(&self) -> Vec<AccountRequestMail> {
        self.queued.lock().await.clone()
    }

    /// Remove and return everything queued so far.
    pub async fn drain(&self) -> Vec<AccountRequestMail> {
        std::mem::take(&mut *self.queued.lock().await)
    }
}

#[async_trait]
impl AccountRequestNotifier for InMemoryNotifier {
    async fn enqueue(&self, mail: AccountRequestMail) -> AppResult<()> {
        self.queued.lock().await.push(mail);
        Ok(())
    }
}

/// Shared notifier handle.
pub type NotifierService = Arc<dyn AccountRequestNotifier>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_notifier_drain() {
        let notifier = InMemoryNotifier::new();
        notifier
            .enqueue(AccountRequestMail::Approval {
                account_request_id: "req1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(notifier.queued().await.len(), 1);
        assert_eq!(notifier.drain().await.len(), 1);
        assert!(notifier.queued().await.is_empty());
    }

    #[test]
    fn test_approval_wire_format() {
        let mail = AccountRequestMail::Approval {
            account_request_id: "req1".to_string(),
        };
        let json = serde_json::to_value(&mail).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "kind": "approval", "accountRequestId": "req1" })
        );
        assert_eq!(mail.kind(), "approval");
        assert_eq!(mail.account_request_id(), "req1");
    }
}
