//! Redis-backed account request outbox.
//!
//! Implements [`AccountRequestNotifier`] by pushing jobs that the apalis
//! mail worker picks up.

use apalis::prelude::Storage;
use apalis_redis::RedisStorage;
use async_trait::async_trait;
use onboard_common::{AppError, AppResult};
use onboard_core::{AccountRequestMail, AccountRequestNotifier};

use crate::jobs::AccountRequestMailJob;

/// Connect the mail job storage to Redis, keyed under `{prefix}:account-request-mail`.
pub async fn connect_storage(
    redis_url: &str,
    prefix: &str,
) -> AppResult<RedisStorage<AccountRequestMailJob>> {
    let client = redis::Client::open(redis_url)
        .map_err(|e| AppError::Redis(format!("Invalid Redis URL: {e}")))?;
    let conn = redis::aio::ConnectionManager::new(client)
        .await
        .map_err(|e| AppError::Redis(format!("Failed to connect to Redis: {e}")))?;

    let config =
        apalis_redis::Config::default().set_namespace(&format!("{prefix}:account-request-mail"));

    Ok(RedisStorage::new_with_config(conn, config))
}

/// Queues account request mail in Redis.
#[derive(Clone)]
pub struct RedisMailOutbox {
    storage: RedisStorage<AccountRequestMailJob>,
}

impl RedisMailOutbox {
    /// Create a new outbox over an apalis Redis storage.
    #[must_use]
    pub const fn new(storage: RedisStorage<AccountRequestMailJob>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl AccountRequestNotifier for RedisMailOutbox {
    async fn enqueue(&self, mail: AccountRequestMail) -> AppResult<()> {
        let kind = mail.kind();
        let account_request_id = mail.account_request_id().to_string();

        self.storage
            .clone()
            .push(AccountRequestMailJob::new(mail))
            .await
            .map_err(|e| AppError::Queue(format!("Failed to queue {kind} mail: {e}")))?;

        tracing::debug!(%account_request_id, kind, "Queued account request mail");
        Ok(())
    }
}
