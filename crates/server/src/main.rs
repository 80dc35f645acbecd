//! Onboard entry point.
//!
//! `onboard serve` runs migrations and the account request mail worker. The
//! other subcommands are operator actions on single requests.

use std::sync::Arc;

use anyhow::Context;
use apalis::layers::WorkerBuilderExt;
use apalis::layers::retry::RetryPolicy;
use apalis::prelude::*;
use clap::Parser;
use onboard_common::Config;
use onboard_core::{AccountRequestMailer, AccountRequestService, EmailService, IdentityTokenSigner};
use onboard_db::repositories::{AccountRequestRepository, OrganizationRepository, UserRepository};
use onboard_queue::{
    MAIL_RETRIES, MailerContext, RedisMailOutbox, account_request_mail_worker, connect_storage,
};
use sea_orm::IntoActiveModel;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Account request review service.
#[derive(Parser, Debug)]
#[command(name = "onboard", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run migrations and process queued mail until interrupted.
    Serve,
    /// Approve a request and queue the approval mail.
    Approve {
        /// Account request ID.
        id: String,
    },
    /// Reject a request and queue the rejection mail.
    Reject {
        /// Account request ID.
        id: String,
        /// Reason sent to the requester.
        #[arg(long)]
        reason: String,
    },
    /// Print the identity token for a request.
    Token {
        /// Account request ID.
        id: String,
    },
    /// List requests that have left the `requested` state.
    Closed {
        #[arg(long, default_value_t = 20)]
        limit: u64,
        #[arg(long, default_value_t = 0)]
        offset: u64,
    },
}

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() -> std::io::Result<()> {
    let ctrl_c = signal::ctrl_c();

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())?
            .recv()
            .await;
        Ok::<(), std::io::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<std::io::Result<()>>();

    tokio::select! {
        res = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
            res
        },
        res = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
            res
        },
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "onboard=debug,apalis=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load configuration")?;

    let db = Arc::new(onboard_db::init(&config).await?);
    info!("Connected to database");

    let signer = IdentityTokenSigner::from_config(&config)?;
    let storage = connect_storage(&config.redis.url, &config.redis.prefix).await?;
    info!("Connected to Redis job queue");

    let account_request_repo = AccountRequestRepository::new(Arc::clone(&db));
    let service = AccountRequestService::new(
        account_request_repo.clone(),
        OrganizationRepository::new(Arc::clone(&db)),
        UserRepository::new(Arc::clone(&db)),
        signer.clone(),
        Arc::new(RedisMailOutbox::new(storage.clone())),
    );

    match cli.command {
        Commands::Serve => {
            info!("Running database migrations...");
            onboard_db::migrate(&db).await?;
            info!("Migrations completed");

            let email = EmailService::new(
                config.email.as_ref(),
                config.server.instance_name.clone(),
                config.server.url.clone(),
            )?;
            if !email.is_enabled() {
                tracing::warn!("No [email] section configured, mail will be logged only");
            }

            let ctx = MailerContext::new(AccountRequestMailer::new(
                account_request_repo,
                signer,
                email,
            ));

            info!("Starting account request mail worker...");
            Monitor::new()
                .register({
                    WorkerBuilder::new("account-request-mail")
                        .enable_tracing()
                        .retry(RetryPolicy::retries(MAIL_RETRIES))
                        .data(ctx)
                        .backend(storage)
                        .build_fn(account_request_mail_worker)
                })
                .run_with_signal(shutdown_signal())
                .await?;

            info!("Worker shutdown complete");
        }
        Commands::Approve { id } => {
            let record = service.get_by_id(&id).await?;
            let approved = service.approve(record).await?;
            println!("{} is now {}", approved.id, approved.status);
        }
        Commands::Reject { id, reason } => {
            let record = service.get_by_id(&id).await?;
            let rejected = service.reject(record, &reason).await?;
            println!("{} is now {}", rejected.id, rejected.status);
        }
        Commands::Token { id } => {
            let record = service.get_by_id(&id).await?;
            println!("{}", service.identity_token(&record.into_active_model())?);
        }
        Commands::Closed { limit, offset } => {
            let total = service.count_closed().await?;
            for record in service.list_closed(limit, offset).await? {
                println!("{}", serde_json::to_string(&record)?);
            }
            info!(total, "Listed closed account requests");
        }
    }

    Ok(())
}
