//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `onboard_test`)
//!   `TEST_DB_PASSWORD` (default: `onboard_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::Utc;
use onboard_common::AppError;
use onboard_db::entities::{account_request, account_request::AccountRequestStatus, organization};
use onboard_db::repositories::{AccountRequestRepository, OrganizationRepository};
use onboard_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::Set;

fn new_request(id: &str, email: &str) -> account_request::ActiveModel {
    let now = Utc::now();
    account_request::ActiveModel {
        id: Set(id.to_string()),
        name: Set("Grace Hopper".to_string()),
        email: Set(email.to_string()),
        organization_name: Set("Compiler Club".to_string()),
        organization_website: Set(None),
        request_details: Set("We run a small compiler club and want shared accounts.".to_string()),
        status: Set(AccountRequestStatus::Requested),
        confirmed_at: Set(None),
        rejection_reason: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_email_hits_unique_index() {
    let db = TestDatabase::create_unique().await.expect("Failed to create database");
    let repo = AccountRequestRepository::new(db.shared());

    repo.create(new_request("req1", "dup@example.com")).await.unwrap();
    let second = repo.create(new_request("req2", "dup@example.com")).await;

    assert!(matches!(second, Err(AppError::Conflict(_))), "got {second:?}");

    drop(repo);
    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_deleting_request_nullifies_organization_link() {
    let db = TestDatabase::create_unique().await.expect("Failed to create database");
    let conn = db.shared();
    let requests = AccountRequestRepository::new(Arc::clone(&conn));
    let organizations = OrganizationRepository::new(Arc::clone(&conn));

    requests.create(new_request("req1", "org@example.com")).await.unwrap();
    organizations
        .create(organization::ActiveModel {
            id: Set("org1".to_string()),
            name: Set("Compiler Club".to_string()),
            email: Set("club@example.com".to_string()),
            website: Set(None),
            account_request_id: Set(Some("req1".to_string())),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();

    requests.delete("req1").await.unwrap();

    let org = organizations.find_by_id("org1").await.unwrap().unwrap();
    assert_eq!(org.account_request_id, None);

    drop((requests, organizations, conn));
    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_closed_scope_excludes_requested() {
    let db = TestDatabase::create_unique().await.expect("Failed to create database");
    let repo = AccountRequestRepository::new(db.shared());

    repo.create(new_request("req1", "a@example.com")).await.unwrap();
    let mut pending = new_request("req2", "b@example.com");
    pending.status = Set(AccountRequestStatus::Pending);
    repo.create(pending).await.unwrap();
    let mut rejected = new_request("req3", "c@example.com");
    rejected.status = Set(AccountRequestStatus::Rejected);
    repo.create(rejected).await.unwrap();

    let closed = repo.find_closed(10, 0).await.unwrap();
    let mut ids: Vec<_> = closed.iter().map(|r| r.id.as_str()).collect();
    ids.sort_unstable();

    assert_eq!(ids, vec!["req2", "req3"]);
    assert_eq!(repo.count_closed().await.unwrap(), 2);

    drop(repo);
    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    let url = config.postgres_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.ends_with("/postgres"));
}
