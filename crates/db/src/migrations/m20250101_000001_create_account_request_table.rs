//! Create `account_request` table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AccountRequest::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AccountRequest::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(AccountRequest::Name).string_len(256).not_null())
                    .col(ColumnDef::new(AccountRequest::Email).string_len(512).not_null())
                    .col(ColumnDef::new(AccountRequest::OrganizationName).string_len(256).not_null())
                    .col(ColumnDef::new(AccountRequest::OrganizationWebsite).string_len(1024))
                    .col(ColumnDef::new(AccountRequest::RequestDetails).text().not_null())
                    .col(
                        ColumnDef::new(AccountRequest::Status)
                            .string_len(16)
                            .not_null()
                            .default("requested"),
                    )
                    .col(ColumnDef::new(AccountRequest::ConfirmedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(AccountRequest::RejectionReason).text())
                    .col(
                        ColumnDef::new(AccountRequest::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(AccountRequest::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: email (settles concurrent inserts)
        manager
            .create_index(
                Index::create()
                    .name("idx_account_request_email")
                    .table(AccountRequest::Table)
                    .col(AccountRequest::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: status (closed scope)
        manager
            .create_index(
                Index::create()
                    .name("idx_account_request_status")
                    .table(AccountRequest::Table)
                    .col(AccountRequest::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AccountRequest::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum AccountRequest {
    Table,
    Id,
    Name,
    Email,
    OrganizationName,
    OrganizationWebsite,
    RequestDetails,
    Status,
    ConfirmedAt,
    RejectionReason,
    CreatedAt,
    UpdatedAt,
}
