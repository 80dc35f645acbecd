//! Create organization table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Organization::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Organization::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Organization::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Organization::Email).string_len(512).not_null())
                    .col(ColumnDef::new(Organization::Website).string_len(1024))
                    .col(ColumnDef::new(Organization::AccountRequestId).string_len(32))
                    .col(
                        ColumnDef::new(Organization::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_organization_account_request")
                            .from(Organization::Table, Organization::AccountRequestId)
                            .to(AccountRequest::Table, AccountRequest::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_organization_email")
                    .table(Organization::Table)
                    .col(Organization::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Unique index: account_request_id (at most one organization per request)
        manager
            .create_index(
                Index::create()
                    .name("idx_organization_account_request_id")
                    .table(Organization::Table)
                    .col(Organization::AccountRequestId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Organization::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Organization {
    Table,
    Id,
    Name,
    Email,
    Website,
    AccountRequestId,
    CreatedAt,
}

#[derive(Iden)]
enum AccountRequest {
    Table,
    Id,
}
