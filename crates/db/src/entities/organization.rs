//! Organization entity.
//!
//! Only the columns the onboarding flow reads are mapped here.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organization")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,

    #[sea_orm(unique)]
    pub email: String,

    #[sea_orm(nullable)]
    pub website: Option<String>,

    /// Request this organization was created from. Cleared when the request is deleted.
    #[sea_orm(nullable)]
    pub account_request_id: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account_request::Entity",
        from = "Column::AccountRequestId",
        to = "super::account_request::Column::Id",
        on_delete = "SetNull"
    )]
    AccountRequest,
}

impl Related<super::account_request::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AccountRequest.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
