//! Account request entity for organization onboarding.

use sea_orm::ActiveValue;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Review status of an account request.
///
/// `approve` and `reject` are accepted from every state; callers decide
/// whether a given jump makes sense.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum AccountRequestStatus {
    #[sea_orm(string_value = "requested")]
    #[default]
    Requested,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl AccountRequestStatus {
    /// Statuses matched by the `closed` scope.
    pub const CLOSED: [Self; 3] = [Self::Pending, Self::Approved, Self::Rejected];

    /// Status after an approval. Approval confirms the request and leaves it pending.
    #[must_use]
    pub const fn approve(self) -> Self {
        Self::Pending
    }

    /// Status after a rejection.
    #[must_use]
    pub const fn reject(self) -> Self {
        Self::Rejected
    }

    /// Pending and approved requests count as confirmed.
    #[must_use]
    pub const fn is_confirmed(self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    /// Anything past the initial `requested` state.
    #[must_use]
    pub const fn is_closed(self) -> bool {
        !matches!(self, Self::Requested)
    }

    /// Stored string value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for AccountRequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prospective organization's signup request.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "account_request")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Requester's name
    pub name: String,

    #[sea_orm(unique)]
    pub email: String,

    pub organization_name: String,

    #[sea_orm(nullable)]
    pub organization_website: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub request_details: String,

    pub status: AccountRequestStatus,

    /// Set when the request is approved
    #[sea_orm(nullable)]
    pub confirmed_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(column_type = "Text", nullable)]
    pub rejection_reason: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether the request has been confirmed (pending or approved).
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        self.status.is_confirmed()
    }
}

impl ActiveModel {
    /// ID of a row loaded from the database.
    ///
    /// `None` for records that were built in memory and never persisted,
    /// even when an ID has already been assigned to them.
    #[must_use]
    pub fn persisted_id(&self) -> Option<&str> {
        match &self.id {
            ActiveValue::Unchanged(id) => Some(id.as_str()),
            ActiveValue::Set(_) | ActiveValue::NotSet => None,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::organization::Entity")]
    Organization,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
