//! Database entities.

#![allow(missing_docs)]

pub mod account_request;
pub mod organization;
pub mod user;

pub use account_request::Entity as AccountRequest;
pub use organization::Entity as Organization;
pub use user::Entity as User;
