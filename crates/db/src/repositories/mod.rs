//! Database repositories.

mod account_request;
mod organization;
mod user;

pub use account_request::AccountRequestRepository;
pub use organization::OrganizationRepository;
pub use user::UserRepository;
