//! Business logic services.

#![allow(missing_docs)]

pub mod account_request;
pub mod account_request_mailer;
pub mod email;
pub mod identity_token;
pub mod notifier;

pub use account_request::{
    AccountRequestInput, AccountRequestService, MIN_REQUEST_DETAILS_LEN,
    UpdateAccountRequestInput,
};
pub use account_request_mailer::AccountRequestMailer;
pub use email::{EmailDeliveryResult, EmailMessage, EmailService};
pub use identity_token::IdentityTokenSigner;
pub use notifier::{
    AccountRequestMail, AccountRequestNotifier, InMemoryNotifier, NoOpNotifier, NotifierService,
};
