//! Job definitions.

#![allow(missing_docs)]

mod account_request_mail;

pub use account_request_mail::AccountRequestMailJob;
