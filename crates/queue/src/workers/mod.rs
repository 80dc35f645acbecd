//! Job workers.

mod account_request_mail;

pub use account_request_mail::{MAIL_RETRIES, MailerContext, account_request_mail_worker};
