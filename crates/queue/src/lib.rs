//! Background job queue for onboard.
//!
//! Account request transitions queue mail through [`RedisMailOutbox`]; the
//! apalis worker [`account_request_mail_worker`] renders and sends it.

pub mod jobs;
pub mod outbox;
pub mod workers;

pub use jobs::*;
pub use outbox::{RedisMailOutbox, connect_storage};
pub use workers::*;
