//! Account request business logic for onboard.

pub mod services;

pub use services::*;
