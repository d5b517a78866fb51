//! Shared foundations: the crate error type, configuration, and the
//! session context every service call receives.

mod config;
mod error;
mod session;

pub use config::*;
pub use error::*;
pub use session::*;
