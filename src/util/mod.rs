//! Shared utilities.

pub mod http;
pub mod retry;
pub mod timeout;
