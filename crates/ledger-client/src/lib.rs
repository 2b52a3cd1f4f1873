//! Client for the core ledger service.

pub mod client;
pub mod error;

pub use client::LedgerClient;
pub use error::{LedgerError, Result};
