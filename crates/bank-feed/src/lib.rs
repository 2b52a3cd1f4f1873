//! FIO bank feed client.

pub mod client;
pub mod error;

pub use client::FioClient;
pub use error::{FioError, Result};
