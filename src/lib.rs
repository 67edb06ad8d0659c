pub mod analyzers;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod processors;
pub mod query;
pub mod readers;
pub mod server;
pub mod store;
pub mod utils;
pub mod writers;

pub use error::{ProcessingError, Result};
