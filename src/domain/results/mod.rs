//! Results

pub mod errors;
pub mod export;
pub mod records;
pub mod service;
pub mod tally;

pub use errors::ResultsServiceError;
pub use service::*;
