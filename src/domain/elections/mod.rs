//! Elections

pub mod data;
pub mod errors;
pub mod records;
pub mod repository;
pub mod service;
pub mod state;

pub use errors::ElectionsServiceError;
pub use service::*;
