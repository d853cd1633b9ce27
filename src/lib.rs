//! Urna
//!
//! Urna is the core of a voting application: election lifecycle management,
//! vote eligibility and recording, tallying and results export over a
//! `PostgreSQL` backend.

pub mod changes;
pub mod config;
pub mod context;
pub mod database;
pub mod domain;
pub mod errors;
pub mod ids;
pub mod logging;
pub mod navigation;
pub mod scope;
pub mod session;
pub mod storage;

#[cfg(test)]
mod test;
