//! Shared test infrastructure

mod db;
mod pg;

pub(crate) use context::MemoryContext;
pub(crate) use db::TestDb;
