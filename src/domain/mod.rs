//! Urna Domain Concerns

pub mod candidacies;
pub mod elections;
pub mod profiles;
pub mod results;
pub mod users;
pub mod votes;
