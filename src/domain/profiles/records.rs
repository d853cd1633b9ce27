//! Profile Records

use serde::{Deserialize, Serialize};

use crate::domain::{profiles::data::GenderSelection, users::records::UserId};

/// Profile Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    /// Owner.
    pub user_id: UserId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Age in years.
    pub age: i32,

    /// Lower-case; one of the predefined genders or a custom value.
    pub gender: String,
}

impl ProfileRecord {
    /// How the stored gender maps back onto the selectable options.
    pub fn gender_selection(&self) -> Option<GenderSelection> {
        GenderSelection::from_stored(&self.gender)
    }
}
