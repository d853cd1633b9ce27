//! Users Data

use crate::domain::users::records::Role;

/// New user as entered on the management surface.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    /// National or institutional identification number.
    pub identification: String,
    /// Login name.
    pub username: String,
    /// Plain text; hashed before it reaches the backend.
    pub password: String,
    /// Access role.
    pub role: Role,
}

/// Edit of an existing user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserUpdate {
    /// National or institutional identification number.
    pub identification: String,
    /// Login name.
    pub username: String,
    /// Re-hashed and stored only when present and non-empty.
    pub password: Option<String>,
    /// Access role.
    pub role: Role,
}

/// Row to insert, with the password already hashed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUserRow {
    /// National or institutional identification number.
    pub identification: String,
    /// Login name.
    pub username: String,
    /// Hex SHA-256 of the password.
    pub password_hash: String,
    /// Access role.
    pub role: Role,
}

/// Column changes for an update; `password_hash` of `None` keeps the stored hash.
#[derive(Debug, Clone, PartialEq)]
pub struct UserChanges {
    /// National or institutional identification number.
    pub identification: String,
    /// Login name.
    pub username: String,
    /// New hash, if the password changes.
    pub password_hash: Option<String>,
    /// Access role.
    pub role: Role,
}
