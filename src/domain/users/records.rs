//! User Records

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{errors::UnknownVariant, ids::TypedId};

/// User Id
pub type UserId = TypedId<UserRecord>;

/// Authorization role; the only axis access decisions are made on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Full access; seeded, never created through management.
    Admin,
    /// Staff that manages elections and candidacies.
    Administrativo,
    /// Eligible for nomination; may vote elsewhere.
    Candidato,
    /// Voter.
    Votante,
}

impl Role {
    /// All roles, in the order the management surface offers them.
    pub const ALL: [Role; 4] = [
        Role::Admin,
        Role::Administrativo,
        Role::Candidato,
        Role::Votante,
    ];

    /// Stored text value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Administrativo => "ADMINISTRATIVO",
            Self::Candidato => "CANDIDATO",
            Self::Votante => "VOTANTE",
        }
    }

    /// Roles allowed to create, edit and delete elections and candidacies.
    pub const fn manages_elections(self) -> bool {
        matches!(self, Self::Admin | Self::Administrativo)
    }

    /// Only ADMIN may manage user accounts.
    pub const fn manages_users(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant::new("role", s))
    }
}

/// User Record
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    /// Row id.
    pub id: UserId,
    /// Identification number.
    pub identification: String,
    /// Login name.
    pub username: String,
    /// Hex SHA-256 of the password.
    pub password_hash: String,
    /// Access role.
    pub role: Role,
}

impl UserRecord {
    /// The acting identity of this user.
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id,
            role: self.role,
        }
    }
}

/// Identity performing an operation, taken from the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    /// Acting user.
    pub id: UserId,
    /// Access role.
    pub role: Role,
}
