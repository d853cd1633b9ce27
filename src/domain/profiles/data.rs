//! Profiles Data

/// Gender options offered on the profile form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenderSelection {
    /// Male.
    Masculino,
    /// Female.
    Femenino,
    /// Other, unspecified.
    Otro,

    /// A value typed in by the user.
    Personalizado(String),
}

impl GenderSelection {
    /// Maps a stored value back onto an option; `None` when nothing is stored.
    pub fn from_stored(value: &str) -> Option<Self> {
        let value = value.trim();

        if value.is_empty() {
            return None;
        }

        Some(match value.to_lowercase().as_str() {
            "masculino" => Self::Masculino,
            "femenino" => Self::Femenino,
            "otro" => Self::Otro,
            _ => Self::Personalizado(value.to_string()),
        })
    }

    /// Text to store, or `None` for a blank custom value.
    pub fn stored_value(&self) -> Option<String> {
        match self {
            Self::Masculino => Some("masculino".to_string()),
            Self::Femenino => Some("femenino".to_string()),
            Self::Otro => Some("otro".to_string()),
            Self::Personalizado(custom) => {
                let custom = custom.trim();

                (!custom.is_empty()).then(|| custom.to_lowercase())
            }
        }
    }
}

/// Profile form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Age in years; must be positive.
    pub age: i32,
    /// Selected gender option.
    pub gender: GenderSelection,
}

/// Validated profile values as written to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRow {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Age in years; must be positive.
    pub age: i32,
    /// Lowercased gender text.
    pub gender: String,
}
