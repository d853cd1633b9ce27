//! Which sections each role can open.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::domain::users::records::Role;

/// A top-level area of the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    /// Landing page.
    Home,
    /// Elections a voter can browse and vote in.
    AvailableElections,
    /// Results of finished elections.
    Results,
    /// User administration.
    UserManagement,
    /// Election administration.
    ElectionManagement,
    /// Candidacy administration.
    CandidacyManagement,
    /// The user's own profile.
    Profile,
}

impl Section {
    /// Menu title.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Home => "Inicio",
            Self::AvailableElections => "Elecciones Disponibles",
            Self::Results => "Resultados Disponibles",
            Self::UserManagement => "Usuarios",
            Self::ElectionManagement => "Eleccion",
            Self::CandidacyManagement => "Candidatura",
            Self::Profile => "Perfil",
        }
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.title())
    }
}

/// Sections available to `role`, in display order.
///
/// Results only appear once some election has finished.
pub fn sections_for(role: Role, has_finalized: bool) -> Vec<Section> {
    let mut sections = vec![Section::Home, Section::AvailableElections];

    if has_finalized {
        sections.push(Section::Results);
    }

    match role {
        Role::Admin => sections.extend([
            Section::UserManagement,
            Section::ElectionManagement,
            Section::CandidacyManagement,
        ]),
        Role::Administrativo => {
            sections.extend([Section::ElectionManagement, Section::CandidacyManagement]);
        }
        Role::Candidato | Role::Votante => {}
    }

    sections.push(Section::Profile);

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voters_see_the_common_sections() {
        assert_eq!(
            sections_for(Role::Votante, false),
            vec![
                Section::Home,
                Section::AvailableElections,
                Section::Profile
            ]
        );
    }

    #[test]
    fn results_appear_once_an_election_finished() {
        assert!(sections_for(Role::Candidato, true).contains(&Section::Results));
        assert!(!sections_for(Role::Admin, false).contains(&Section::Results));
    }

    #[test]
    fn only_admin_manages_users() {
        for role in Role::ALL {
            let sections = sections_for(role, true);

            assert_eq!(
                sections.contains(&Section::UserManagement),
                role == Role::Admin,
                "unexpected user management access for {role}"
            );
            assert_eq!(
                sections.contains(&Section::ElectionManagement),
                role.manages_elections(),
                "unexpected election management access for {role}"
            );
        }
    }
}
