//! Election lifecycle resolution.
//!
//! An election is PENDIENTE before its start, ACTIVA from its start up to and
//! including its end instant, and FINALIZADA strictly after its end.

use jiff::Timestamp;

use crate::domain::elections::records::{ElectionRecord, ElectionState};

/// State `election` should be in at `now`.
///
/// Returns the stored state when no transition applies, so applying the
/// result and resolving again at the same instant never yields another change.
pub fn resolve_state(election: &ElectionRecord, now: Timestamp) -> ElectionState {
    resolve(
        election.start_date,
        election.end_date,
        election.state,
        now,
    )
}

/// [`resolve_state`] over the raw window.
pub fn resolve(
    start: Timestamp,
    end: Timestamp,
    stored: ElectionState,
    now: Timestamp,
) -> ElectionState {
    if end < now && stored != ElectionState::Finalizada {
        ElectionState::Finalizada
    } else if start <= now && now <= end && stored != ElectionState::Activa {
        ElectionState::Activa
    } else if start > now && stored != ElectionState::Pendiente {
        ElectionState::Pendiente
    } else {
        stored
    }
}

/// Whether the stored state of `election` diverges from the clock.
pub fn needs_transition(election: &ElectionRecord, now: Timestamp) -> bool {
    resolve_state(election, now) != election.state
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;
    use testresult::TestResult;

    use crate::domain::elections::records::ElectionId;

    use super::*;

    fn election(start: &str, end: &str, state: ElectionState) -> TestResult<ElectionRecord> {
        let start: Timestamp = start.parse()?;

        Ok(ElectionRecord {
            id: ElectionId::new(1),
            name: "Consejo estudiantil".to_string(),
            description: "Periodo 2025".to_string(),
            representation_type: "Estudiantes".to_string(),
            start_date: start,
            end_date: end.parse()?,
            state,
            created_at: start,
            updated_at: start,
        })
    }

    #[test]
    fn end_instant_is_still_active() -> TestResult {
        let e = election(
            "2025-03-01T08:00:00Z",
            "2025-03-01T18:00:00Z",
            ElectionState::Pendiente,
        )?;

        assert_eq!(resolve_state(&e, e.end_date), ElectionState::Activa);

        Ok(())
    }

    #[test]
    fn one_millisecond_after_end_is_finalized() -> TestResult {
        let e = election(
            "2025-03-01T08:00:00Z",
            "2025-03-01T18:00:00Z",
            ElectionState::Activa,
        )?;

        let now = e.end_date.checked_add(SignedDuration::from_millis(1))?;

        assert_eq!(resolve_state(&e, now), ElectionState::Finalizada);

        Ok(())
    }

    #[test]
    fn start_instant_is_active() -> TestResult {
        let e = election(
            "2025-03-01T08:00:00Z",
            "2025-03-01T18:00:00Z",
            ElectionState::Pendiente,
        )?;

        assert_eq!(resolve_state(&e, e.start_date), ElectionState::Activa);

        Ok(())
    }

    #[test]
    fn before_start_is_pending_even_if_stored_otherwise() -> TestResult {
        let e = election(
            "2025-03-01T08:00:00Z",
            "2025-03-01T18:00:00Z",
            ElectionState::Finalizada,
        )?;

        let now: Timestamp = "2025-02-28T08:00:00Z".parse()?;

        assert_eq!(resolve_state(&e, now), ElectionState::Pendiente);
        assert!(needs_transition(&e, now));

        Ok(())
    }

    #[test]
    fn resolving_is_idempotent_for_every_state_and_instant() -> TestResult {
        let instants = [
            "2025-02-01T00:00:00Z",
            "2025-03-01T08:00:00Z",
            "2025-03-01T12:00:00Z",
            "2025-03-01T18:00:00Z",
            "2025-04-01T00:00:00Z",
        ];

        for stored in ElectionState::ALL {
            for instant in instants {
                let now: Timestamp = instant.parse()?;
                let mut e = election("2025-03-01T08:00:00Z", "2025-03-01T18:00:00Z", stored)?;

                e.state = resolve_state(&e, now);

                assert!(
                    !needs_transition(&e, now),
                    "second resolution at {instant} from {stored} should be a no-op"
                );
            }
        }

        Ok(())
    }
}
