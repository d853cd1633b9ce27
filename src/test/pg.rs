//! Repository behaviour against a real `PostgreSQL` schema.

use std::{sync::Arc, time::Duration};

use jiff::Timestamp;
use testresult::TestResult;
use tokio::sync::mpsc;

use crate::{
    changes::{ChangeEvent, ChangeFeed, ChangeOperation, PgChangeFeed, Table},
    domain::{
        candidacies::{
            data::CandidacyFields,
            repository::{CandidaciesRepository, PgCandidaciesRepository},
        },
        elections::{
            data::{ElectionFields, ElectionFilter},
            records::{ElectionRecord, ElectionState},
            repository::{ElectionsRepository, PgElectionsRepository},
        },
        users::{
            data::NewUserRow,
            password::hash_password,
            records::{Role, UserId, UserRecord},
            repository::{PgUsersRepository, UsersRepository},
        },
        votes::{
            VoteError, VotingManager, VotingService,
            data::NewVote,
            repository::{PgVotesRepository, VotesRepository},
        },
    },
    errors::BackendError,
};

use super::TestDb;

const DURING: &str = "2025-03-01T12:00:00Z";

async fn create_user(db: &TestDb, username: &str, role: Role) -> TestResult<UserRecord> {
    Ok(PgUsersRepository::new(db.pool().clone())
        .create_user(&NewUserRow {
            identification: format!("ID-{username}"),
            username: username.to_string(),
            password_hash: hash_password("clave"),
            role,
        })
        .await?)
}

async fn create_election(
    db: &TestDb,
    name: &str,
    start: &str,
    end: &str,
) -> TestResult<ElectionRecord> {
    Ok(PgElectionsRepository::new(db.pool().clone())
        .create_election(
            &ElectionFields {
                name: name.to_string(),
                description: "Periodo 2025".to_string(),
                representation_type: "Estudiantes".to_string(),
                start_date: start.parse()?,
                end_date: end.parse()?,
                state: ElectionState::Pendiente,
            },
            start.parse()?,
        )
        .await?)
}

#[tokio::test]
async fn unique_index_rejects_a_second_vote() -> TestResult {
    let db = TestDb::new().await;

    let ana = create_user(&db, "ana", Role::Candidato).await?;
    let maria = create_user(&db, "maria", Role::Votante).await?;
    let election =
        create_election(&db, "Consejo", "2025-03-01T08:00:00Z", "2025-03-01T18:00:00Z").await?;

    let candidacy = PgCandidaciesRepository::new(db.pool().clone())
        .create_candidacy(
            &CandidacyFields {
                user_id: ana.id,
                election_id: election.id,
                proposal: "Mas becas".to_string(),
            },
            DURING.parse()?,
        )
        .await?;

    let votes = PgVotesRepository::new(db.pool().clone());
    let vote = NewVote {
        user_id: maria.id,
        election_id: election.id,
        candidacy_id: candidacy.id,
    };

    votes.create_vote(&vote, DURING.parse()?).await?;

    let duplicate = votes.create_vote(&vote, DURING.parse()?).await;

    assert!(
        matches!(duplicate, Err(BackendError::AlreadyExists)),
        "expected AlreadyExists, got {duplicate:?}"
    );

    let again = VotingManager::pg(db.pool().clone())
        .cast_vote(maria.actor(), election.id, candidacy.id, DURING.parse()?)
        .await;

    assert!(
        matches!(again, Err(VoteError::AlreadyVoted)),
        "expected AlreadyVoted, got {again:?}"
    );

    let ballots = votes.list_ballots(election.id).await?;

    assert_eq!(ballots.len(), 1);
    assert_eq!(
        ballots
            .first()
            .and_then(|ballot| ballot.candidate_name.as_deref()),
        Some("ana")
    );

    Ok(())
}

#[tokio::test]
async fn election_listings_follow_filter_and_order() -> TestResult {
    let db = TestDb::new().await;
    let repository = PgElectionsRepository::new(db.pool().clone());

    let march =
        create_election(&db, "Marzo", "2025-03-01T08:00:00Z", "2025-03-01T18:00:00Z").await?;
    let april =
        create_election(&db, "Abril", "2025-04-01T08:00:00Z", "2025-04-01T18:00:00Z").await?;

    assert_eq!(
        repository
            .update_election_state(march.id, ElectionState::Finalizada)
            .await?,
        1
    );

    let ids = |elections: Vec<ElectionRecord>| -> Vec<_> {
        elections.into_iter().map(|election| election.id).collect()
    };

    assert_eq!(
        ids(repository.list_elections(&ElectionFilter::available()).await?),
        vec![march.id, april.id]
    );
    assert_eq!(
        ids(repository.list_elections(&ElectionFilter::management()).await?),
        vec![april.id, march.id]
    );
    assert_eq!(
        ids(repository.list_elections(&ElectionFilter::finalized()).await?),
        vec![march.id]
    );

    let fetched = repository.get_election(march.id).await?;

    assert_eq!(fetched.state, ElectionState::Finalizada);
    assert_eq!(fetched.start_date, "2025-03-01T08:00:00Z".parse::<Timestamp>()?);

    Ok(())
}

#[tokio::test]
async fn candidacy_listing_joins_nominee_and_election() -> TestResult {
    let db = TestDb::new().await;
    let repository = PgCandidaciesRepository::new(db.pool().clone());

    let ana = create_user(&db, "ana", Role::Candidato).await?;
    let council =
        create_election(&db, "Consejo", "2025-03-01T08:00:00Z", "2025-03-01T18:00:00Z").await?;
    let board =
        create_election(&db, "Directiva", "2025-03-01T08:00:00Z", "2025-03-01T18:00:00Z").await?;

    for election in [&council, &board] {
        repository
            .create_candidacy(
                &CandidacyFields {
                    user_id: ana.id,
                    election_id: election.id,
                    proposal: "Mas becas".to_string(),
                },
                DURING.parse()?,
            )
            .await?;
    }

    assert_eq!(repository.list_candidacies(None).await?.len(), 2);

    let listings = repository.list_candidacies(Some(board.id)).await?;

    assert_eq!(listings.len(), 1);
    assert_eq!(
        listings
            .first()
            .map(|listing| (listing.username.as_deref(), listing.election_name.as_deref())),
        Some((Some("ana"), Some("Directiva")))
    );

    let unknown_nominee = repository
        .create_candidacy(
            &CandidacyFields {
                user_id: UserId::new(9_999),
                election_id: board.id,
                proposal: "Nadie".to_string(),
            },
            DURING.parse()?,
        )
        .await;

    assert!(
        matches!(unknown_nominee, Err(BackendError::InvalidReference)),
        "expected InvalidReference, got {unknown_nominee:?}"
    );

    Ok(())
}

#[tokio::test]
async fn change_feed_reports_inserts() -> TestResult {
    let db = TestDb::new().await;
    let (sender, mut receiver) = mpsc::unbounded_channel();

    let subscription = PgChangeFeed::new(db.pool().clone())
        .subscribe(
            Table::Elections,
            Arc::new(move |event: ChangeEvent| {
                let _sent = sender.send(event);
            }),
        )
        .await?;

    create_election(&db, "Consejo", "2025-03-01T08:00:00Z", "2025-03-01T18:00:00Z").await?;

    let event = tokio::time::timeout(Duration::from_secs(5), receiver.recv()).await?;

    assert_eq!(
        event,
        Some(ChangeEvent {
            table: Table::Elections,
            operation: ChangeOperation::Insert,
        })
    );

    subscription.cancel();
    subscription.closed().await;

    Ok(())
}
