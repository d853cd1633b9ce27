#![expect(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "command results go to stdout and failures to stderr"
)]

use std::error::Error;

use jiff::Timestamp;
use urna::{
    domain::{
        candidacies::records::CandidacyListing,
        elections::{records::ElectionRecord, state::resolve_state},
        profiles::records::ProfileRecord,
        results::records::CandidateResult,
        users::records::UserRecord,
    },
    navigation::Section,
    session::Session,
};

/// `error` followed by each of its sources.
pub(crate) fn describe(context: &str, error: &dyn Error) -> String {
    let mut message = format!("{context}: {error}");
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}

pub(crate) fn message(text: &str) {
    println!("{text}");
}

pub(crate) fn failure(text: &str) {
    eprintln!("{text}");
}

/// Elections with the state they hold at `now`, whether or not it was persisted.
pub(crate) fn elections(elections: &[ElectionRecord], now: Timestamp) {
    if elections.is_empty() {
        println!("no elections");
        return;
    }

    for election in elections {
        println!(
            "{id}\t{state}\t{start} .. {end}\t{name} ({kind})",
            id = election.id,
            state = resolve_state(election, now),
            start = election.start_date,
            end = election.end_date,
            name = election.name,
            kind = election.representation_type,
        );
    }
}

pub(crate) fn election(election: &ElectionRecord) {
    println!("id: {}", election.id);
    println!("name: {}", election.name);
    println!("description: {}", election.description);
    println!("representation: {}", election.representation_type);
    println!("start: {}", election.start_date);
    println!("end: {}", election.end_date);
    println!("state: {}", election.state);
}

pub(crate) fn candidacies(listings: &[CandidacyListing]) {
    if listings.is_empty() {
        println!("no candidacies");
        return;
    }

    for listing in listings {
        println!(
            "{id}\t{election}\t{nominee}\t{proposal}",
            id = listing.candidacy.id,
            election = listing.election_name.as_deref().unwrap_or("-"),
            nominee = listing.username.as_deref().unwrap_or("-"),
            proposal = listing.candidacy.proposal,
        );
    }
}

pub(crate) fn results(results: &[CandidateResult]) {
    if results.is_empty() {
        println!("no votes");
        return;
    }

    for (position, result) in results.iter().enumerate() {
        println!(
            "{rank}. {name}\t{votes}",
            rank = position + 1,
            name = result.name,
            votes = result.votes,
        );
    }
}

pub(crate) fn users(users: &[UserRecord]) {
    if users.is_empty() {
        println!("no users");
        return;
    }

    for user in users {
        println!(
            "{id}\t{role}\t{username}\t{identification}",
            id = user.id,
            role = user.role,
            username = user.username,
            identification = user.identification,
        );
    }
}

pub(crate) fn profile(profile: Option<&ProfileRecord>) {
    let Some(profile) = profile else {
        println!("no profile saved");
        return;
    };

    println!("first name: {}", profile.first_name);
    println!("last name: {}", profile.last_name);
    println!("age: {}", profile.age);
    println!("gender: {}", profile.gender);
}

pub(crate) fn session(session: &Session) {
    println!("user: {} ({})", session.user.username, session.user.id);
    println!("identification: {}", session.user.identification);
    println!("role: {}", session.user.role);
}

pub(crate) fn sections(sections: &[Section]) {
    for section in sections {
        println!("{section}");
    }
}
