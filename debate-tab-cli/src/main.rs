//! Runs a whole tournament from a roster file: imports the roster, draws
//! every round, fills in ballots and prints the final standings as JSON.

use core::fmt::{Debug, Display};
use std::fs;
use std::path::PathBuf;

use debate_tab_config::{get_config, Config, ConfigError};
use debate_tab_engine::ballot::expected_rank;
use debate_tab_engine::model::{BallotId, RoundId};
use debate_tab_engine::{DrawParameters, RosterRecord, ScoreEntry, TabError, Tournament};
use debate_tab_engine::{Roster, SharedTournament};
use debate_tab_telemetry::{setup_telemetry, TryInitError};
use itertools::Itertools;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};

#[derive(thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("failed to install logging: {0}")]
    Telemetry(#[from] TryInitError),
    #[error("failed to read roster {path}: {source}")]
    RosterFile {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed roster: {0}")]
    RosterFormat(#[from] serde_json::Error),
    #[error("{0}")]
    Tab(#[from] TabError),
}

impl Debug for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

fn read_roster(config: &Config) -> Result<Vec<RosterRecord>, CliError> {
    let contents =
        fs::read_to_string(&config.roster_path).map_err(|source| CliError::RosterFile {
            path: config.roster_path.clone(),
            source,
        })?;
    Ok(serde_json::from_str(&contents)?)
}

/// Scores for every speaker on the ballot, ranked the way a judge would rank
/// them.
fn random_entries<R: Rng + ?Sized>(
    tournament: &Tournament,
    ballot_id: BallotId,
    rng: &mut R,
) -> Vec<ScoreEntry> {
    let Some(ballot) = tournament.ballot(ballot_id) else {
        return Vec::new();
    };
    let scores = ballot
        .scores
        .iter()
        .map(|_| f64::from(rng.gen_range(60_u8..=90)))
        .collect_vec();
    ballot
        .scores
        .iter()
        .zip(&scores)
        .map(|(record, &score)| ScoreEntry {
            speaker: record.speaker.id,
            score,
            rank: expected_rank(&scores, score),
        })
        .collect()
}

fn play_round<R: Rng + ?Sized>(
    shared: &SharedTournament,
    round_name: &str,
    parameters: DrawParameters,
    rng: &mut R,
) -> Result<(), CliError> {
    let round_id: RoundId = shared.write(|tournament| {
        tournament.set_all_pending_to_present();
        Ok(tournament.generate_draw(round_name, parameters, rng)?.id)
    })?;

    let ballot_ids = shared.read(|tournament| {
        tournament
            .ballots(Some(round_id))
            .map(|ballot| ballot.id)
            .collect_vec()
    })?;
    for ballot_id in ballot_ids {
        shared.write(|tournament| {
            let entries = random_entries(tournament, ballot_id, rng);
            tournament.submit_ballot(ballot_id, &entries)?;
            Ok(())
        })?;
    }

    shared.read(|tournament| {
        if let Ok(round) = tournament.round(round_id) {
            info!(
                round = %round.name,
                rooms = round.rooms.len(),
                unassigned_speakers = round.unassigned.speakers.len(),
                unassigned_judges = round.unassigned.judges.len(),
                "round completed"
            );
        }
    })?;
    Ok(())
}

fn main() -> Result<(), CliError> {
    let config = get_config()?;
    setup_telemetry()?;

    let mut rng = config
        .seed
        .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);

    let records = read_roster(&config)?;
    let mut tournament = Tournament::new(Roster::with_admin(
        &config.tournament.admin_name,
        &config.tournament.admin_email,
    ));
    let summary = tournament.import_roster(&records);
    if summary.skipped_incomplete + summary.skipped_duplicate > 0 {
        warn!(
            skipped_incomplete = summary.skipped_incomplete,
            skipped_duplicate = summary.skipped_duplicate,
            "some roster records were not imported"
        );
    }
    info!(tournament = %config.tournament.name, rounds = config.rounds, "starting");

    let shared = SharedTournament::new(tournament);
    let parameters = DrawParameters::new(
        config.draw.speakers_per_room,
        config.draw.judges_per_room,
    );
    for number in 1..=config.rounds {
        play_round(&shared, &format!("Round {number}"), parameters, &mut rng)?;
    }

    let standings = shared.read(Tournament::standings)?;
    println!("{}", serde_json::to_string_pretty(&standings)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use debate_tab_engine::model::Role;

    use super::*;

    fn drawn_tournament(rng: &mut StdRng) -> (Tournament, RoundId) {
        let mut tournament = Tournament::new(Roster::with_admin("Tab", "tab@example.org"));
        let records = (0..9)
            .map(|i| RosterRecord {
                name: format!("Person {i}"),
                email: format!("person{i}@example.org"),
                role: Some(if i < 6 { Role::Speaker } else { Role::Judge }),
                institution_name: format!("School {}", i % 3),
                country: String::new(),
            })
            .collect_vec();
        tournament.import_roster(&records);
        tournament.set_all_pending_to_present();
        let round_id = tournament
            .generate_draw("Round 1", DrawParameters::new(3, 1), rng)
            .unwrap()
            .id;
        (tournament, round_id)
    }

    #[test]
    fn synthetic_ballots_pass_validation() {
        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let (mut tournament, round_id) = drawn_tournament(&mut rng);
            let ballot_ids = tournament
                .ballots(Some(round_id))
                .map(|ballot| ballot.id)
                .collect_vec();
            assert_eq!(ballot_ids.len(), 2);

            for ballot_id in ballot_ids {
                let entries = random_entries(&tournament, ballot_id, &mut rng);
                assert_eq!(entries.len(), 3);
                tournament.submit_ballot(ballot_id, &entries).unwrap();
            }
            assert!(tournament
                .standings()
                .iter()
                .all(|standing| standing.rounds_played == 1));
        }
    }

    #[test]
    fn unknown_ballot_gets_no_entries() {
        let mut rng = StdRng::seed_from_u64(1);
        let (tournament, _) = drawn_tournament(&mut rng);
        assert!(random_entries(&tournament, BallotId(999), &mut rng).is_empty());
    }
}
