use alloc::sync::Arc;
use std::collections::{BTreeMap, HashMap};

use itertools::Itertools as _;
use tracing::warn;

use crate::model::{
    Ballot, Institution, Participant, ParticipantId, Role, Round, RoundId, Standing,
};

#[expect(
    clippy::cast_precision_loss,
    reason = "a speaker is never scored by more than a handful of judges per round"
)]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Ranks every speaker by the sum of their per-round scores.
///
/// A per-round score is the mean over all submitted ballots of that round that
/// score the speaker. Speakers who have not been scored yet are still listed
/// with a total of zero. Equal totals keep roster order and get distinct,
/// consecutive ranks.
///
/// Every speaker's `institution_id` must be present in `institutions`, which
/// [`crate::Roster`] guarantees. A speaker without a matching institution has no
/// standing to report and is left out with a warning.
#[must_use]
pub fn compute_standings(
    participants: &[Arc<Participant>],
    institutions: &[Arc<Institution>],
    ballots: &[Ballot],
    rounds: &[Round],
) -> Vec<Standing> {
    let scores: HashMap<(ParticipantId, RoundId), Vec<f64>> = ballots
        .iter()
        .filter(|ballot| ballot.submitted)
        .flat_map(|ballot| {
            ballot
                .scores
                .iter()
                .map(|record| ((record.speaker.id, ballot.round_id), record.score))
        })
        .into_group_map();

    let mut standings: Vec<Standing> = participants
        .iter()
        .filter(|participant| participant.role == Role::Speaker)
        .filter_map(|speaker| {
            let Some(institution) = institutions
                .iter()
                .find(|institution| institution.id == speaker.institution_id)
            else {
                warn!(speaker = %speaker.id, "speaker references an unknown institution");
                return None;
            };

            let scores_by_round: BTreeMap<RoundId, f64> = rounds
                .iter()
                .filter_map(|round| {
                    scores
                        .get(&(speaker.id, round.id))
                        .map(|round_scores| (round.id, mean(round_scores)))
                })
                .collect();
            let rounds_played = u32::try_from(scores_by_round.len()).unwrap_or(u32::MAX);
            let total_score: f64 = scores_by_round.values().sum();
            let average_score = if rounds_played == 0 {
                0.0
            } else {
                total_score / f64::from(rounds_played)
            };

            Some(Standing {
                rank: 0,
                participant: Arc::clone(speaker),
                institution: Arc::clone(institution),
                total_score,
                average_score,
                scores_by_round,
                rounds_played,
            })
        })
        .collect();

    standings.sort_by(|left, right| right.total_score.total_cmp(&left.total_score));
    for (rank, standing) in (1..).zip(standings.iter_mut()) {
        standing.rank = rank;
    }
    standings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BallotId, InstitutionId, RoomId, ScoreRecord, Unassigned};

    fn institution() -> Arc<Institution> {
        Arc::new(Institution {
            id: InstitutionId(0),
            name: "Uni".to_owned(),
            country: "N/A".to_owned(),
        })
    }

    fn person(id: u32, role: Role) -> Arc<Participant> {
        Arc::new(Participant {
            id: ParticipantId(id),
            name: format!("p{id}"),
            email: format!("p{id}@example.org"),
            role,
            institution_id: InstitutionId(0),
        })
    }

    fn round(id: u32) -> Round {
        Round {
            id: RoundId(id),
            name: format!("Round {id}"),
            is_live: false,
            rooms: Vec::new(),
            unassigned: Unassigned::default(),
        }
    }

    fn ballot(id: u32, round: u32, submitted: bool, scores: &[(&Arc<Participant>, f64)]) -> Ballot {
        Ballot {
            id: BallotId(id),
            round_id: RoundId(round),
            room_id: RoomId(1),
            judge: person(99, Role::Judge),
            scores: scores
                .iter()
                .map(|(speaker, score)| ScoreRecord {
                    speaker: Arc::clone(speaker),
                    score: *score,
                    rank: 1,
                })
                .collect(),
            submitted,
        }
    }

    #[test]
    fn averages_judges_within_a_round() {
        let x = person(1, Role::Speaker);
        let ballots = vec![
            ballot(1, 1, true, &[(&x, 85.0)]),
            ballot(2, 1, true, &[(&x, 75.0)]),
        ];
        let standings =
            compute_standings(&[Arc::clone(&x)], &[institution()], &ballots, &[round(1)]);

        assert_eq!(standings.len(), 1);
        assert!((standings[0].scores_by_round[&RoundId(1)] - 80.0).abs() < f64::EPSILON);
        assert_eq!(standings[0].rounds_played, 1);
    }

    #[test]
    fn sums_rounds_and_ignores_unsubmitted_ballots() {
        let x = person(1, Role::Speaker);
        let ballots = vec![
            ballot(1, 1, true, &[(&x, 70.0)]),
            ballot(2, 2, true, &[(&x, 80.0)]),
            ballot(3, 2, false, &[(&x, 10.0)]),
        ];
        let standings = compute_standings(
            &[Arc::clone(&x)],
            &[institution()],
            &ballots,
            &[round(1), round(2)],
        );

        assert!((standings[0].total_score - 150.0).abs() < f64::EPSILON);
        assert!((standings[0].average_score - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unscored_speakers_are_listed_and_ties_get_distinct_ranks() {
        let participants = vec![
            person(0, Role::Admin),
            person(1, Role::Speaker),
            person(2, Role::Speaker),
            person(3, Role::Judge),
            person(4, Role::Speaker),
        ];
        let ballots = vec![ballot(
            1,
            1,
            true,
            &[(&participants[1], 70.0), (&participants[4], 70.0)],
        )];
        let standings = compute_standings(&participants, &[institution()], &ballots, &[round(1)]);

        let order: Vec<(u32, u32)> = standings
            .iter()
            .map(|standing| (standing.rank, standing.participant.id.0))
            .collect();
        assert_eq!(order, vec![(1, 1), (2, 4), (3, 2)]);
        assert!(standings[2].scores_by_round.is_empty());
        assert!(standings[2].total_score.abs() < f64::EPSILON);
    }

    #[test]
    fn no_ballots_lists_every_speaker_at_zero() {
        let participants = vec![person(1, Role::Speaker), person(2, Role::Speaker)];
        let standings = compute_standings(&participants, &[institution()], &[], &[]);
        assert_eq!(standings.len(), 2);
        assert!(standings.iter().all(|standing| standing.rounds_played == 0));
    }

    #[test]
    fn speakers_without_a_known_institution_are_left_out() {
        let known = person(1, Role::Speaker);
        let stray = Arc::new(Participant {
            institution_id: InstitutionId(42),
            ..(*person(2, Role::Speaker)).clone()
        });
        let standings = compute_standings(
            &[Arc::clone(&known), stray],
            &[institution()],
            &[],
            &[round(1)],
        );

        assert_eq!(standings.len(), 1);
        assert_eq!(standings[0].participant.id, known.id);
    }
}
