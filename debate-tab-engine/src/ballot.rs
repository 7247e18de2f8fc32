//! Validation and committing of judge ballots.

use alloc::sync::Arc;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::error::{BallotError, TabError};
use crate::model::{Ballot, BallotId, ParticipantId, ScoreRecord};
use crate::tournament::Tournament;

pub const MAX_SCORE: f64 = 100.0;

/// A judge's score and rank for one speaker, as submitted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub speaker: ParticipantId,
    pub score: f64,
    pub rank: u32,
}

/// The rank `score` must carry among `scores`: one more than the number of
/// strictly greater scores, so tied speakers share a rank and the next rank is
/// skipped.
#[must_use]
pub fn expected_rank(scores: &[f64], score: f64) -> u32 {
    let greater = scores.iter().filter(|other| **other > score).count();
    u32::try_from(greater).map_or(u32::MAX, |greater| greater.saturating_add(1))
}

/// Checks `entries` against the speakers printed on `ballot` and returns the
/// records to store, in ballot order.
pub fn validate_scores(
    ballot: &Ballot,
    entries: &[ScoreEntry],
) -> Result<Vec<ScoreRecord>, BallotError> {
    let mut by_speaker: HashMap<ParticipantId, &ScoreEntry> =
        HashMap::with_capacity(entries.len());
    for entry in entries {
        if ballot.score_for(entry.speaker).is_none() {
            return Err(BallotError::UnexpectedSpeaker(entry.speaker));
        }
        if by_speaker.insert(entry.speaker, entry).is_some() {
            return Err(BallotError::DuplicateSpeaker(entry.speaker));
        }
    }
    if let Some(missing) = ballot
        .scores
        .iter()
        .find(|record| !by_speaker.contains_key(&record.speaker.id))
    {
        return Err(BallotError::MissingSpeaker(missing.speaker.id));
    }

    // NaN fails this comparison as well
    if let Some(entry) = entries
        .iter()
        .find(|entry| !(entry.score > 0.0 && entry.score <= MAX_SCORE))
    {
        return Err(BallotError::ScoreOutOfRange {
            speaker: entry.speaker,
            score: entry.score,
        });
    }
    if let Some(entry) = entries.iter().find(|entry| entry.rank == 0) {
        return Err(BallotError::RankMissing(entry.speaker));
    }

    let scores: Vec<f64> = entries.iter().map(|entry| entry.score).collect();
    for entry in entries {
        let expected = expected_rank(&scores, entry.score);
        if entry.rank != expected {
            return Err(BallotError::RankMismatch {
                speaker: entry.speaker,
                expected,
                actual: entry.rank,
            });
        }
    }

    Ok(ballot
        .scores
        .iter()
        .map(|record| {
            let entry = by_speaker[&record.speaker.id];
            ScoreRecord {
                speaker: Arc::clone(&record.speaker),
                score: entry.score,
                rank: entry.rank,
            }
        })
        .collect())
}

impl Tournament {
    fn ballot_mut(&mut self, ballot_id: BallotId) -> Result<&mut Ballot, BallotError> {
        self.ballots
            .iter_mut()
            .find(|ballot| ballot.id == ballot_id)
            .ok_or(BallotError::NotFound(ballot_id))
    }

    /// First submission of a ballot. A submitted ballot can only be changed
    /// through [`Tournament::overwrite_ballot`].
    #[instrument(skip(self, entries))]
    pub fn submit_ballot(
        &mut self,
        ballot_id: BallotId,
        entries: &[ScoreEntry],
    ) -> Result<&Ballot, TabError> {
        let ballot = self.ballot_mut(ballot_id)?;
        if ballot.submitted {
            return Err(BallotError::AlreadySubmitted(ballot_id).into());
        }
        ballot.scores = validate_scores(ballot, entries)?;
        ballot.submitted = true;
        info!(judge = %ballot.judge.id, room = %ballot.room_id, "ballot submitted");
        Ok(ballot)
    }

    /// Replaces the scores of an already submitted ballot, e.g. for an
    /// adjudication core correction.
    #[instrument(skip(self, entries))]
    pub fn overwrite_ballot(
        &mut self,
        ballot_id: BallotId,
        entries: &[ScoreEntry],
    ) -> Result<&Ballot, TabError> {
        let ballot = self.ballot_mut(ballot_id)?;
        if !ballot.submitted {
            return Err(BallotError::NotYetSubmitted(ballot_id).into());
        }
        ballot.scores = validate_scores(ballot, entries)?;
        info!(judge = %ballot.judge.id, room = %ballot.room_id, "ballot overwritten");
        Ok(ballot)
    }
}
