use thiserror::Error;

use crate::model::{BallotId, ParticipantId, RoomId, RoundId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("a participant with email {0} already exists")]
    DuplicateEmail(String),
    #[error("participant record is missing its {0}")]
    IncompleteRecord(&'static str),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckInError {
    #[error("unknown {0}")]
    ParticipantNotFound(ParticipantId),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    #[error("rooms need at least one speaker")]
    InvalidRoomCapacity,
    #[error("round {0:?} already exists")]
    DuplicateRoundName(String),
    #[error("no checked-in speakers available to generate a draw")]
    NoEligibleSpeakers,
    #[error("not enough checked-in judges: need {needed}, but only have {available}")]
    InsufficientJudges { needed: usize, available: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MoveError {
    #[error("no round has been generated yet")]
    NoRounds,
    #[error("{0} does not exist in the current round")]
    RoomNotFound(RoomId),
    #[error("{0} is not at the given source")]
    ParticipantNotAtSource(ParticipantId),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BallotError {
    #[error("unknown {0}")]
    NotFound(BallotId),
    #[error("{0} was already submitted, use the overwrite path to correct it")]
    AlreadySubmitted(BallotId),
    #[error("{0} has not been submitted yet, nothing to overwrite")]
    NotYetSubmitted(BallotId),
    #[error("{0} is not scored on this ballot")]
    UnexpectedSpeaker(ParticipantId),
    #[error("{0} was scored more than once")]
    DuplicateSpeaker(ParticipantId),
    #[error("{0} is missing a score")]
    MissingSpeaker(ParticipantId),
    #[error("score {score} for {speaker} must be greater than 0 and at most 100")]
    ScoreOutOfRange { speaker: ParticipantId, score: f64 },
    #[error("{0} must be given a rank of at least 1")]
    RankMissing(ParticipantId),
    #[error(
        "rank for {speaker} is incorrect. Based on the scores, it should be rank {expected}, \
         not {actual}"
    )]
    RankMismatch {
        speaker: ParticipantId,
        expected: u32,
        actual: u32,
    },
}

/// How a caller should treat a failure. None of them are fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Capacity,
    NotFound,
    Internal,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TabError {
    #[error("roster error: {0}")]
    Roster(#[from] RosterError),
    #[error("check-in error: {0}")]
    CheckIn(#[from] CheckInError),
    #[error("draw error: {0}")]
    Draw(#[from] DrawError),
    #[error("move error: {0}")]
    Move(#[from] MoveError),
    #[error("ballot error: {0}")]
    Ballot(#[from] BallotError),
    #[error("unknown {0}")]
    RoundNotFound(RoundId),
    #[error("tournament state lock was poisoned by a panicking writer")]
    Poisoned,
}

impl TabError {
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Roster(_)
            | Self::Draw(DrawError::InvalidRoomCapacity | DrawError::DuplicateRoundName(_))
            | Self::Ballot(
                BallotError::AlreadySubmitted(_)
                | BallotError::NotYetSubmitted(_)
                | BallotError::UnexpectedSpeaker(_)
                | BallotError::DuplicateSpeaker(_)
                | BallotError::MissingSpeaker(_)
                | BallotError::ScoreOutOfRange { .. }
                | BallotError::RankMissing(_)
                | BallotError::RankMismatch { .. },
            ) => ErrorCategory::Validation,
            Self::Draw(DrawError::NoEligibleSpeakers | DrawError::InsufficientJudges { .. }) => {
                ErrorCategory::Capacity
            }
            Self::CheckIn(_)
            | Self::Move(_)
            | Self::Ballot(BallotError::NotFound(_))
            | Self::RoundNotFound(_) => ErrorCategory::NotFound,
            Self::Poisoned => ErrorCategory::Internal,
        }
    }
}

pub type Result<T, E = TabError> = core::result::Result<T, E>;
