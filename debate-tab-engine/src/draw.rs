//! Round generation.
//!
//! Speakers are ordered (shuffled for the first round, power paired by the
//! current standings afterwards), cut into full rooms, and every room gets its
//! judges from a shuffled pool that prefers judges without an institutional
//! clash with the room's speakers.

use alloc::sync::Arc;
use std::collections::HashSet;

use rand::seq::SliceRandom as _;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::DrawError;
use crate::model::{
    Ballot, BallotId, CheckInStatus, InstitutionId, Participant, ParticipantId, Role, Room,
    RoomAssignment, RoomId, Round, RoundId, ScoreRecord, SeatRole, Standing, Unassigned,
};
use crate::tournament::Tournament;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawParameters {
    pub speakers_per_room: usize,
    pub judges_per_room: usize,
}

impl DrawParameters {
    #[must_use]
    pub const fn new(speakers_per_room: usize, judges_per_room: usize) -> Self {
        Self {
            speakers_per_room,
            judges_per_room,
        }
    }
}

/// Orders the present speakers for a power-paired round.
///
/// Speakers who already hold a standing come first, best rank first. Everyone
/// without a scored round is appended in random order.
pub fn power_order<R: Rng + ?Sized>(
    eligible: Vec<Arc<Participant>>,
    standings: &[Standing],
    rng: &mut R,
) -> Vec<Arc<Participant>> {
    let eligible_ids: HashSet<ParticipantId> =
        eligible.iter().map(|participant| participant.id).collect();
    let mut ordered: Vec<Arc<Participant>> = standings
        .iter()
        .filter(|standing| {
            standing.rounds_played > 0 && eligible_ids.contains(&standing.participant.id)
        })
        .map(|standing| Arc::clone(&standing.participant))
        .collect();
    let ranked_ids: HashSet<ParticipantId> =
        ordered.iter().map(|participant| participant.id).collect();

    let mut unranked: Vec<Arc<Participant>> = eligible
        .into_iter()
        .filter(|participant| !ranked_ids.contains(&participant.id))
        .collect();
    unranked.shuffle(rng);
    ordered.extend(unranked);
    ordered
}

/// Takes `judges_per_room` judges out of `pool` for a room seating `speakers`.
///
/// Judges are tried in random order, each at most once, so at most
/// `pool.len()` attempts are made, which stays within a budget of twice the
/// pool size. A judge sharing an institution with any speaker is passed over.
/// Slots that stay empty are then filled from the front of the pool regardless
/// of clashes.
pub fn assign_judges<R: Rng + ?Sized>(
    speakers: &[Arc<Participant>],
    pool: &mut Vec<Arc<Participant>>,
    judges_per_room: usize,
    rng: &mut R,
) -> Vec<Arc<Participant>> {
    let clashing: HashSet<InstitutionId> = speakers
        .iter()
        .map(|speaker| speaker.institution_id)
        .collect();

    let mut candidates: Vec<ParticipantId> = pool.iter().map(|judge| judge.id).collect();
    candidates.shuffle(rng);

    let mut assigned = Vec::with_capacity(judges_per_room.min(pool.len()));
    for candidate in candidates {
        if assigned.len() == judges_per_room {
            break;
        }
        let Some(position) = pool.iter().position(|judge| judge.id == candidate) else {
            continue;
        };
        if !clashing.contains(&pool[position].institution_id) {
            assigned.push(pool.remove(position));
        }
    }

    let missing = judges_per_room - assigned.len();
    if missing > 0 {
        let take = missing.min(pool.len());
        warn!(
            missing,
            available = pool.len(),
            "not enough judges without institutional clash, filling room regardless"
        );
        assigned.extend(pool.drain(..take));
    }
    assigned
}

fn blank_ballot(
    id: BallotId,
    round_id: RoundId,
    room_id: RoomId,
    judge: &Arc<Participant>,
    speakers: &[Arc<Participant>],
) -> Ballot {
    Ballot {
        id,
        round_id,
        room_id,
        judge: Arc::clone(judge),
        scores: speakers
            .iter()
            .map(|speaker| ScoreRecord {
                speaker: Arc::clone(speaker),
                score: 0.0,
                rank: 0,
            })
            .collect(),
        submitted: false,
    }
}

fn seat(participant: &Arc<Participant>, role: SeatRole) -> RoomAssignment {
    RoomAssignment {
        participant: Arc::clone(participant),
        role,
        check_in_status: CheckInStatus::Present,
    }
}

/// Splits ordered speakers into full rooms and hands out judges.
///
/// Returns the round together with one blank ballot per judge per room.
/// `next_ballot_id` is advanced past every ballot handed out.
///
/// # Panics
/// If `parameters.speakers_per_room` is zero.
pub fn allocate<R: Rng + ?Sized>(
    round_id: RoundId,
    name: &str,
    speakers: &[Arc<Participant>],
    mut judges: Vec<Arc<Participant>>,
    parameters: DrawParameters,
    next_ballot_id: &mut u32,
    rng: &mut R,
) -> (Round, Vec<Ballot>) {
    let chunks = speakers.chunks_exact(parameters.speakers_per_room);
    let leftover = chunks.remainder().to_vec();

    let mut rooms = Vec::new();
    let mut ballots = Vec::new();
    for (number, room_speakers) in (1_u32..).zip(chunks) {
        let room_id = RoomId(number);
        let room_judges =
            assign_judges(room_speakers, &mut judges, parameters.judges_per_room, rng);
        debug!(
            room = %room_id,
            speakers = room_speakers.len(),
            judges = room_judges.len(),
            "allocated room"
        );

        for judge in &room_judges {
            *next_ballot_id += 1;
            ballots.push(blank_ballot(
                BallotId(*next_ballot_id),
                round_id,
                room_id,
                judge,
                room_speakers,
            ));
        }

        rooms.push(Room {
            id: room_id,
            name: format!("Room {number}"),
            assignments: room_speakers
                .iter()
                .map(|speaker| seat(speaker, SeatRole::Speaker))
                .chain(room_judges.iter().map(|judge| seat(judge, SeatRole::Judge)))
                .collect(),
        });
    }

    let round = Round {
        id: round_id,
        name: name.to_owned(),
        is_live: true,
        rooms,
        unassigned: Unassigned {
            speakers: leftover,
            judges,
        },
    };
    (round, ballots)
}

impl Tournament {
    /// Generates the next round from everyone currently checked in.
    ///
    /// Nothing is changed unless the draw succeeds. On success the new round is
    /// the only live one and every non-admin has to check in again.
    #[instrument(skip(self, rng))]
    pub fn generate_draw<R: Rng + ?Sized>(
        &mut self,
        round_name: &str,
        parameters: DrawParameters,
        rng: &mut R,
    ) -> Result<&Round, DrawError> {
        if parameters.speakers_per_room == 0 {
            return Err(DrawError::InvalidRoomCapacity);
        }
        if self.rounds.iter().any(|round| round.name == round_name) {
            return Err(DrawError::DuplicateRoundName(round_name.to_owned()));
        }

        let participants = self.roster.participants();
        let speakers: Vec<Arc<Participant>> = self
            .check_ins
            .present(participants, Role::Speaker)
            .cloned()
            .collect();
        if speakers.is_empty() {
            return Err(DrawError::NoEligibleSpeakers);
        }

        let room_count = speakers.len() / parameters.speakers_per_room;
        let mut judges: Vec<Arc<Participant>> = self
            .check_ins
            .present(participants, Role::Judge)
            .cloned()
            .collect();
        let needed = room_count
            .checked_mul(parameters.judges_per_room)
            .unwrap_or(usize::MAX);
        if judges.len() < needed {
            return Err(DrawError::InsufficientJudges {
                needed,
                available: judges.len(),
            });
        }

        let speakers = if self.rounds.is_empty() {
            let mut speakers = speakers;
            speakers.shuffle(rng);
            speakers
        } else {
            power_order(speakers, &self.standings(), rng)
        };
        judges.shuffle(rng);

        let round_id = RoundId(self.next_round_id + 1);
        let mut next_ballot_id = self.next_ballot_id;
        let (round, ballots) = allocate(
            round_id,
            round_name,
            &speakers,
            judges,
            parameters,
            &mut next_ballot_id,
            rng,
        );

        info!(
            round = %round_id,
            rooms = round.rooms.len(),
            ballots = ballots.len(),
            unassigned_speakers = round.unassigned.speakers.len(),
            unassigned_judges = round.unassigned.judges.len(),
            "generated draw"
        );

        self.next_round_id = round_id.0;
        self.next_ballot_id = next_ballot_id;
        for previous in &mut self.rounds {
            previous.is_live = false;
        }
        self.rounds.push(round);
        self.ballots.extend(ballots);
        self.check_ins.reset(self.roster.participants());

        let index = self.rounds.len() - 1;
        Ok(&self.rounds[index])
    }
}
