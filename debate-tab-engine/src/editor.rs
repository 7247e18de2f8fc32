//! Manual corrections to the most recent draw.

use alloc::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MoveError, TabError};
use crate::model::{
    CheckInStatus, Participant, ParticipantId, RoomAssignment, RoomId, Round, SeatRole,
};
use crate::tournament::Tournament;

/// Where a participant is taken from or put to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveTarget {
    Room(RoomId),
    Unassigned,
}

fn room_index(round: &Round, room_id: RoomId) -> Result<usize, MoveError> {
    round
        .rooms
        .iter()
        .position(|room| room.id == room_id)
        .ok_or(MoveError::RoomNotFound(room_id))
}

fn locate(
    round: &Round,
    participant_id: ParticipantId,
    source_room: Option<usize>,
) -> Option<SeatRole> {
    if let Some(index) = source_room {
        return round.rooms[index]
            .assignments
            .iter()
            .find(|assignment| assignment.participant.id == participant_id)
            .map(|assignment| assignment.role);
    }
    if round.unassigned.speakers.iter().any(|p| p.id == participant_id) {
        Some(SeatRole::Speaker)
    } else if round.unassigned.judges.iter().any(|p| p.id == participant_id) {
        Some(SeatRole::Judge)
    } else {
        None
    }
}

fn take(
    round: &mut Round,
    participant_id: ParticipantId,
    source_room: Option<usize>,
) -> Option<(Arc<Participant>, SeatRole, CheckInStatus)> {
    if let Some(index) = source_room {
        let assignments = &mut round.rooms[index].assignments;
        let position = assignments
            .iter()
            .position(|assignment| assignment.participant.id == participant_id)?;
        let assignment = assignments.remove(position);
        return Some((
            assignment.participant,
            assignment.role,
            assignment.check_in_status,
        ));
    }

    [SeatRole::Speaker, SeatRole::Judge]
        .into_iter()
        .find_map(|role| {
            let list = round.unassigned.list_mut(role);
            let position = list.iter().position(|p| p.id == participant_id)?;
            Some((list.remove(position), role, CheckInStatus::Present))
        })
}

/// Relocates one participant inside `round`.
///
/// The participant keeps the role it was found with. Unknown rooms and
/// participants that are not at `source` leave the round untouched.
pub fn move_participant(
    round: &mut Round,
    participant_id: ParticipantId,
    source: MoveTarget,
    destination: MoveTarget,
) -> Result<SeatRole, MoveError> {
    let source_room = match source {
        MoveTarget::Room(room_id) => Some(room_index(round, room_id)?),
        MoveTarget::Unassigned => None,
    };
    let destination_room = match destination {
        MoveTarget::Room(room_id) => Some(room_index(round, room_id)?),
        MoveTarget::Unassigned => None,
    };

    if source == destination {
        return locate(round, participant_id, source_room)
            .ok_or(MoveError::ParticipantNotAtSource(participant_id));
    }

    let (participant, role, check_in_status) = take(round, participant_id, source_room)
        .ok_or(MoveError::ParticipantNotAtSource(participant_id))?;
    match destination_room {
        Some(index) => round.rooms[index].assignments.push(RoomAssignment {
            participant,
            role,
            check_in_status,
        }),
        None => round.unassigned.list_mut(role).push(participant),
    }
    Ok(role)
}

impl Tournament {
    /// Applies [`move_participant`] to the latest round.
    ///
    /// Ballots are left alone. A judge leaving a room they hold a ballot for
    /// turns that ballot stale, see [`Tournament::stale_ballots`].
    pub fn move_participant(
        &mut self,
        participant_id: ParticipantId,
        source: MoveTarget,
        destination: MoveTarget,
    ) -> Result<&Round, TabError> {
        let round = self.rounds.last_mut().ok_or(MoveError::NoRounds)?;
        let role = move_participant(round, participant_id, source, destination)?;
        let round_id = round.id;
        info!(participant = %participant_id, ?source, ?destination, "moved participant");

        if role == SeatRole::Judge && source != destination {
            if let MoveTarget::Room(room_id) = source {
                let strands_ballot = self.ballots.iter().any(|ballot| {
                    ballot.round_id == round_id
                        && ballot.room_id == room_id
                        && ballot.judge.id == participant_id
                });
                if strands_ballot {
                    warn!(
                        judge = %participant_id,
                        room = %room_id,
                        "judge left a room they hold a ballot for"
                    );
                }
            }
        }

        let index = self.rounds.len() - 1;
        Ok(&self.rounds[index])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InstitutionId, Role, Room, RoundId, Unassigned};

    fn person(id: u32, role: Role) -> Arc<Participant> {
        Arc::new(Participant {
            id: ParticipantId(id),
            name: format!("p{id}"),
            email: format!("p{id}@example.org"),
            role,
            institution_id: InstitutionId(0),
        })
    }

    fn seated(participant: Arc<Participant>, role: SeatRole) -> RoomAssignment {
        RoomAssignment {
            participant,
            role,
            check_in_status: CheckInStatus::Present,
        }
    }

    fn round() -> Round {
        Round {
            id: RoundId(1),
            name: "Round 1".to_owned(),
            is_live: true,
            rooms: vec![
                Room {
                    id: RoomId(1),
                    name: "Room 1".to_owned(),
                    assignments: vec![
                        seated(person(1, Role::Speaker), SeatRole::Speaker),
                        seated(person(2, Role::Speaker), SeatRole::Speaker),
                        seated(person(10, Role::Judge), SeatRole::Judge),
                    ],
                },
                Room {
                    id: RoomId(2),
                    name: "Room 2".to_owned(),
                    assignments: vec![seated(person(3, Role::Speaker), SeatRole::Speaker)],
                },
            ],
            unassigned: Unassigned {
                speakers: vec![person(4, Role::Speaker)],
                judges: vec![person(11, Role::Judge)],
            },
        }
    }

    fn sorted_ids(round: &Round) -> Vec<ParticipantId> {
        let mut ids: Vec<_> = round.participant_ids().collect();
        ids.sort_unstable();
        ids
    }

    #[test]
    fn moves_between_rooms_and_pool() {
        let mut round = round();
        let before = sorted_ids(&round);

        let role = move_participant(
            &mut round,
            ParticipantId(10),
            MoveTarget::Room(RoomId(1)),
            MoveTarget::Unassigned,
        )
        .unwrap();
        assert_eq!(role, SeatRole::Judge);
        assert_eq!(round.unassigned.judges.len(), 2);

        move_participant(
            &mut round,
            ParticipantId(4),
            MoveTarget::Unassigned,
            MoveTarget::Room(RoomId(2)),
        )
        .unwrap();
        let room = round.room(RoomId(2)).unwrap();
        assert_eq!(room.speakers().count(), 2);
        assert!(round.unassigned.speakers.is_empty());

        move_participant(
            &mut round,
            ParticipantId(11),
            MoveTarget::Unassigned,
            MoveTarget::Room(RoomId(2)),
        )
        .unwrap();
        assert_eq!(round.room(RoomId(2)).unwrap().judges().count(), 1);

        assert_eq!(sorted_ids(&round), before);
    }

    #[test]
    fn missing_participant_leaves_round_untouched() {
        let mut round = round();
        let before = round.clone();
        let error = move_participant(
            &mut round,
            ParticipantId(3),
            MoveTarget::Room(RoomId(1)),
            MoveTarget::Room(RoomId(2)),
        )
        .unwrap_err();

        assert_eq!(error, MoveError::ParticipantNotAtSource(ParticipantId(3)));
        assert_eq!(round, before);
    }

    #[test]
    fn unknown_destination_fails_before_removal() {
        let mut round = round();
        let before = round.clone();
        let error = move_participant(
            &mut round,
            ParticipantId(1),
            MoveTarget::Room(RoomId(1)),
            MoveTarget::Room(RoomId(9)),
        )
        .unwrap_err();

        assert_eq!(error, MoveError::RoomNotFound(RoomId(9)));
        assert_eq!(round, before);
    }

    #[test]
    fn same_source_and_destination_is_a_no_op() {
        let mut round = round();
        move_participant(
            &mut round,
            ParticipantId(4),
            MoveTarget::Unassigned,
            MoveTarget::Unassigned,
        )
        .unwrap();
        assert_eq!(round.unassigned.speakers.len(), 1);
        assert_eq!(sorted_ids(&round).len(), 6);
    }
}
