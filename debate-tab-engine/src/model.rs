use alloc::sync::Arc;
use core::fmt::{self, Display};
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

id_type!(ParticipantId, "participant");
id_type!(InstitutionId, "institution");
id_type!(RoundId, "round");
id_type!(RoomId, "room");
id_type!(BallotId, "ballot");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Judge,
    Speaker,
}

/// The role a participant holds inside a room. Admins are never placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeatRole {
    Speaker,
    Judge,
}

impl From<SeatRole> for Role {
    fn from(value: SeatRole) -> Self {
        match value {
            SeatRole::Speaker => Self::Speaker,
            SeatRole::Judge => Self::Judge,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    pub id: InstitutionId,
    pub name: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub institution_id: InstitutionId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheckInStatus {
    #[default]
    Pending,
    Present,
    Absent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomAssignment {
    pub participant: Arc<Participant>,
    pub role: SeatRole,
    /// Status at the moment of placement.
    pub check_in_status: CheckInStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub assignments: Vec<RoomAssignment>,
}

impl Room {
    pub fn speakers(&self) -> impl Iterator<Item = &Arc<Participant>> {
        self.seated(SeatRole::Speaker)
    }

    pub fn judges(&self) -> impl Iterator<Item = &Arc<Participant>> {
        self.seated(SeatRole::Judge)
    }

    fn seated(&self, role: SeatRole) -> impl Iterator<Item = &Arc<Participant>> {
        self.assignments
            .iter()
            .filter(move |assignment| assignment.role == role)
            .map(|assignment| &assignment.participant)
    }

    #[must_use]
    pub fn contains(&self, participant_id: ParticipantId) -> bool {
        self.assignments
            .iter()
            .any(|assignment| assignment.participant.id == participant_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unassigned {
    pub speakers: Vec<Arc<Participant>>,
    pub judges: Vec<Arc<Participant>>,
}

impl Unassigned {
    pub(crate) fn list_mut(&mut self, role: SeatRole) -> &mut Vec<Arc<Participant>> {
        match role {
            SeatRole::Speaker => &mut self.speakers,
            SeatRole::Judge => &mut self.judges,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub name: String,
    pub is_live: bool,
    pub rooms: Vec<Room>,
    pub unassigned: Unassigned,
}

impl Round {
    #[must_use]
    pub fn room(&self, room_id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == room_id)
    }

    /// Every placed participant id, rooms first, then the unassigned pool.
    pub fn participant_ids(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.rooms
            .iter()
            .flat_map(|room| room.assignments.iter().map(|a| a.participant.id))
            .chain(self.unassigned.speakers.iter().map(|p| p.id))
            .chain(self.unassigned.judges.iter().map(|p| p.id))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub speaker: Arc<Participant>,
    pub score: f64,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    pub id: BallotId,
    pub round_id: RoundId,
    pub room_id: RoomId,
    pub judge: Arc<Participant>,
    pub scores: Vec<ScoreRecord>,
    pub submitted: bool,
}

impl Ballot {
    #[must_use]
    pub fn score_for(&self, speaker_id: ParticipantId) -> Option<&ScoreRecord> {
        self.scores
            .iter()
            .find(|record| record.speaker.id == speaker_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    pub rank: u32,
    pub participant: Arc<Participant>,
    pub institution: Arc<Institution>,
    pub total_score: f64,
    pub average_score: f64,
    pub scores_by_round: BTreeMap<RoundId, f64>,
    pub rounds_played: u32,
}
