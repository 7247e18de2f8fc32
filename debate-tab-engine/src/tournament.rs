use alloc::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::checkin::CheckInTracker;
use crate::error::{CheckInError, Result, TabError};
use crate::model::{
    Ballot, BallotId, CheckInStatus, Participant, ParticipantId, Round, RoundId, Standing,
};
use crate::roster::{ImportSummary, Roster, RosterRecord};
use crate::standings::compute_standings;

/// The whole state of one tournament.
///
/// Every engine operation is a method on this aggregate; draw generation,
/// draw editing and ballot submission live next to their algorithms in
/// [`crate::draw`], [`crate::editor`] and [`crate::ballot`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tournament {
    pub(crate) roster: Roster,
    pub(crate) check_ins: CheckInTracker,
    pub(crate) rounds: Vec<Round>,
    pub(crate) ballots: Vec<Ballot>,
    pub(crate) next_round_id: u32,
    pub(crate) next_ballot_id: u32,
}

impl Tournament {
    #[must_use]
    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn import_roster<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a RosterRecord>,
    ) -> ImportSummary {
        let summary = self.roster.import(records);
        for participant_id in &summary.added {
            self.check_ins
                .set_status(*participant_id, CheckInStatus::Pending);
        }
        info!(
            added = summary.added.len(),
            skipped_incomplete = summary.skipped_incomplete,
            skipped_duplicate = summary.skipped_duplicate,
            "imported roster"
        );
        summary
    }

    pub fn register_participant(&mut self, record: &RosterRecord) -> Result<Arc<Participant>> {
        let participant = self.roster.register(record)?;
        self.check_ins
            .set_status(participant.id, CheckInStatus::Pending);
        Ok(participant)
    }

    #[must_use]
    pub fn find_participant_by_email(&self, email: &str) -> Option<&Arc<Participant>> {
        self.roster.find_by_email(email)
    }

    #[must_use]
    pub fn check_in_status(&self, participant_id: ParticipantId) -> CheckInStatus {
        self.check_ins.status(participant_id)
    }

    pub fn set_check_in_status(
        &mut self,
        participant_id: ParticipantId,
        status: CheckInStatus,
    ) -> Result<()> {
        if self.roster.participant(participant_id).is_none() {
            return Err(CheckInError::ParticipantNotFound(participant_id).into());
        }
        self.check_ins.set_status(participant_id, status);
        Ok(())
    }

    /// Returns how many participants were switched to present.
    pub fn set_all_pending_to_present(&mut self) -> usize {
        self.check_ins
            .set_all_pending_to_present(self.roster.participants())
    }

    #[must_use]
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn round(&self, round_id: RoundId) -> Result<&Round> {
        self.rounds
            .iter()
            .find(|round| round.id == round_id)
            .ok_or(TabError::RoundNotFound(round_id))
    }

    #[must_use]
    pub fn live_round(&self) -> Option<&Round> {
        self.rounds.iter().find(|round| round.is_live)
    }

    /// All ballots, or only those of `round_id`.
    pub fn ballots(&self, round_id: Option<RoundId>) -> impl Iterator<Item = &Ballot> {
        self.ballots
            .iter()
            .filter(move |ballot| round_id.map_or(true, |round_id| ballot.round_id == round_id))
    }

    #[must_use]
    pub fn ballot(&self, ballot_id: BallotId) -> Option<&Ballot> {
        self.ballots.iter().find(|ballot| ballot.id == ballot_id)
    }

    #[must_use]
    pub fn ballot_for_judge(&self, judge_id: ParticipantId, round_id: RoundId) -> Option<&Ballot> {
        self.ballots
            .iter()
            .find(|ballot| ballot.judge.id == judge_id && ballot.round_id == round_id)
    }

    #[must_use]
    pub fn standings(&self) -> Vec<Standing> {
        compute_standings(
            self.roster.participants(),
            self.roster.institutions(),
            &self.ballots,
            &self.rounds,
        )
    }

    /// Ballots of `round_id` whose judge no longer sits in the ballot's room,
    /// which happens when a judge is moved after the draw was generated.
    pub fn stale_ballots(&self, round_id: RoundId) -> Result<Vec<&Ballot>> {
        let round = self.round(round_id)?;
        Ok(self
            .ballots(Some(round_id))
            .filter(|ballot| {
                round.room(ballot.room_id).map_or(true, |room| {
                    !room.judges().any(|judge| judge.id == ballot.judge.id)
                })
            })
            .collect())
    }
}
