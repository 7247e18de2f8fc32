use alloc::sync::Arc;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{CheckInStatus, Participant, ParticipantId, Role};

/// Presence for the current round cycle. Unknown participants read as pending.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckInTracker {
    statuses: BTreeMap<ParticipantId, CheckInStatus>,
}

impl CheckInTracker {
    #[must_use]
    pub fn status(&self, participant_id: ParticipantId) -> CheckInStatus {
        self.statuses
            .get(&participant_id)
            .copied()
            .unwrap_or_default()
    }

    pub fn set_status(&mut self, participant_id: ParticipantId, status: CheckInStatus) {
        self.statuses.insert(participant_id, status);
    }

    /// Marks everyone still pending as present. Absent participants stay absent.
    pub fn set_all_pending_to_present<'a>(
        &mut self,
        participants: impl IntoIterator<Item = &'a Arc<Participant>>,
    ) -> usize {
        let mut changed = 0;
        for participant in participants {
            if participant.role == Role::Admin {
                continue;
            }
            let status = self.statuses.entry(participant.id).or_default();
            if *status == CheckInStatus::Pending {
                *status = CheckInStatus::Present;
                changed += 1;
            }
        }
        changed
    }

    /// Starts a new cycle: every non-admin participant has to confirm again.
    pub fn reset<'a>(&mut self, participants: impl IntoIterator<Item = &'a Arc<Participant>>) {
        self.statuses = participants
            .into_iter()
            .filter(|participant| participant.role != Role::Admin)
            .map(|participant| (participant.id, CheckInStatus::Pending))
            .collect();
    }

    /// Present participants of `role`, in roster order.
    pub fn present<'a>(
        &'a self,
        participants: &'a [Arc<Participant>],
        role: Role,
    ) -> impl Iterator<Item = &'a Arc<Participant>> + 'a {
        participants.iter().filter(move |participant| {
            participant.role == role && self.status(participant.id) == CheckInStatus::Present
        })
    }
}
