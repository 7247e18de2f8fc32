//! Participants and institutions of a tournament.
//!
//! The roster only ever grows. Participants are handed out as [`Arc`]s so that
//! rounds, ballots and standings share one immutable identity.

use alloc::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RosterError;
use crate::model::{Institution, InstitutionId, Participant, ParticipantId, Role};

const UNKNOWN_COUNTRY: &str = "N/A";

/// One row as delivered by the ingestion collaborator. Missing fields
/// deserialize as empty so the record is counted as incomplete on import
/// instead of failing the whole roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub institution_name: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: Vec<ParticipantId>,
    pub skipped_incomplete: usize,
    pub skipped_duplicate: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    participants: Vec<Arc<Participant>>,
    institutions: Vec<Arc<Institution>>,
    next_participant_id: u32,
    next_institution_id: u32,
}

impl Roster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A roster seeded with the tab director, who belongs to a synthetic
    /// "Admins" institution.
    #[must_use]
    pub fn with_admin(name: &str, email: &str) -> Self {
        let mut roster = Self::new();
        let institution_id = roster.institution_for("Admins", UNKNOWN_COUNTRY);
        roster.push_participant(name, email, Role::Admin, institution_id);
        roster
    }

    #[must_use]
    pub fn participants(&self) -> &[Arc<Participant>] {
        &self.participants
    }

    #[must_use]
    pub fn institutions(&self) -> &[Arc<Institution>] {
        &self.institutions
    }

    #[must_use]
    pub fn participant(&self, id: ParticipantId) -> Option<&Arc<Participant>> {
        self.participants.iter().find(|participant| participant.id == id)
    }

    #[must_use]
    pub fn institution(&self, id: InstitutionId) -> Option<&Arc<Institution>> {
        self.institutions.iter().find(|institution| institution.id == id)
    }

    #[must_use]
    pub fn find_by_email(&self, email: &str) -> Option<&Arc<Participant>> {
        self.participants
            .iter()
            .find(|participant| participant.email.eq_ignore_ascii_case(email.trim()))
    }

    /// Adds a single participant, creating its institution on first mention.
    pub fn register(&mut self, record: &RosterRecord) -> Result<Arc<Participant>, RosterError> {
        let name = record.name.trim();
        let email = record.email.trim();
        let institution_name = record.institution_name.trim();
        for (value, field) in [
            (name, "name"),
            (email, "email"),
            (institution_name, "institution"),
        ] {
            if value.is_empty() {
                return Err(RosterError::IncompleteRecord(field));
            }
        }
        let Some(role) = record.role else {
            return Err(RosterError::IncompleteRecord("role"));
        };
        if self.find_by_email(email).is_some() {
            return Err(RosterError::DuplicateEmail(email.to_owned()));
        }

        let institution_id = self.institution_for(institution_name, record.country.trim());
        Ok(self.push_participant(name, email, role, institution_id))
    }

    /// Bulk ingestion. Incomplete and duplicate records are skipped, not fatal.
    pub fn import<'a>(
        &mut self,
        records: impl IntoIterator<Item = &'a RosterRecord>,
    ) -> ImportSummary {
        let mut summary = ImportSummary::default();
        for record in records {
            match self.register(record) {
                Ok(participant) => summary.added.push(participant.id),
                Err(RosterError::IncompleteRecord(field)) => {
                    debug!(email = %record.email, field, "skipping incomplete roster record");
                    summary.skipped_incomplete += 1;
                }
                Err(RosterError::DuplicateEmail(email)) => {
                    debug!(%email, "skipping duplicate roster record");
                    summary.skipped_duplicate += 1;
                }
            }
        }
        summary
    }

    fn institution_for(&mut self, name: &str, country: &str) -> InstitutionId {
        if let Some(existing) = self
            .institutions
            .iter()
            .find(|institution| institution.name.eq_ignore_ascii_case(name))
        {
            return existing.id;
        }
        let id = InstitutionId(self.next_institution_id);
        self.next_institution_id += 1;
        let country = if country.is_empty() {
            UNKNOWN_COUNTRY
        } else {
            country
        };
        self.institutions.push(Arc::new(Institution {
            id,
            name: name.to_owned(),
            country: country.to_owned(),
        }));
        id
    }

    fn push_participant(
        &mut self,
        name: &str,
        email: &str,
        role: Role,
        institution_id: InstitutionId,
    ) -> Arc<Participant> {
        let participant = Arc::new(Participant {
            id: ParticipantId(self.next_participant_id),
            name: name.to_owned(),
            email: email.to_owned(),
            role,
            institution_id,
        });
        self.next_participant_id += 1;
        self.participants.push(Arc::clone(&participant));
        participant
    }
}
