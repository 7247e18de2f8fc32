//! Draw allocation, draw editing and standings for debate tournaments.
//!
//! Everything operates on an explicit [`Tournament`] value. Randomness is
//! always passed in, so a seeded generator reproduces a draw exactly.

extern crate alloc;

pub mod ballot;
pub mod checkin;
pub mod draw;
pub mod editor;
pub mod error;
pub mod model;
pub mod roster;
pub mod shared;
pub mod standings;
pub mod tournament;

pub use ballot::ScoreEntry;
pub use draw::DrawParameters;
pub use editor::MoveTarget;
pub use error::{ErrorCategory, TabError};
pub use roster::{Roster, RosterRecord};
pub use shared::SharedTournament;
pub use standings::compute_standings;
pub use tournament::Tournament;
