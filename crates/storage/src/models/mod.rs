mod game;
mod participant;
mod phase;
mod pick;
mod team;

pub use game::{Game, GameResult, NewGame, Outcome};
pub use participant::{NewParticipant, Participant};
pub use phase::{Phase, Slot};
pub use pick::{NewPick, Pick, PickStatus};
pub use team::{NFL_TEAMS, Team, TeamCode};
