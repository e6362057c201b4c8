// src/model/mod.rs
//! Canonical records moving through the engine. Everything here is plain data
//! with serde derives; JSON field names are camelCase.

pub mod competition;
pub mod game;
pub mod mhr;
pub mod opponent;
pub mod standings;

pub use competition::*;
pub use game::*;
pub use mhr::MhrRankingEntry;
pub use opponent::{Opponent, OpponentCandidate};
pub use standings::{StandingsRow, StandingsTable};
