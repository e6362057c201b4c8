// src/error.rs
//! Hard errors only. A bad row is a `SkippedRow`, a same-contest conflict is
//! a `DuplicateStatus::Ambiguous`; neither lives here.

use std::io;

/// The document's overall shape is unrecognizable; the import is aborted.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("results table not found (no live-updating table body)")]
    TableNotFound,
    #[error("required column {0:?} missing from header row")]
    MissingColumn(&'static str),
    #[error("not a valid {format} document: {reason}")]
    Malformed { format: &'static str, reason: String },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A competition's games or teams disagree with its configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("game {game_id} references team {team_id:?}, which is not configured")]
    UnknownTeam { game_id: String, team_id: String },
    #[error("team {0:?} is configured more than once")]
    DuplicateTeam(String),
    #[error("no team is designated \"self\"")]
    MissingSelf,
    #[error("pool {0:?} is not defined")]
    UnknownPool(String),
    #[error("team {0:?} is not assigned to a pool")]
    Unpooled(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("no game with id {0:?}")]
    NotFound(String),
}

/// Anything that stops an import before its records reach storage.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0} imports need a competition id")]
    NoCompetition(&'static str),
}
