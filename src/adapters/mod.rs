// src/adapters/mod.rs
//! Source-format adapters.
//!
//! Every adapter turns one raw document into canonical candidates and nothing
//! else: no I/O, no registry lookups. Bad rows become [`SkippedRow`]s; only a
//! document whose overall shape is unrecognizable yields an [`AdapterError`].
//! Callers pick an adapter by [`SourceKind`] and never special-case a source.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use serde::Serialize;

use crate::error::AdapterError;
use crate::model::{
    CompetitionGame, Game, GameType, MhrRankingEntry, OpponentCandidate, Source, StandingsTable,
};

pub mod manual;
pub mod mhr;
pub mod owha;
pub mod owha_standings;
pub mod playdown_entry;
pub mod team_list;
pub mod teamsnap;

pub use owha::LeagueGame;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SourceKind {
    OwhaSchedule,
    OwhaStandings,
    MhrGames,
    MhrRankings,
    Teamsnap,
    Manual,
    PlaydownEntry,
    TeamList,
}

impl SourceKind {
    pub const ALL: [SourceKind; 8] = [
        SourceKind::OwhaSchedule,
        SourceKind::OwhaStandings,
        SourceKind::MhrGames,
        SourceKind::MhrRankings,
        SourceKind::Teamsnap,
        SourceKind::Manual,
        SourceKind::PlaydownEntry,
        SourceKind::TeamList,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::OwhaSchedule => "owha-schedule",
            SourceKind::OwhaStandings => "owha-standings",
            SourceKind::MhrGames => "mhr-games",
            SourceKind::MhrRankings => "mhr-rankings",
            SourceKind::Teamsnap => "teamsnap",
            SourceKind::Manual => "manual",
            SourceKind::PlaydownEntry => "playdown-entry",
            SourceKind::TeamList => "team-list",
        }
    }

    /// The `source` stamped on records this kind produces.
    pub fn source(self) -> Source {
        match self {
            SourceKind::OwhaSchedule | SourceKind::OwhaStandings => Source::Owha,
            SourceKind::MhrGames | SourceKind::MhrRankings => Source::Mhr,
            SourceKind::Teamsnap => Source::Teamsnap,
            SourceKind::Manual | SourceKind::TeamList => Source::Manual,
            SourceKind::PlaydownEntry => Source::PlaydownEntry,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SourceKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| format!("Unknown source kind: {s}"))
    }
}

/// The owning team's point of view for one import.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportContext {
    pub team_id: String,
    pub team_name: String,
    /// Year the season starts in (a 2024-25 season is 2024).
    pub season_start_year: i32,
    /// Stamped on games whose source carries no type of its own.
    pub game_type: GameType,
    pub mhr_team_nbr: Option<u64>,
    pub source_url: Option<String>,
}

impl ImportContext {
    pub fn new(team_id: impl Into<String>, team_name: impl Into<String>, season_start_year: i32) -> Self {
        Self {
            team_id: team_id.into(),
            team_name: team_name.into(),
            season_start_year,
            ..Self::default()
        }
    }

    pub fn with_game_type(mut self, game_type: GameType) -> Self {
        self.game_type = game_type;
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRow {
    /// 1-based row number within the document's data rows.
    pub row: usize,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseOutput {
    pub games: Vec<Game>,
    pub league_games: Vec<LeagueGame>,
    pub competition_games: Vec<CompetitionGame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standings: Option<StandingsTable>,
    pub opponents: Vec<OpponentCandidate>,
    pub rankings: Vec<MhrRankingEntry>,
    pub skipped: Vec<SkippedRow>,
}

impl ParseOutput {
    /// Source rows that produced something. One schedule row yields a league
    /// game and maybe a team game; it still counts once.
    pub fn parsed_count(&self) -> usize {
        let rows = self.league_games.len().max(self.games.len())
            + self.competition_games.len()
            + self.rankings.len().max(self.standings.as_ref().map_or(0, |t| t.rows.len()));
        if rows == 0 { self.opponents.len() } else { rows }
    }
}

pub trait Adapter {
    fn kind(&self) -> SourceKind;
    fn parse(&self, raw: &str, ctx: &ImportContext) -> Result<ParseOutput, AdapterError>;
}

pub fn adapter_for(kind: SourceKind) -> Box<dyn Adapter> {
    match kind {
        SourceKind::OwhaSchedule => Box::new(owha::OwhaSchedule),
        SourceKind::OwhaStandings => Box::new(owha_standings::OwhaStandings),
        SourceKind::MhrGames => Box::new(mhr::MhrGames),
        SourceKind::MhrRankings => Box::new(mhr::MhrRankings),
        SourceKind::Teamsnap => Box::new(teamsnap::Teamsnap),
        SourceKind::Manual => Box::new(manual::ManualCsv),
        SourceKind::PlaydownEntry => Box::new(playdown_entry::PlaydownEntry),
        SourceKind::TeamList => Box::new(team_list::TeamList),
    }
}

/// Parse `raw` with the adapter registered for `kind`.
pub fn parse(kind: SourceKind, raw: &str, ctx: &ImportContext) -> Result<ParseOutput, AdapterError> {
    let t0 = Instant::now();
    let out = adapter_for(kind).parse(raw, ctx)?;
    log::debug!(
        "{kind}: parsed {} records, skipped {} rows in {:?}",
        out.parsed_count(),
        out.skipped.len(),
        t0.elapsed()
    );
    Ok(out)
}

/* ---------------- helpers ---------------- */

/// Header lookup for tabular exports whose column order drifts.
pub(crate) struct Columns {
    names: Vec<String>,
}

impl Columns {
    pub(crate) fn new(header: &[String]) -> Self {
        Self { names: header.iter().map(|h| header_key(h)).collect() }
    }

    /// Index of the first column whose normalized name equals any alias.
    pub(crate) fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases.iter().find_map(|a| self.names.iter().position(|n| n == a))
    }

    pub(crate) fn require(&self, aliases: &[&str], label: &'static str) -> Result<usize, AdapterError> {
        self.find(aliases).ok_or(AdapterError::MissingColumn(label))
    }
}

fn header_key(h: &str) -> String {
    h.trim()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Trimmed cell `idx` of `row`, or `""` when the row is short.
pub(crate) fn cell(row: &[String], idx: Option<usize>) -> &str {
    idx.and_then(|i| row.get(i)).map(|s| s.trim()).unwrap_or("")
}

/// Read `"Home"` / `"Away"` / `"H"` / `"@"` style markers.
pub(crate) fn parse_home_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "home" | "h" | "yes" | "y" | "true" | "1" => Some(true),
        "away" | "a" | "@" | "visitor" | "visiting" | "no" | "n" | "false" | "0" => Some(false),
        _ => None,
    }
}

/// Optional score cell: empty is `None`, digits are `Some`, anything else is an error reason.
pub(crate) fn parse_score_cell(text: &str) -> Result<Option<u32>, String> {
    let t = text.trim();
    if t.is_empty() || t == "-" {
        return Ok(None);
    }
    t.parse::<u32>().map(Some).map_err(|_| format!("bad score {t:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_round_trip_through_text() {
        for k in SourceKind::ALL {
            assert_eq!(k.as_str().parse::<SourceKind>(), Ok(k));
            assert_eq!(adapter_for(k).kind(), k);
        }
        assert!("owha".parse::<SourceKind>().is_err());
    }

    #[test]
    fn columns_ignore_case_and_punctuation() {
        let cols = Columns::new(&[s!("Date"), s!("Home/Away"), s!("Game Type")]);
        assert_eq!(cols.find(&["homeaway"]), Some(1));
        assert_eq!(cols.find(&["type", "gametype"]), Some(2));
        assert!(matches!(cols.require(&["opponent"], "Opponent"), Err(AdapterError::MissingColumn("Opponent"))));
    }

    #[test]
    fn score_cells() {
        assert_eq!(parse_score_cell(" 3 "), Ok(Some(3)));
        assert_eq!(parse_score_cell(""), Ok(None));
        assert!(parse_score_cell("x").is_err());
    }
}
