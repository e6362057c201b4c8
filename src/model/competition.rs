// src/model/competition.rs
//! Competition definitions (playdowns, tournaments) and their games.
//!
//! A configuration is an immutable value: standings and qualification take it
//! as an argument on every call, so any result can be recomputed from
//! `(config, games)` alone.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::Source;
use crate::config::consts::*;
use crate::core::sanitize::normalize_key;
use crate::error::ConfigError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionTeam {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_id: Option<String>,
}

impl CompetitionTeam {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), pool_id: None }
    }

    pub fn in_pool(mut self, pool_id: impl Into<String>) -> Self {
        self.pool_id = Some(pool_id.into());
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PointScheme {
    pub win: u32,
    pub tie: u32,
    pub loss: u32,
    pub overtime_loss: u32,
    pub shootout_loss: u32,
    /// When false, overtime and shootout losses are plain losses.
    pub distinguish_overtime: bool,
}

impl Default for PointScheme {
    fn default() -> Self {
        Self {
            win: DEFAULT_WIN_POINTS,
            tie: DEFAULT_TIE_POINTS,
            loss: 0,
            overtime_loss: DEFAULT_OT_LOSS_POINTS,
            shootout_loss: DEFAULT_OT_LOSS_POINTS,
            distinguish_overtime: false,
        }
    }
}

impl PointScheme {
    /// Most points one game can be worth to one team.
    pub fn max_per_game(&self) -> u32 {
        self.win.max(self.tie).max(self.loss).max(self.overtime_loss).max(self.shootout_loss)
    }
}

/// One step of the ranking cascade. Higher is better unless noted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TiebreakRule {
    Points,
    Wins,
    /// Points earned in games among the tied teams only.
    HeadToHead,
    GoalDifferential,
    GoalsFor,
    /// Fewer is better.
    GoalsAgainst,
    /// Fewer is better.
    FewestPenaltyMinutes,
}

pub const DEFAULT_TIEBREAKS: [TiebreakRule; 5] = [
    TiebreakRule::Points,
    TiebreakRule::Wins,
    TiebreakRule::HeadToHead,
    TiebreakRule::GoalDifferential,
    TiebreakRule::GoalsFor,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AdvancementRule {
    /// The top `count` teams of the pool advance.
    TopN { count: u32 },
    /// A single-elimination bracket seeded from the pool; `size` teams make it.
    Bracket { size: u32 },
}

impl Default for AdvancementRule {
    fn default() -> Self { AdvancementRule::TopN { count: 1 } }
}

impl AdvancementRule {
    pub fn spots(&self) -> usize {
        match *self {
            AdvancementRule::TopN { count } => count as usize,
            AdvancementRule::Bracket { size } => size as usize,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompetitionRules {
    pub points: PointScheme,
    pub tiebreaks: Vec<TiebreakRule>,
    pub advancement: AdvancementRule,
    /// Games each pair of teams plays against each other. When unset, the
    /// schedule is whatever games have been entered.
    pub games_per_matchup: Option<u32>,
}

impl Default for CompetitionRules {
    fn default() -> Self {
        Self {
            points: PointScheme::default(),
            tiebreaks: DEFAULT_TIEBREAKS.to_vec(),
            advancement: AdvancementRule::default(),
            games_per_matchup: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaydownConfig {
    pub id: String,
    /// Owning team.
    pub team_id: String,
    #[serde(default)]
    pub name: String,
    /// Participants in configuration order; exactly one is `"self"`.
    pub teams: Vec<CompetitionTeam>,
    #[serde(default)]
    pub rules: CompetitionRules,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl PlaydownConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_teams(&self.teams)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentConfig {
    pub id: String,
    pub team_id: String,
    #[serde(default)]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub pools: Vec<Pool>,
    pub teams: Vec<CompetitionTeam>,
    #[serde(default)]
    pub rules: CompetitionRules,
}

impl TournamentConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_teams(&self.teams)?;
        let pools: HashSet<&str> = self.pools.iter().map(|p| p.id.as_str()).collect();
        for team in &self.teams {
            match &team.pool_id {
                None => return Err(ConfigError::Unpooled(team.id.clone())),
                Some(p) if !pools.contains(p.as_str()) => return Err(ConfigError::UnknownPool(p.clone())),
                Some(_) => {}
            }
        }
        Ok(())
    }

    pub fn pool(&self, pool_id: &str) -> Option<&Pool> {
        self.pools.iter().find(|p| p.id == pool_id)
    }

    /// Teams of one pool, in configuration order.
    pub fn pool_teams(&self, pool_id: &str) -> Vec<CompetitionTeam> {
        self.teams.iter().filter(|t| t.pool_id.as_deref() == Some(pool_id)).cloned().collect()
    }
}

fn validate_teams(teams: &[CompetitionTeam]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for t in teams {
        if !seen.insert(t.id.as_str()) {
            return Err(ConfigError::DuplicateTeam(t.id.clone()));
        }
    }
    if !seen.contains(SELF_ID) {
        return Err(ConfigError::MissingSelf);
    }
    Ok(())
}

/// Shape of a competition file: `{ "kind": "playdown", ... }`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Competition {
    Playdown(PlaydownConfig),
    Tournament(TournamentConfig),
}

impl Competition {
    pub fn id(&self) -> &str {
        match self { Competition::Playdown(c) => &c.id, Competition::Tournament(c) => &c.id }
    }

    pub fn name(&self) -> &str {
        match self { Competition::Playdown(c) => &c.name, Competition::Tournament(c) => &c.name }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self { Competition::Playdown(c) => c.validate(), Competition::Tournament(c) => c.validate() }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    #[default]
    Regulation,
    Overtime,
    Shootout,
}

/// A game inside a competition. Sides reference participant ids from the
/// competition's team list (including `"self"`), not the opponent registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionGame {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    pub home_id: String,
    pub away_id: String,
    home_score: Option<u32>,
    away_score: Option<u32>,
    #[serde(default)]
    played: bool,
    #[serde(default)]
    pub decision: Decision,
    #[serde(default)]
    pub home_pim: u32,
    #[serde(default)]
    pub away_pim: u32,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pool_id: Option<String>,
    #[serde(default = "default_competition_source")]
    pub source: Source,
}

fn default_competition_source() -> Source { Source::PlaydownEntry }

impl CompetitionGame {
    pub fn new(date: NaiveDate, home_id: impl Into<String>, away_id: impl Into<String>) -> Self {
        let home_id = home_id.into();
        let away_id = away_id.into();
        let id = format!("{date}-{}-{}", normalize_key(&home_id).replace(' ', "_"), normalize_key(&away_id).replace(' ', "_"));
        Self {
            id,
            date,
            time: None,
            home_id,
            away_id,
            home_score: None,
            away_score: None,
            played: false,
            decision: Decision::Regulation,
            home_pim: 0,
            away_pim: 0,
            location: s!(),
            pool_id: None,
            source: Source::PlaydownEntry,
        }
    }

    pub fn with_score(mut self, home: u32, away: u32) -> Self {
        self.record_score(home, away, Decision::Regulation);
        self
    }

    pub fn decided_in(mut self, decision: Decision) -> Self {
        self.decision = decision;
        self
    }

    pub fn record_score(&mut self, home: u32, away: u32, decision: Decision) {
        self.home_score = Some(home);
        self.away_score = Some(away);
        self.decision = decision;
        self.played = true;
    }

    pub fn clear_score(&mut self) {
        self.home_score = None;
        self.away_score = None;
        self.decision = Decision::Regulation;
        self.played = false;
    }

    pub fn played(&self) -> bool { self.played }

    /// `(home, away)` when played.
    pub fn score(&self) -> Option<(u32, u32)> {
        if !self.played { return None; }
        Some((self.home_score?, self.away_score?))
    }

    pub fn involves(&self, team_id: &str) -> bool {
        self.home_id == team_id || self.away_id == team_id
    }

    pub fn is_consistent(&self) -> bool {
        match (self.played, self.home_score, self.away_score) {
            (true, Some(_), Some(_)) => true,
            (false, None, None) => true,
            _ => false,
        }
    }
}
