// src/model/game.rs
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::core::sanitize::normalize_key;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameType {
    #[default]
    Unlabeled,
    Regular,
    Tournament,
    Exhibition,
    Playoffs,
    Playdowns,
    Provincials,
}

impl GameType {
    pub fn as_str(self) -> &'static str {
        match self {
            GameType::Unlabeled => "unlabeled",
            GameType::Regular => "regular",
            GameType::Tournament => "tournament",
            GameType::Exhibition => "exhibition",
            GameType::Playoffs => "playoffs",
            GameType::Playdowns => "playdowns",
            GameType::Provincials => "provincials",
        }
    }

    /// Best-effort reading of the labels sources print ("Reg Season",
    /// "Tourney", "OWHA Provincials", ...). Unknown labels are `Unlabeled`.
    pub fn from_label(label: &str) -> GameType {
        let lc = label.trim().to_ascii_lowercase();
        if lc.is_empty() { GameType::Unlabeled }
        else if lc.contains("provincial") { GameType::Provincials }
        else if lc.contains("playdown") { GameType::Playdowns }
        else if lc.contains("playoff") || lc.contains("post") { GameType::Playoffs }
        else if lc.contains("tourn") || lc.contains("tourney") { GameType::Tournament }
        else if lc.contains("exhib") || lc.contains("scrimmage") || lc.contains("friendly") { GameType::Exhibition }
        else if lc.contains("reg") || lc.contains("league") || lc.contains("season") { GameType::Regular }
        else { GameType::Unlabeled }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unlabeled" => Ok(GameType::Unlabeled),
            "regular" => Ok(GameType::Regular),
            "tournament" => Ok(GameType::Tournament),
            "exhibition" => Ok(GameType::Exhibition),
            "playoffs" => Ok(GameType::Playoffs),
            "playdowns" => Ok(GameType::Playdowns),
            "provincials" => Ok(GameType::Provincials),
            other => Err(format!("Unknown game type: {other}")),
        }
    }
}

/// Which adapter produced a record.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Source {
    #[default]
    Manual,
    Owha,
    Mhr,
    Teamsnap,
    PlaydownEntry,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Manual => "manual",
            Source::Owha => "owha",
            Source::Mhr => "mhr",
            Source::Teamsnap => "teamsnap",
            Source::PlaydownEntry => "playdown-entry",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    #[serde(rename = "W")] Win,
    #[serde(rename = "L")] Loss,
    #[serde(rename = "T")] Tie,
}

impl GameResult {
    pub fn from_scores(ours: u32, theirs: u32) -> Self {
        match ours.cmp(&theirs) {
            Ordering::Greater => GameResult::Win,
            Ordering::Less => GameResult::Loss,
            Ordering::Equal => GameResult::Tie,
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'W' => Some(GameResult::Win),
            'L' => Some(GameResult::Loss),
            'T' => Some(GameResult::Tie),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self { GameResult::Win => 'W', GameResult::Loss => 'L', GameResult::Tie => 'T' }
    }
}

/// One contest from the owning team's point of view.
///
/// Scores and result only change through [`Game::record_score`] and
/// [`Game::clear_score`], which keep `played`, both scores and `result` in step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub team_id: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    pub opponent_name: String,
    #[serde(default)]
    pub opponent_id: Option<String>,
    #[serde(default)]
    pub location: String,
    team_score: Option<u32>,
    opponent_score: Option<u32>,
    result: Option<GameResult>,
    #[serde(default)]
    pub game_type: GameType,
    pub source: Source,
    #[serde(default)]
    pub source_game_id: Option<String>,
    played: bool,
    #[serde(default)]
    pub home: Option<bool>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl Game {
    /// An unplayed game. The id is derived from provenance so that importing the
    /// same row twice yields the same id.
    pub fn new(
        team_id: impl Into<String>,
        date: NaiveDate,
        opponent_name: impl Into<String>,
        source: Source,
        source_game_id: Option<String>,
    ) -> Self {
        let team_id = team_id.into();
        let opponent_name = opponent_name.into();
        let source_game_id = source_game_id.filter(|s| !s.trim().is_empty());
        let id = derive_id(source, &team_id, date, &opponent_name, source_game_id.as_deref());
        Self {
            id,
            team_id,
            date,
            time: None,
            opponent_name,
            opponent_id: None,
            location: s!(),
            team_score: None,
            opponent_score: None,
            result: None,
            game_type: GameType::Unlabeled,
            source,
            source_game_id,
            played: false,
            home: None,
            notes: s!(),
        }
    }

    pub fn with_score(mut self, team: u32, opponent: u32) -> Self {
        self.record_score(team, opponent);
        self
    }

    pub fn record_score(&mut self, team: u32, opponent: u32) {
        self.team_score = Some(team);
        self.opponent_score = Some(opponent);
        self.result = Some(GameResult::from_scores(team, opponent));
        self.played = true;
    }

    pub fn clear_score(&mut self) {
        self.team_score = None;
        self.opponent_score = None;
        self.result = None;
        self.played = false;
    }

    pub fn team_score(&self) -> Option<u32> { self.team_score }
    pub fn opponent_score(&self) -> Option<u32> { self.opponent_score }
    pub fn result(&self) -> Option<GameResult> { self.result }
    pub fn played(&self) -> bool { self.played }

    pub fn score(&self) -> Option<(u32, u32)> {
        Some((self.team_score?, self.opponent_score?))
    }

    /// Records deserialized from storage bypass the mutators; callers that load
    /// foreign data can check them here.
    pub fn is_consistent(&self) -> bool {
        match (self.played, self.team_score, self.opponent_score, self.result) {
            (true, Some(t), Some(o), Some(r)) => r == GameResult::from_scores(t, o),
            (false, None, None, None) => true,
            _ => false,
        }
    }

    /// `(source, source id)`, falling back to the derived id for sources
    /// that have no native identifier.
    pub fn provenance_key(&self) -> (Source, &str) {
        (self.source, self.source_game_id.as_deref().unwrap_or(&self.id))
    }

    pub fn opponent_key(&self) -> String {
        normalize_key(&self.opponent_name)
    }
}

fn derive_id(source: Source, team_id: &str, date: NaiveDate, opponent: &str, sid: Option<&str>) -> String {
    match sid {
        Some(sid) => format!("{source}-{team_id}-{}", sid.trim()),
        None => format!("{source}-{team_id}-{date}-{}", normalize_key(opponent).replace(' ', "_")),
    }
}

/// Partial update handed to the storage collaborator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GamePatch {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub opponent_id: Option<String>,
    pub location: Option<String>,
    pub game_type: Option<GameType>,
    pub notes: Option<String>,
    pub score: Option<ScorePatch>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ScorePatch {
    Set { team: u32, opponent: u32 },
    Clear,
}

impl GamePatch {
    pub fn score_correction(from: &Game) -> Self {
        let score = match from.score() {
            Some((team, opponent)) => ScorePatch::Set { team, opponent },
            None => ScorePatch::Clear,
        };
        Self { score: Some(score), ..Self::default() }
    }

    pub fn apply(&self, game: &mut Game) {
        if let Some(d) = self.date { game.date = d; }
        if let Some(t) = self.time { game.time = Some(t); }
        if let Some(id) = &self.opponent_id { game.opponent_id = Some(id.clone()); }
        if let Some(loc) = &self.location { game.location = loc.clone(); }
        if let Some(gt) = self.game_type { game.game_type = gt; }
        if let Some(n) = &self.notes { game.notes = n.clone(); }
        match self.score {
            Some(ScorePatch::Set { team, opponent }) => game.record_score(team, opponent),
            Some(ScorePatch::Clear) => game.clear_score(),
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn score_mutators_keep_invariant() {
        let mut g = Game::new("t1", jan(5), "Ice", Source::Owha, Some(s!("12")));
        assert!(g.is_consistent());
        assert!(!g.played());

        g.record_score(3, 1);
        assert!(g.is_consistent());
        assert_eq!(g.result(), Some(GameResult::Win));

        g.record_score(2, 2);
        assert_eq!(g.result(), Some(GameResult::Tie));

        g.clear_score();
        assert!(g.is_consistent());
        assert_eq!(g.score(), None);
    }

    #[test]
    fn ids_follow_provenance() {
        let a = Game::new("t1", jan(5), "Ice", Source::Owha, Some(s!("12")));
        assert_eq!(a.id, "owha-t1-12");
        let b = Game::new("t1", jan(5), "St. Mary's Ice", Source::Manual, None);
        assert_eq!(b.id, "manual-t1-2025-01-05-st_marys_ice");
        assert_eq!(b.provenance_key(), (Source::Manual, b.id.as_str()));
    }

    #[test]
    fn serialized_shape() {
        let g = Game::new("t1", jan(5), "Ice", Source::PlaydownEntry, None).with_score(1, 4);
        let v = serde_json::to_value(&g).unwrap();
        assert_eq!(v["result"], "L");
        assert_eq!(v["source"], "playdown-entry");
        assert_eq!(v["gameType"], "unlabeled");
        assert_eq!(v["teamScore"], 1);
        assert_eq!(v["date"], "2025-01-05");
    }

    #[test]
    fn patch_applies_score_correction() {
        let stored = Game::new("t1", jan(5), "Ice", Source::Owha, Some(s!("12")));
        let fresh = stored.clone().with_score(5, 0);
        let mut target = stored;
        GamePatch::score_correction(&fresh).apply(&mut target);
        assert_eq!(target.score(), Some((5, 0)));
        assert!(target.is_consistent());
    }

    #[test]
    fn labels() {
        assert_eq!(GameType::from_label("Reg Season"), GameType::Regular);
        assert_eq!(GameType::from_label("OWHA Provincials"), GameType::Provincials);
        assert_eq!(GameType::from_label("Tourney"), GameType::Tournament);
        assert_eq!(GameType::from_label("???"), GameType::Unlabeled);
    }
}
