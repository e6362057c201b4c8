// src/adapters/mhr.rs
//! Ranking-service JSON exports: a team's game list and a division's rankings.
//! Both accept a bare array or an object wrapping it (`{"games": [...]}`,
//! `{"rankings": [...]}`). Records are decoded one by one so a single bad
//! record is a skipped row, not a failed import.

use serde::Deserialize;
use serde_json::Value;

use super::{Adapter, ImportContext, ParseOutput, SourceKind};
use crate::core::dates::{parse_game_date, parse_game_time};
use crate::core::sanitize::{contains_words, normalize_key};
use crate::error::AdapterError;
use crate::model::{Game, GameType, MhrRankingEntry, Source, StandingsTable};

pub struct MhrGames;
pub struct MhrRankings;

#[derive(Debug, Deserialize)]
struct MhrGameRecord {
    #[serde(default, alias = "id")]
    game_nbr: Option<Value>,
    #[serde(alias = "date")]
    game_date: String,
    #[serde(default, alias = "time")]
    game_time: Option<String>,
    #[serde(default)]
    home_team_nbr: Option<u64>,
    #[serde(alias = "home_team")]
    home_team_name: String,
    #[serde(default)]
    home_score: Option<u32>,
    #[serde(default)]
    visitor_team_nbr: Option<u64>,
    #[serde(alias = "visitor_team")]
    visitor_team_name: String,
    #[serde(default)]
    visitor_score: Option<u32>,
    #[serde(default, alias = "rink")]
    rink_name: Option<String>,
    #[serde(default)]
    game_type: Option<String>,
}

impl MhrGameRecord {
    fn is_home(&self, ctx: &ImportContext) -> Option<bool> {
        if let Some(nbr) = ctx.mhr_team_nbr {
            if self.home_team_nbr == Some(nbr) { return Some(true); }
            if self.visitor_team_nbr == Some(nbr) { return Some(false); }
            return None;
        }
        let key = normalize_key(&ctx.team_name);
        if key.is_empty() { return None; }
        if normalize_key(&self.home_team_name) == key || contains_words(&self.home_team_name, &ctx.team_name) {
            return Some(true);
        }
        if normalize_key(&self.visitor_team_name) == key || contains_words(&self.visitor_team_name, &ctx.team_name) {
            return Some(false);
        }
        None
    }

    fn source_id(&self) -> Option<String> {
        match self.game_nbr.as_ref()? {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

impl Adapter for MhrGames {
    fn kind(&self) -> SourceKind { SourceKind::MhrGames }

    fn parse(&self, raw: &str, ctx: &ImportContext) -> Result<ParseOutput, AdapterError> {
        let records = unwrap_records(raw, "games")?;
        let mut out = ParseOutput::default();

        for (i, value) in records.into_iter().enumerate() {
            let row = i + 1;
            let rec: MhrGameRecord = match serde_json::from_value(value) {
                Ok(r) => r,
                Err(e) => skip_row!(out, row, "{e}"),
            };
            let Some(home) = rec.is_home(ctx) else {
                skip_row!(out, row, "{} vs {} does not involve the team", rec.home_team_name, rec.visitor_team_name);
            };
            let Some(date) = parse_game_date(&rec.game_date, ctx.season_start_year) else {
                skip_row!(out, row, "unparsable date {:?}", rec.game_date);
            };
            let (opponent, ours, theirs) = if home {
                (&rec.visitor_team_name, rec.home_score, rec.visitor_score)
            } else {
                (&rec.home_team_name, rec.visitor_score, rec.home_score)
            };
            if ours.is_some() != theirs.is_some() {
                skip_row!(out, row, "only one score present");
            }

            let mut g = Game::new(&ctx.team_id, date, opponent.trim(), Source::Mhr, rec.source_id());
            g.home = Some(home);
            g.time = rec.game_time.as_deref().and_then(parse_game_time);
            g.location = rec.rink_name.clone().unwrap_or_default();
            g.game_type = match rec.game_type.as_deref().map(GameType::from_label) {
                Some(GameType::Unlabeled) | None => ctx.game_type,
                Some(t) => t,
            };
            if let (Some(o), Some(t)) = (ours, theirs) {
                g.record_score(o, t);
            }
            out.games.push(g);
        }
        Ok(out)
    }
}

impl Adapter for MhrRankings {
    fn kind(&self) -> SourceKind { SourceKind::MhrRankings }

    fn parse(&self, raw: &str, ctx: &ImportContext) -> Result<ParseOutput, AdapterError> {
        let records = unwrap_records(raw, "rankings")?;
        let mut out = ParseOutput::default();
        let mut table = StandingsTable { source_url: ctx.source_url.clone(), ..StandingsTable::default() };

        for (i, value) in records.into_iter().enumerate() {
            let row = i + 1;
            let entry: MhrRankingEntry = match serde_json::from_value(value) {
                Ok(e) => e,
                Err(e) => skip_row!(out, row, "{e}"),
            };
            table.rows.push(entry.to_standings_row());
            out.rankings.push(entry);
        }
        out.standings = Some(table);
        Ok(out)
    }
}

/* ---------------- helpers ---------------- */

fn unwrap_records(raw: &str, key: &str) -> Result<Vec<Value>, AdapterError> {
    match serde_json::from_str::<Value>(raw)? {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(AdapterError::Malformed { format: "ranking-service export", reason: format!("no {key:?} array") }),
        },
        _ => Err(AdapterError::Malformed { format: "ranking-service export", reason: s!("root is not an array or object") }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn games_from_wrapped_export() {
        let raw = r#"{ "games": [
            { "game_nbr": 501, "game_date": "2024-11-02", "game_time": "6:30 PM",
              "home_team_nbr": 77, "home_team_name": "Ice", "home_score": 1,
              "visitor_team_nbr": 12, "visitor_team_name": "Wildcats", "visitor_score": 4,
              "rink_name": "Rink B", "game_type": "Tournament" },
            { "game_nbr": 502, "game_date": "2024-11-03",
              "home_team_nbr": 77, "home_team_name": "Ice",
              "visitor_team_nbr": 90, "visitor_team_name": "Rangers" },
            { "game_date": 7 }
        ]}"#;
        let ctx = ImportContext { mhr_team_nbr: Some(12), ..ImportContext::new("t1", "Wildcats", 2024) };
        let out = MhrGames.parse(raw, &ctx).unwrap();
        assert_eq!(out.games.len(), 1);
        let g = &out.games[0];
        assert_eq!(g.id, "mhr-t1-501");
        assert_eq!(g.score(), Some((4, 1)));
        assert_eq!(g.home, Some(false));
        assert_eq!(g.game_type, GameType::Tournament);
        assert_eq!(out.skipped.len(), 2);
    }

    #[test]
    fn rankings_bare_array() {
        let raw = r#"[{ "team_nbr": 12, "ranking": 3, "difference": -1, "name": "Wildcats",
                       "gp": 10, "wins": 6, "losses": 3, "ties": 1, "gf": 30, "ga": 20,
                       "rating": 88.5, "sched": 85.1, "agd": 1.0 }]"#;
        let out = MhrRankings.parse(raw, &ImportContext::default()).unwrap();
        assert_eq!(out.rankings[0].ranking, 3);
        assert_eq!(out.standings.unwrap().rows[0].pts, 13);
    }

    #[test]
    fn scalar_root_is_malformed() {
        assert!(matches!(MhrGames.parse("42", &ImportContext::default()), Err(AdapterError::Malformed { .. })));
        assert!(matches!(MhrGames.parse("{", &ImportContext::default()), Err(AdapterError::Json(_))));
    }
}
