// src/adapters/playdown_entry.rs
//! Competition games typed in by hand, as a JSON array. Sides are participant
//! ids from the competition's team list, `"self"` included.

use serde::Deserialize;
use serde_json::Value;

use super::{Adapter, ImportContext, ParseOutput, SourceKind};
use crate::core::dates::{parse_game_date, parse_game_time};
use crate::error::AdapterError;
use crate::model::{CompetitionGame, Decision, Source};

pub struct PlaydownEntry;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Entry {
    #[serde(default)]
    id: Option<String>,
    date: String,
    #[serde(default)]
    time: Option<String>,
    home: String,
    away: String,
    #[serde(default)]
    home_score: Option<u32>,
    #[serde(default)]
    away_score: Option<u32>,
    #[serde(default)]
    decision: Option<Decision>,
    #[serde(default)]
    home_pim: u32,
    #[serde(default)]
    away_pim: u32,
    #[serde(default)]
    location: String,
    #[serde(default)]
    pool_id: Option<String>,
}

impl Adapter for PlaydownEntry {
    fn kind(&self) -> SourceKind { SourceKind::PlaydownEntry }

    fn parse(&self, raw: &str, ctx: &ImportContext) -> Result<ParseOutput, AdapterError> {
        let Value::Array(items) = serde_json::from_str::<Value>(raw)? else {
            return Err(AdapterError::Malformed { format: "competition entry", reason: s!("root is not an array") });
        };
        let mut out = ParseOutput::default();

        for (i, value) in items.into_iter().enumerate() {
            let row = i + 1;
            let e: Entry = match serde_json::from_value(value) {
                Ok(e) => e,
                Err(err) => skip_row!(out, row, "{err}"),
            };
            let (home, away) = (e.home.trim(), e.away.trim());
            if home.is_empty() || away.is_empty() {
                skip_row!(out, row, "missing participant");
            }
            if home == away {
                skip_row!(out, row, "{home} cannot play itself");
            }
            let Some(date) = parse_game_date(&e.date, ctx.season_start_year) else {
                skip_row!(out, row, "unparsable date {:?}", e.date);
            };

            let mut g = CompetitionGame::new(date, home, away);
            if let Some(id) = e.id.filter(|s| !s.trim().is_empty()) {
                g.id = id;
            }
            g.time = e.time.as_deref().and_then(parse_game_time);
            g.location = e.location;
            g.pool_id = e.pool_id;
            g.home_pim = e.home_pim;
            g.away_pim = e.away_pim;
            g.source = Source::PlaydownEntry;
            match (e.home_score, e.away_score) {
                (Some(h), Some(a)) => g.record_score(h, a, e.decision.unwrap_or_default()),
                (None, None) => {}
                _ => skip_row!(out, row, "only one score present"),
            }
            out.competition_games.push(g);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_become_competition_games() {
        let raw = r#"[
            { "date": "2025-02-01", "home": "self", "away": "ice", "homeScore": 2, "awayScore": 3, "decision": "overtime" },
            { "date": "2025-02-08", "home": "ice", "away": "rangers", "poolId": "A" },
            { "date": "2025-02-09", "home": "ice", "away": "ice" },
            { "date": "2025-02-10", "home": "self", "away": "rangers", "homeScore": 1 }
        ]"#;
        let out = PlaydownEntry.parse(raw, &ImportContext::default()).unwrap();
        assert_eq!(out.competition_games.len(), 2);
        let first = &out.competition_games[0];
        assert_eq!(first.score(), Some((2, 3)));
        assert_eq!(first.decision, Decision::Overtime);
        assert!(!out.competition_games[1].played());
        assert_eq!(out.competition_games[1].pool_id.as_deref(), Some("A"));
        assert_eq!(out.skipped.iter().map(|s| s.row).collect::<Vec<_>>(), vec![3, 4]);
    }
}
