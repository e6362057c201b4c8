// src/duplicates.rs
//! Re-import detection.
//!
//! Same `(source, source id)` as a stored game is a re-import and safe to drop
//! (or to apply as a score correction). Same contest under a different source
//! is surfaced as ambiguous; the two records are never merged here.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{Game, GameType, Source};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateStatus {
    New,
    Duplicate,
    Ambiguous,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateInfo {
    pub incoming_id: String,
    pub status: DuplicateStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_game_id: Option<String>,
    #[serde(default)]
    pub matched_fields: Vec<String>,
    /// Duplicate whose played/score state differs from the stored game.
    #[serde(default)]
    pub score_changed: bool,
}

impl DuplicateInfo {
    fn new_game(incoming: &Game) -> Self {
        Self {
            incoming_id: incoming.id.clone(),
            status: DuplicateStatus::New,
            matched_game_id: None,
            matched_fields: Vec::new(),
            score_changed: false,
        }
    }

    fn matched(incoming: &Game, stored: &Game, status: DuplicateStatus, fields: &[&str]) -> Self {
        Self {
            incoming_id: incoming.id.clone(),
            status,
            matched_game_id: Some(stored.id.clone()),
            matched_fields: fields.iter().map(|f| f.to_string()).collect(),
            score_changed: status == DuplicateStatus::Duplicate && score_differs(stored, incoming),
        }
    }
}

const PROVENANCE_FIELDS: [&str; 2] = ["source", "sourceGameId"];
const CONTEST_FIELDS: [&str; 3] = ["date", "opponent", "gameType"];

/// One entry per incoming game, in input order.
pub fn find_duplicates(existing: &[Game], incoming: &[Game]) -> Vec<DuplicateInfo> {
    let mut by_provenance: HashMap<(Source, &str), &Game> = HashMap::with_capacity(existing.len());
    let mut by_contest: HashMap<(NaiveDate, GameType), Vec<&Game>> = HashMap::new();
    for g in existing {
        by_provenance.entry(g.provenance_key()).or_insert(g);
        by_contest.entry((g.date, g.game_type)).or_default().push(g);
    }

    let mut batch: HashMap<(Source, &str), &Game> = HashMap::new();
    let mut out = Vec::with_capacity(incoming.len());

    for g in incoming {
        let key = g.provenance_key();
        if let Some(stored) = by_provenance.get(&key) {
            out.push(DuplicateInfo::matched(g, stored, DuplicateStatus::Duplicate, &PROVENANCE_FIELDS));
            continue;
        }
        if let Some(first) = batch.get(&key) {
            out.push(DuplicateInfo::matched(g, first, DuplicateStatus::Duplicate, &PROVENANCE_FIELDS));
            continue;
        }
        batch.insert(key, g);

        let same_contest = by_contest
            .get(&(g.date, g.game_type))
            .and_then(|cands| cands.iter().find(|s| s.source != g.source && same_opponent(s, g)));
        match same_contest {
            Some(stored) => {
                log::debug!("{} looks like stored {} from {}", g.id, stored.id, stored.source);
                out.push(DuplicateInfo::matched(g, stored, DuplicateStatus::Ambiguous, &CONTEST_FIELDS));
            }
            None => out.push(DuplicateInfo::new_game(g)),
        }
    }
    out
}

/* ---------------- helpers ---------------- */

/// Resolved ids when both sides have one, normalized names otherwise.
fn same_opponent(a: &Game, b: &Game) -> bool {
    match (&a.opponent_id, &b.opponent_id) {
        (Some(x), Some(y)) => x == y,
        _ => a.opponent_key() == b.opponent_key() && !a.opponent_key().is_empty(),
    }
}

fn score_differs(stored: &Game, incoming: &Game) -> bool {
    stored.played() != incoming.played() || stored.score() != incoming.score()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn owha(sid: &str, d: u32, opp: &str) -> Game {
        Game::new("t1", day(d), opp, Source::Owha, Some(s!(sid)))
    }

    #[test]
    fn same_provenance_is_duplicate_every_time() {
        let existing = vec![owha("12", 5, "Ice").with_score(3, 1)];
        let incoming = vec![owha("12", 5, "Ice").with_score(3, 1)];
        for _ in 0..3 {
            let info = find_duplicates(&existing, &incoming);
            assert_eq!(info[0].status, DuplicateStatus::Duplicate);
            assert_eq!(info[0].matched_game_id.as_deref(), Some("owha-t1-12"));
            assert!(!info[0].score_changed);
        }
    }

    #[test]
    fn new_score_on_known_game_is_flagged() {
        let existing = vec![owha("12", 5, "Ice")];
        let incoming = vec![owha("12", 5, "Ice").with_score(2, 2)];
        let info = find_duplicates(&existing, &incoming);
        assert_eq!(info[0].status, DuplicateStatus::Duplicate);
        assert!(info[0].score_changed);
    }

    #[test]
    fn other_source_same_contest_is_ambiguous() {
        let manual = Game::new("t1", day(5), "Kitchener Ice", Source::Manual, None);
        let info = find_duplicates(&[manual.clone()], &[owha("12", 5, "kitchener  ice")]);
        assert_eq!(info[0].status, DuplicateStatus::Ambiguous);
        assert_eq!(info[0].matched_game_id.as_deref(), Some(manual.id.as_str()));
        assert_eq!(info[0].matched_fields, vec!["date", "opponent", "gameType"]);

        let mut typed = owha("13", 5, "Kitchener Ice");
        typed.game_type = GameType::Playoffs;
        assert_eq!(find_duplicates(&[manual], &[typed])[0].status, DuplicateStatus::New);
    }

    #[test]
    fn repeats_within_a_batch() {
        let info = find_duplicates(&[], &[owha("7", 5, "Ice"), owha("8", 6, "Ice"), owha("7", 5, "Ice")]);
        let statuses: Vec<_> = info.iter().map(|i| i.status).collect();
        assert_eq!(statuses, vec![DuplicateStatus::New, DuplicateStatus::New, DuplicateStatus::Duplicate]);
        assert_eq!(info[2].matched_game_id.as_deref(), Some("owha-t1-7"));
    }
}
