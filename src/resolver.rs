// src/resolver.rs
//! Free-text opponent names → registry entries.
//!
//! Passes run from strictest to loosest: exact full name, exact short name,
//! then normalized text against both. The first pass with any hit decides.
//! A pass that hits more than one entry is a question for a human, so it is
//! reported and nothing is attached. The registry is read-only here.

use serde::Serialize;

use crate::core::sanitize::{normalize_key, normalize_ws};
use crate::model::{Game, Opponent};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution<'a> {
    Matched(&'a Opponent),
    Ambiguous(Vec<&'a Opponent>),
    Unmatched,
}

pub fn resolve<'a>(free_text: &str, registry: &'a [Opponent]) -> Resolution<'a> {
    let text = normalize_ws(free_text);
    if text.is_empty() {
        return Resolution::Unmatched;
    }
    let key = normalize_key(&text);

    let passes: [&dyn Fn(&Opponent) -> bool; 3] = [
        &|o: &Opponent| o.full_name == text,
        &|o: &Opponent| o.name == text,
        &|o: &Opponent| !key.is_empty() && (normalize_key(&o.full_name) == key || normalize_key(&o.name) == key),
    ];
    for pass in passes {
        let mut hits: Vec<&Opponent> = registry.iter().filter(|o| pass(o)).collect();
        hits.dedup_by(|a, b| a.id == b.id);
        match hits.len() {
            0 => continue,
            1 => return Resolution::Matched(hits[0]),
            _ => return Resolution::Ambiguous(hits),
        }
    }
    Resolution::Unmatched
}

/// The single registry entry `free_text` names, if there is exactly one.
pub fn match_opponent<'a>(free_text: &str, registry: &'a [Opponent]) -> Option<&'a Opponent> {
    match resolve(free_text, registry) {
        Resolution::Matched(o) => Some(o),
        _ => None,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeedsReview {
    pub game_id: String,
    pub opponent_name: String,
    pub candidate_ids: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveReport {
    pub resolved: usize,
    pub unmatched: usize,
    pub needs_review: Vec<NeedsReview>,
}

/// Attach `opponent_id` to every game that lacks one and names exactly one
/// registry entry. Games already carrying an id are left alone.
pub fn resolve_games(games: &mut [Game], registry: &[Opponent]) -> ResolveReport {
    let mut report = ResolveReport::default();
    for g in games.iter_mut().filter(|g| g.opponent_id.is_none()) {
        match resolve(&g.opponent_name, registry) {
            Resolution::Matched(o) => {
                g.opponent_id = Some(o.id.clone());
                report.resolved += 1;
            }
            Resolution::Ambiguous(hits) => {
                log::debug!("opponent {:?} matches {} registry entries", g.opponent_name, hits.len());
                report.needs_review.push(NeedsReview {
                    game_id: g.id.clone(),
                    opponent_name: g.opponent_name.clone(),
                    candidate_ids: hits.iter().map(|o| o.id.clone()).collect(),
                });
            }
            Resolution::Unmatched => report.unmatched += 1,
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::model::Source;

    fn registry() -> Vec<Opponent> {
        vec![
            Opponent::new("o1", "Kitchener", "Ice"),
            Opponent::new("o2", "St. Mary's", "Wildcats"),
            Opponent::new("o3", "Guelph", "Gryphons"),
            Opponent::new("o4", "Cambridge", "Gryphons"),
        ]
    }

    #[test]
    fn passes_in_order() {
        let reg = registry();
        assert_eq!(match_opponent("Kitchener Ice", &reg).map(|o| o.id.as_str()), Some("o1"));
        assert_eq!(match_opponent("Ice", &reg).map(|o| o.id.as_str()), Some("o1"));
        assert_eq!(match_opponent("st marys  WILDCATS", &reg).map(|o| o.id.as_str()), Some("o2"));
        assert_eq!(match_opponent("Rangers", &reg), None);
    }

    #[test]
    fn several_hits_need_review() {
        let reg = registry();
        match resolve("Gryphons", &reg) {
            Resolution::Ambiguous(hits) => assert_eq!(hits.len(), 2),
            other => panic!("expected ambiguity, got {other:?}"),
        }
        assert_eq!(match_opponent("Gryphons", &reg), None);
        assert_eq!(match_opponent("Guelph Gryphons", &reg).map(|o| o.id.as_str()), Some("o3"));
    }

    #[test]
    fn games_get_ids_attached() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        let mut games = vec![
            Game::new("t1", d, "Ice", Source::Manual, None),
            Game::new("t1", d, "Gryphons", Source::Manual, None),
            Game::new("t1", d, "Rangers", Source::Manual, None),
        ];
        let report = resolve_games(&mut games, &registry());
        assert_eq!(games[0].opponent_id.as_deref(), Some("o1"));
        assert_eq!(report.resolved, 1);
        assert_eq!(report.unmatched, 1);
        assert_eq!(report.needs_review[0].candidate_ids, vec![s!("o3"), s!("o4")]);
    }
}
