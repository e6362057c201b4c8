// src/import.rs
//! Raw document → stored records.
//!
//! `prepare_import` runs the pure stages (parse, resolve, duplicate check)
//! against a snapshot read from the store and returns what would change.
//! `commit` writes that outcome. A dry run is a prepare without a commit.

use std::collections::HashSet;

use serde::Serialize;

use crate::adapters::{self, ImportContext, ParseOutput, SourceKind};
use crate::core::sanitize::normalize_key;
use crate::duplicates::{DuplicateInfo, DuplicateStatus, find_duplicates};
use crate::error::{ImportError, StoreError};
use crate::model::{CompetitionGame, Game, GamePatch, Opponent, StandingsTable};
use crate::progress::Progress;
use crate::resolver::{ResolveReport, resolve_games};
use crate::store::Store;

/// Counts shown to whoever triggered the import.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub parsed: usize,
    pub skipped: usize,
    pub duplicate: usize,
    pub ambiguous: usize,
    pub new: usize,
    pub unresolved: usize,
    pub score_changed: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub kind: &'static str,
    pub team_id: String,
    pub competition_id: Option<String>,
    pub parsed: ParseOutput,
    pub resolve: ResolveReport,
    pub duplicates: Vec<DuplicateInfo>,
    /// Games classified `new`, ready to insert.
    pub new_games: Vec<Game>,
    /// Score corrections for stored games, keyed by stored id.
    pub corrections: Vec<(String, GamePatch)>,
    pub new_competition_games: Vec<CompetitionGame>,
    pub new_opponents: Vec<Opponent>,
    pub summary: ImportSummary,
}

impl ImportOutcome {
    /// Same-contest conflicts left for a human to settle.
    pub fn ambiguous(&self) -> impl Iterator<Item = &DuplicateInfo> {
        self.duplicates.iter().filter(|d| d.status == DuplicateStatus::Ambiguous)
    }
}

const STAGES: usize = 3;

pub fn prepare_import(
    store: &dyn Store,
    kind: SourceKind,
    raw: &str,
    ctx: &ImportContext,
    competition_id: Option<&str>,
    progress: &mut dyn Progress,
) -> Result<ImportOutcome, ImportError> {
    progress.begin(STAGES);
    let result = run_stages(store, kind, raw, ctx, competition_id, progress);
    progress.finish();
    result
}

fn run_stages(
    store: &dyn Store,
    kind: SourceKind,
    raw: &str,
    ctx: &ImportContext,
    competition_id: Option<&str>,
    progress: &mut dyn Progress,
) -> Result<ImportOutcome, ImportError> {
    // 1. parse
    let mut parsed = adapters::parse(kind, raw, ctx)?;
    progress.log(&format!("{kind}: {} rows parsed, {} skipped", parsed.parsed_count(), parsed.skipped.len()));
    progress.item_done(1);

    // 2. resolve opponents
    let registry = store.fetch_opponents(&ctx.team_id)?;
    let resolve = resolve_games(&mut parsed.games, &registry);
    progress.log(&format!("{} opponents resolved, {} need review", resolve.resolved, resolve.needs_review.len()));
    progress.item_done(2);

    // 3. duplicates
    let existing = store.fetch(&ctx.team_id)?;
    let stored_ids: HashSet<&str> = existing.iter().map(|g| g.id.as_str()).collect();
    let duplicates = find_duplicates(&existing, &parsed.games);

    let mut new_games = Vec::new();
    let mut corrections = Vec::new();
    for (info, g) in duplicates.iter().zip(&parsed.games) {
        match (info.status, info.matched_game_id.as_deref()) {
            (DuplicateStatus::New, _) => new_games.push(g.clone()),
            (DuplicateStatus::Duplicate, Some(id)) if info.score_changed && stored_ids.contains(id) => {
                corrections.push((id.to_string(), GamePatch::score_correction(g)));
            }
            _ => {}
        }
    }

    let new_competition_games = if parsed.competition_games.is_empty() {
        Vec::new()
    } else {
        let cid = competition_id.ok_or(ImportError::NoCompetition(kind.as_str()))?;
        let stored = store.fetch_competition_games(cid)?;
        let known: HashSet<&str> = stored.iter().map(|g| g.id.as_str()).collect();
        let mut seen = HashSet::new();
        parsed
            .competition_games
            .iter()
            .filter(|g| !known.contains(g.id.as_str()) && seen.insert(g.id.clone()))
            .cloned()
            .collect()
    };

    let new_opponents = if kind == SourceKind::TeamList {
        registry_additions(&ctx.team_id, &registry, &parsed)
    } else {
        Vec::new()
    };
    progress.item_done(3);

    let count = |s: DuplicateStatus| duplicates.iter().filter(|d| d.status == s).count();
    let summary = ImportSummary {
        parsed: parsed.parsed_count(),
        skipped: parsed.skipped.len(),
        duplicate: count(DuplicateStatus::Duplicate)
            + (parsed.competition_games.len() - new_competition_games.len()),
        ambiguous: count(DuplicateStatus::Ambiguous),
        new: new_games.len() + new_competition_games.len() + new_opponents.len(),
        unresolved: resolve.unmatched + resolve.needs_review.len(),
        score_changed: corrections.len(),
    };
    log::info!(
        "import {kind} for {}: parsed {}, skipped {}, duplicate {}, ambiguous {}, new {}, unresolved {}",
        ctx.team_id, summary.parsed, summary.skipped, summary.duplicate, summary.ambiguous, summary.new, summary.unresolved
    );

    Ok(ImportOutcome {
        kind: kind.as_str(),
        team_id: ctx.team_id.clone(),
        competition_id: competition_id.map(str::to_string),
        parsed,
        resolve,
        duplicates,
        new_games,
        corrections,
        new_competition_games,
        new_opponents,
        summary,
    })
}

/// Team-list candidates not already in the registry (by normalized full name),
/// with ids derived from the owning team and the name.
fn registry_additions(team_id: &str, registry: &[Opponent], parsed: &ParseOutput) -> Vec<Opponent> {
    let mut known: HashSet<String> = registry.iter().map(|o| normalize_key(&o.full_name)).collect();
    parsed
        .opponents
        .iter()
        .filter(|c| known.insert(normalize_key(&c.full_name)))
        .map(|c| {
            let id = format!("{team_id}-{}", normalize_key(&c.full_name).replace(' ', "-"));
            Opponent::from_candidate(id, c)
        })
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReport {
    pub inserted: usize,
    pub corrected: usize,
    pub competition_games: usize,
    pub opponents: usize,
    pub standings_saved: bool,
}

/// Write a prepared import. Ambiguous games are never written; they wait for
/// someone to decide which record is right.
pub fn commit(store: &mut dyn Store, outcome: &ImportOutcome) -> Result<CommitReport, StoreError> {
    let result = commit_inner(store, outcome);
    if let Err(e) = &result {
        log::error!("commit of {} import for {} failed: {e}", outcome.kind, outcome.team_id);
    }
    result
}

fn commit_inner(store: &mut dyn Store, outcome: &ImportOutcome) -> Result<CommitReport, StoreError> {
    let mut report = CommitReport::default();

    if !outcome.new_games.is_empty() {
        store.insert(&outcome.new_games)?;
        report.inserted = outcome.new_games.len();
    }
    for (id, patch) in &outcome.corrections {
        store.update(id, patch)?;
        report.corrected += 1;
    }
    if let Some(cid) = outcome.competition_id.as_deref() {
        if !outcome.new_competition_games.is_empty() {
            store.insert_competition_games(cid, &outcome.new_competition_games)?;
            report.competition_games = outcome.new_competition_games.len();
        }
    }
    if !outcome.new_opponents.is_empty() {
        store.insert_opponents(&outcome.team_id, &outcome.new_opponents)?;
        report.opponents = outcome.new_opponents.len();
    }
    if let Some(table) = outcome.parsed.standings.as_ref().filter(|t| !t.rows.is_empty()) {
        let key = outcome.competition_id.clone().unwrap_or_else(|| format!("{}-{}", outcome.team_id, outcome.kind));
        store.save_standings(&key, &titled(table, outcome.kind))?;
        report.standings_saved = true;
    }
    log::info!(
        "committed {} import for {}: {} inserted, {} corrected, {} competition games, {} opponents",
        outcome.kind, outcome.team_id, report.inserted, report.corrected, report.competition_games, report.opponents
    );
    Ok(report)
}

fn titled(table: &StandingsTable, kind: &str) -> StandingsTable {
    let mut t = table.clone();
    if t.title.is_none() {
        t.title = Some(kind.to_string());
    }
    t
}
