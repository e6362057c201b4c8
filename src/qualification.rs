// src/qualification.rs
//! Event lifecycle and per-team advancement status.
//!
//! Status is a bound check, not a simulation: every team's best case is its
//! current points plus a win in each remaining game. Nothing here is persisted;
//! callers re-evaluate from `(config, games)` whenever they need an answer.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::{Competition, CompetitionGame, CompetitionTeam, PlaydownConfig, StandingsRow, TournamentConfig};
use crate::standings::{compute_playdown_standings, compute_standings, pool_slice};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Advancement {
    /// Cannot reach the cutoff even by winning out.
    Out,
    Alive,
    /// No combination of remaining results pushes it below the cutoff.
    Locked,
}

impl Advancement {
    pub fn as_str(self) -> &'static str {
        match self { Advancement::Out => "OUT", Advancement::Alive => "ALIVE", Advancement::Locked => "LOCKED" }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamStatus {
    pub team_id: String,
    pub team_name: String,
    /// 1-based position in the standings.
    pub rank: usize,
    pub pts: u32,
    pub max_pts: u32,
    pub remaining: u32,
    pub status: Advancement,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub out: usize,
    pub alive: usize,
    pub locked: usize,
}

/* ---------------- expiry ---------------- */

/// Past the end date, or every game the format implies has been played.
pub fn is_playdown_expired(config: &PlaydownConfig, games: &[CompetitionGame], today: NaiveDate) -> bool {
    if config.end_date.is_some_and(|end| today > end) {
        return true;
    }
    match config.rules.games_per_matchup {
        Some(per) => schedule_played(&config.teams, games, per),
        None => {
            let counted: Vec<&CompetitionGame> = games.iter().filter(|g| g.home_id != g.away_id).collect();
            !counted.is_empty() && counted.iter().all(|g| g.played())
        }
    }
}

pub fn is_tournament_expired(config: &TournamentConfig, today: NaiveDate) -> bool {
    today > config.end_date
}

pub fn is_expired(competition: &Competition, games: &[CompetitionGame], today: NaiveDate) -> bool {
    match competition {
        Competition::Playdown(c) => is_playdown_expired(c, games, today),
        Competition::Tournament(c) => is_tournament_expired(c, today),
    }
}

/// `C(n, 2) × per`.
fn round_robin_games(teams: usize, per: u32) -> usize {
    teams * teams.saturating_sub(1) / 2 * per as usize
}

/// Every game of a `per`-meeting round robin among `teams` has a result.
fn schedule_played(teams: &[CompetitionTeam], games: &[CompetitionGame], per: u32) -> bool {
    let total = round_robin_games(teams.len(), per);
    let member = |id: &str| teams.iter().any(|t| t.id == id);
    let played = games
        .iter()
        .filter(|g| g.played() && g.home_id != g.away_id && member(&g.home_id) && member(&g.away_id))
        .count();
    total > 0 && played >= total
}

/* ---------------- remaining schedule ---------------- */

/// Games each team still has to play, keyed by team id. With a fixed number
/// of meetings per pair the schedule is implied; otherwise it is whatever
/// unplayed games have been entered.
pub fn remaining_games(
    teams: &[CompetitionTeam],
    games: &[CompetitionGame],
    games_per_matchup: Option<u32>,
) -> HashMap<String, u32> {
    let member = |id: &str| teams.iter().any(|t| t.id == id);
    let relevant: Vec<&CompetitionGame> = games
        .iter()
        .filter(|g| g.home_id != g.away_id && member(&g.home_id) && member(&g.away_id))
        .collect();

    teams
        .iter()
        .map(|t| {
            let mine = relevant.iter().filter(|g| g.involves(&t.id));
            let left = match games_per_matchup {
                Some(per) => {
                    let scheduled = (teams.len().saturating_sub(1) as u32).saturating_mul(per);
                    let played = mine.filter(|g| g.played()).count() as u32;
                    scheduled.saturating_sub(played)
                }
                None => mine.filter(|g| !g.played()).count() as u32,
            };
            (t.id.clone(), left)
        })
        .collect()
}

/* ---------------- classification ---------------- */

/// Classify ranked `standings` for a "top `spots` advance" rule. `per_game` is
/// the most points one game can add to a team's total. Only a `complete`
/// competition is decided by final rank; anything still running goes through
/// the bound check, even when no further games have been entered.
pub fn classify(
    standings: &[StandingsRow],
    remaining: &HashMap<String, u32>,
    spots: usize,
    per_game: u32,
    complete: bool,
) -> Vec<TeamStatus> {
    let left: Vec<u32> = standings
        .iter()
        .map(|r| remaining.get(row_id(r)).copied().unwrap_or(0))
        .collect();
    let max: Vec<u32> = standings
        .iter()
        .zip(&left)
        .map(|(r, &n)| r.pts.saturating_add(per_game.saturating_mul(n)))
        .collect();

    let n = standings.len();
    let cutoff = spots.checked_sub(1).and_then(|i| standings.get(i)).map(|r| r.pts);
    let best_chaser = max.iter().skip(spots).copied().max();

    standings
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let status = if spots >= n {
                Advancement::Locked
            } else if spots == 0 {
                Advancement::Out
            } else if complete {
                if i < spots { Advancement::Locked } else { Advancement::Out }
            } else if cutoff.is_some_and(|c| max[i] < c) {
                Advancement::Out
            } else if i < spots && best_chaser.is_none_or(|b| r.pts > b) {
                Advancement::Locked
            } else {
                Advancement::Alive
            };
            TeamStatus {
                team_id: row_id(r).to_string(),
                team_name: r.team_name.clone(),
                rank: i + 1,
                pts: r.pts,
                max_pts: max[i],
                remaining: left[i],
                status,
            }
        })
        .collect()
}

/// Status of every playdown team as of `today`.
pub fn playdown_status(
    config: &PlaydownConfig,
    games: &[CompetitionGame],
    today: NaiveDate,
) -> Result<Vec<TeamStatus>, ConfigError> {
    let rows = compute_playdown_standings(config, games)?;
    let rules = &config.rules;
    let remaining = remaining_games(&config.teams, games, rules.games_per_matchup);
    let complete = is_playdown_expired(config, games, today);
    Ok(classify(&rows, &remaining, rules.advancement.spots(), rules.points.max_per_game(), complete))
}

/// Status of one pool as of `today`. Pools are round robins: without a
/// configured meeting count each pair meets once.
pub fn pool_status(
    config: &TournamentConfig,
    games: &[CompetitionGame],
    pool_id: &str,
    today: NaiveDate,
) -> Result<Vec<TeamStatus>, ConfigError> {
    config.validate()?;
    let (teams, pool_games) = pool_slice(config, games, pool_id)?;
    let rules = &config.rules;
    let rows = compute_standings(&teams, &pool_games, &rules.points, &rules.tiebreaks)?;
    let per = rules.games_per_matchup.unwrap_or(1);
    let remaining = remaining_games(&teams, &pool_games, Some(per));
    let complete = is_tournament_expired(config, today) || schedule_played(&teams, &pool_games, per);
    Ok(classify(&rows, &remaining, rules.advancement.spots(), rules.points.max_per_game(), complete))
}

pub fn status_counts(statuses: &[TeamStatus]) -> StatusCounts {
    statuses.iter().fold(StatusCounts::default(), |mut c, s| {
        match s.status {
            Advancement::Out => c.out += 1,
            Advancement::Alive => c.alive += 1,
            Advancement::Locked => c.locked += 1,
        }
        c
    })
}

fn row_id(r: &StandingsRow) -> &str {
    r.team_id.as_deref().unwrap_or(&r.team_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, pts: u32) -> StandingsRow {
        StandingsRow { team_id: Some(id.to_string()), pts, ..StandingsRow::new(id) }
    }

    fn left(pairs: &[(&str, u32)]) -> HashMap<String, u32> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn bounds_decide_status() {
        let rows = [row("a", 12), row("b", 9), row("c", 6), row("d", 2)];
        let rem = left(&[("a", 1), ("b", 1), ("c", 2), ("d", 1)]);
        let st = classify(&rows, &rem, 2, 2, false);
        let got: Vec<_> = st.iter().map(|s| s.status).collect();
        // c can still reach 10, so b (9) is not safe; a (12) is. d tops out at 4.
        assert_eq!(got, vec![Advancement::Locked, Advancement::Alive, Advancement::Alive, Advancement::Out]);
        assert_eq!(st[3].max_pts, 4);
        assert_eq!(status_counts(&st), StatusCounts { out: 1, alive: 2, locked: 1 });
    }

    #[test]
    fn everyone_advances_when_spots_cover_the_pool() {
        let rows = [row("a", 0), row("b", 0)];
        let st = classify(&rows, &left(&[("a", 3), ("b", 3)]), 2, 2, false);
        assert!(st.iter().all(|s| s.status == Advancement::Locked));
    }

    #[test]
    fn finished_pool_uses_final_rank() {
        let rows = [row("a", 4), row("b", 4), row("c", 0)];
        let st = classify(&rows, &HashMap::new(), 1, 2, true);
        let got: Vec<_> = st.iter().map(|s| s.status).collect();
        assert_eq!(got, vec![Advancement::Locked, Advancement::Out, Advancement::Out]);
    }

    #[test]
    fn nothing_left_entered_is_not_a_final_ranking() {
        // same table, but the event is still running
        let rows = [row("a", 4), row("b", 4), row("c", 0)];
        let st = classify(&rows, &HashMap::new(), 1, 2, false);
        let got: Vec<_> = st.iter().map(|s| s.status).collect();
        assert_eq!(got, vec![Advancement::Alive, Advancement::Alive, Advancement::Out]);
    }

    #[test]
    fn implied_round_robin() {
        assert_eq!(round_robin_games(4, 2), 12);
        assert_eq!(round_robin_games(1, 2), 0);
    }
}
