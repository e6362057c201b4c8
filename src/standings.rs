// src/standings.rs
//! Games → ranked standings rows.
//!
//! Aggregation only counts played games between configured participants.
//! Ranking sorts by the first rule, then re-ranks every still-tied group with
//! the remaining rules; head-to-head is evaluated inside the tied group only.
//! Whatever is still tied at the end keeps configuration order.

use std::collections::HashMap;

use itertools::Itertools;

use crate::error::ConfigError;
use crate::model::{
    CompetitionGame, CompetitionTeam, Decision, PlaydownConfig, PointScheme, StandingsRow, TiebreakRule,
    TournamentConfig,
};

/// One played game reduced to participant indices and points earned.
#[derive(Clone, Copy, Debug)]
struct Outcome {
    home: usize,
    away: usize,
    home_pts: u32,
    away_pts: u32,
}

pub fn compute_standings(
    teams: &[CompetitionTeam],
    games: &[CompetitionGame],
    points: &PointScheme,
    tiebreaks: &[TiebreakRule],
) -> Result<Vec<StandingsRow>, ConfigError> {
    let index: HashMap<&str, usize> = teams.iter().enumerate().map(|(i, t)| (t.id.as_str(), i)).collect();
    let mut rows: Vec<StandingsRow> = teams
        .iter()
        .map(|t| StandingsRow { team_id: Some(t.id.clone()), ..StandingsRow::new(t.name.clone()) })
        .collect();
    let mut outcomes = Vec::new();

    for g in games {
        let side = |id: &str| {
            index.get(id).copied().ok_or_else(|| ConfigError::UnknownTeam { game_id: g.id.clone(), team_id: id.to_string() })
        };
        let (home, away) = (side(&g.home_id)?, side(&g.away_id)?);
        if home == away {
            log::warn!("game {} has {} on both sides; ignored", g.id, g.home_id);
            continue;
        }
        let Some((hs, aws)) = g.score() else { continue };

        let (home_pts, away_pts) = tally(&mut rows, home, away, hs, aws, g.decision, points);
        rows[home].pim = rows[home].pim.saturating_add(g.home_pim);
        rows[away].pim = rows[away].pim.saturating_add(g.away_pim);
        outcomes.push(Outcome { home, away, home_pts, away_pts });
    }
    rows.iter_mut().for_each(StandingsRow::refresh_derived);

    // Points always rank first; qualification reads cut lines off this order.
    let rules: Vec<TiebreakRule> = std::iter::once(TiebreakRule::Points)
        .chain(tiebreaks.iter().copied().filter(|r| *r != TiebreakRule::Points))
        .collect();
    let order = cascade((0..teams.len()).collect(), &rules, &rows, &outcomes);
    let mut slots: Vec<Option<StandingsRow>> = rows.into_iter().map(Some).collect();
    Ok(order.into_iter().filter_map(|i| slots[i].take()).collect())
}

/// All configured teams form one implicit pool.
pub fn compute_playdown_standings(
    config: &PlaydownConfig,
    games: &[CompetitionGame],
) -> Result<Vec<StandingsRow>, ConfigError> {
    config.validate()?;
    compute_standings(&config.teams, games, &config.rules.points, &config.rules.tiebreaks)
}

/// Standings of one pool. Games reaching outside the pool (crossover play)
/// are not counted; games naming teams the tournament does not know are errors.
pub fn compute_pool_standings(
    config: &TournamentConfig,
    games: &[CompetitionGame],
    pool_id: &str,
) -> Result<Vec<StandingsRow>, ConfigError> {
    config.validate()?;
    let (pool_teams, pool_games) = pool_slice(config, games, pool_id)?;
    compute_standings(&pool_teams, &pool_games, &config.rules.points, &config.rules.tiebreaks)
}

/// Teams of `pool_id` and the games played entirely inside it.
pub(crate) fn pool_slice(
    config: &TournamentConfig,
    games: &[CompetitionGame],
    pool_id: &str,
) -> Result<(Vec<CompetitionTeam>, Vec<CompetitionGame>), ConfigError> {
    if config.pool(pool_id).is_none() {
        return Err(ConfigError::UnknownPool(pool_id.to_string()));
    }
    let pool_teams = config.pool_teams(pool_id);
    let in_pool = |id: &str| pool_teams.iter().any(|t| t.id == id);
    let known = |id: &str| config.teams.iter().any(|t| t.id == id);

    let mut pool_games = Vec::new();
    for g in games {
        for id in [&g.home_id, &g.away_id] {
            if !known(id) {
                return Err(ConfigError::UnknownTeam { game_id: g.id.clone(), team_id: id.clone() });
            }
        }
        if in_pool(&g.home_id) && in_pool(&g.away_id) {
            pool_games.push(g.clone());
        }
    }
    Ok((pool_teams, pool_games))
}

/* ---------------- aggregation ---------------- */

fn tally(
    rows: &mut [StandingsRow],
    home: usize,
    away: usize,
    hs: u32,
    aws: u32,
    decision: Decision,
    points: &PointScheme,
) -> (u32, u32) {
    for (i, gf, ga) in [(home, hs, aws), (away, aws, hs)] {
        let r = &mut rows[i];
        r.gp += 1;
        r.gf = r.gf.saturating_add(gf);
        r.ga = r.ga.saturating_add(ga);
    }
    if hs == aws {
        for i in [home, away] {
            rows[i].t += 1;
            rows[i].pts = rows[i].pts.saturating_add(points.tie);
        }
        return (points.tie, points.tie);
    }

    let (winner, loser) = if hs > aws { (home, away) } else { (away, home) };
    rows[winner].w += 1;
    rows[winner].pts = rows[winner].pts.saturating_add(points.win);
    let loser_pts = match (points.distinguish_overtime, decision) {
        (true, Decision::Overtime) => { rows[loser].otl += 1; points.overtime_loss }
        (true, Decision::Shootout) => { rows[loser].sol += 1; points.shootout_loss }
        _ => { rows[loser].l += 1; points.loss }
    };
    rows[loser].pts = rows[loser].pts.saturating_add(loser_pts);

    if winner == home { (points.win, loser_pts) } else { (loser_pts, points.win) }
}

/* ---------------- ranking ---------------- */

/// Rank `group` (given in configuration order) by `rules[0]`, then recurse into
/// each tied run with the rest. The sort is stable, so exhausted rules leave
/// ties in configuration order.
fn cascade(mut group: Vec<usize>, rules: &[TiebreakRule], rows: &[StandingsRow], outcomes: &[Outcome]) -> Vec<usize> {
    let Some((rule, rest)) = rules.split_first() else { return group };
    if group.len() < 2 {
        return group;
    }

    let keys = rule_keys(*rule, &group, rows, outcomes);
    group.sort_by_key(|i| std::cmp::Reverse(keys[i]));

    let mut ranked = Vec::with_capacity(group.len());
    let runs = group.into_iter().chunk_by(|i| keys[i]);
    for (_, tied) in &runs {
        ranked.extend(cascade(tied.collect(), rest, rows, outcomes));
    }
    ranked
}

/// Sort key per team for one rule; larger is better.
fn rule_keys(rule: TiebreakRule, group: &[usize], rows: &[StandingsRow], outcomes: &[Outcome]) -> HashMap<usize, i64> {
    if rule == TiebreakRule::HeadToHead {
        return head_to_head(group, outcomes);
    }
    group
        .iter()
        .map(|&i| {
            let r = &rows[i];
            let key = match rule {
                TiebreakRule::Points => i64::from(r.pts),
                TiebreakRule::Wins => i64::from(r.w),
                TiebreakRule::GoalDifferential => r.diff,
                TiebreakRule::GoalsFor => i64::from(r.gf),
                TiebreakRule::GoalsAgainst => -i64::from(r.ga),
                TiebreakRule::FewestPenaltyMinutes => -i64::from(r.pim),
                TiebreakRule::HeadToHead => 0,
            };
            (i, key)
        })
        .collect()
}

/// Points each member earned in games against other members of `group`.
fn head_to_head(group: &[usize], outcomes: &[Outcome]) -> HashMap<usize, i64> {
    let mut pts: HashMap<usize, i64> = group.iter().map(|&i| (i, 0)).collect();
    for o in outcomes {
        if pts.contains_key(&o.home) && pts.contains_key(&o.away) {
            *pts.entry(o.home).or_default() += i64::from(o.home_pts);
            *pts.entry(o.away).or_default() += i64::from(o.away_pts);
        }
    }
    pts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crate::model::DEFAULT_TIEBREAKS;

    fn teams(ids: &[&str]) -> Vec<CompetitionTeam> {
        ids.iter().map(|id| CompetitionTeam::new(*id, id.to_uppercase())).collect()
    }

    fn game(day: u32, home: &str, away: &str, hs: u32, aws: u32) -> CompetitionGame {
        CompetitionGame::new(NaiveDate::from_ymd_opt(2025, 2, day).unwrap(), home, away).with_score(hs, aws)
    }

    fn order(rows: &[StandingsRow]) -> Vec<&str> {
        rows.iter().map(|r| r.team_id.as_deref().unwrap_or("")).collect()
    }

    #[test]
    fn head_to_head_breaks_points_and_wins_tie() {
        // a and b: 2 wins each, 4 pts. b beat a.
        let games = [
            game(1, "a", "b", 1, 2),
            game(2, "a", "c", 5, 0),
            game(3, "a", "d", 5, 0),
            game(4, "b", "c", 1, 0),
            game(5, "d", "b", 1, 0),
        ];
        let rows = compute_standings(&teams(&["a", "b", "c", "d"]), &games, &PointScheme::default(), &DEFAULT_TIEBREAKS).unwrap();
        assert_eq!(order(&rows), vec!["b", "a", "d", "c"]);
        assert!(rows.iter().all(StandingsRow::is_balanced));
    }

    #[test]
    fn untouched_ties_keep_configuration_order() {
        let rows = compute_standings(&teams(&["x", "y", "z"]), &[], &PointScheme::default(), &DEFAULT_TIEBREAKS).unwrap();
        assert_eq!(order(&rows), vec!["x", "y", "z"]);
        assert_eq!(rows[0].win_pct, 0.0);
    }

    #[test]
    fn overtime_losses_when_distinguished() {
        let g = game(1, "a", "b", 3, 2).decided_in(Decision::Overtime);
        let plain = compute_standings(&teams(&["a", "b"]), &[g.clone()], &PointScheme::default(), &DEFAULT_TIEBREAKS).unwrap();
        assert_eq!((plain[1].l, plain[1].otl, plain[1].pts), (1, 0, 0));

        let scheme = PointScheme { distinguish_overtime: true, ..PointScheme::default() };
        let ot = compute_standings(&teams(&["a", "b"]), &[g], &scheme, &DEFAULT_TIEBREAKS).unwrap();
        assert_eq!((ot[1].l, ot[1].otl, ot[1].pts), (0, 1, 1));
        assert!(ot[1].is_balanced());
    }

    #[test]
    fn points_lead_even_when_left_out_of_the_cascade() {
        let games = [game(1, "a", "b", 0, 1), game(2, "a", "c", 9, 8)];
        let rows = compute_standings(&teams(&["a", "b", "c"]), &games, &PointScheme::default(), &[TiebreakRule::GoalsFor]).unwrap();
        assert_eq!(order(&rows), vec!["a", "b", "c"]);
    }

    #[test]
    fn huge_imported_totals_saturate() {
        let mut g = game(1, "a", "b", u32::MAX, 1);
        g.home_pim = u32::MAX;
        let mut again = g.clone();
        again.id = s!("rematch");
        let rows = compute_standings(&teams(&["a", "b"]), &[g, again], &PointScheme::default(), &DEFAULT_TIEBREAKS).unwrap();
        assert_eq!((rows[0].gf, rows[0].pim, rows[0].pts), (u32::MAX, u32::MAX, 4));
    }

    #[test]
    fn unknown_and_self_games() {
        let err = compute_standings(&teams(&["a"]), &[game(1, "a", "zz", 1, 0)], &PointScheme::default(), &[]).unwrap_err();
        assert_eq!(err, ConfigError::UnknownTeam { game_id: s!("2025-02-01-a-zz"), team_id: s!("zz") });

        let rows = compute_standings(&teams(&["a", "b"]), &[game(1, "a", "a", 1, 0)], &PointScheme::default(), &[]).unwrap();
        assert_eq!(rows[0].gp, 0);
    }
}
