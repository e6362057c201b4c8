// tests/standings_engine.rs
use chrono::NaiveDate;

use rink_scrape::error::ConfigError;
use rink_scrape::model::{
    CompetitionGame, CompetitionRules, CompetitionTeam, Decision, PlaydownConfig, PointScheme, Pool,
    StandingsRow, TiebreakRule, TournamentConfig,
};
use rink_scrape::standings::{compute_playdown_standings, compute_pool_standings, compute_standings};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

fn played(d: u32, home: &str, away: &str, hs: u32, aws: u32) -> CompetitionGame {
    CompetitionGame::new(day(d), home, away).with_score(hs, aws)
}

fn playdown(teams: &[(&str, &str)]) -> PlaydownConfig {
    PlaydownConfig {
        id: "pd-u13".into(),
        team_id: "t1".into(),
        name: "U13 AA Playdowns".into(),
        teams: teams.iter().map(|(id, name)| CompetitionTeam::new(*id, *name)).collect(),
        rules: CompetitionRules::default(),
        end_date: None,
    }
}

fn ids(rows: &[StandingsRow]) -> Vec<String> {
    rows.iter().map(|r| r.team_id.clone().unwrap_or_default()).collect()
}

#[test]
fn closed_pool_totals_balance() {
    let cfg = playdown(&[("self", "Wildcats"), ("ice", "Ice"), ("rangers", "Rangers")]);
    let games = vec![
        played(1, "self", "ice", 3, 1),
        played(2, "ice", "rangers", 2, 2),
        played(3, "rangers", "self", 4, 0),
        played(4, "self", "ice", 1, 2).decided_in(Decision::Shootout),
        CompetitionGame::new(day(9), "ice", "rangers"),
    ];
    let rows = compute_playdown_standings(&cfg, &games).unwrap();

    assert!(rows.iter().all(StandingsRow::is_balanced));
    let gf: u32 = rows.iter().map(|r| r.gf).sum();
    let ga: u32 = rows.iter().map(|r| r.ga).sum();
    assert_eq!(gf, ga);
    let gp: u32 = rows.iter().map(|r| r.gp).sum();
    assert_eq!(gp, 8);
    assert!(rows.iter().all(|r| r.diff == i64::from(r.gf) - i64::from(r.ga)));
}

#[test]
fn same_input_same_order() {
    let cfg = playdown(&[("self", "Wildcats"), ("a", "A"), ("b", "B"), ("c", "C")]);
    let games = vec![
        played(1, "self", "a", 0, 0),
        played(2, "b", "c", 0, 0),
        played(3, "self", "b", 0, 0),
        played(4, "a", "c", 0, 0),
    ];
    let first = ids(&compute_playdown_standings(&cfg, &games).unwrap());
    for _ in 0..10 {
        assert_eq!(ids(&compute_playdown_standings(&cfg, &games).unwrap()), first);
    }
    // Everyone tied on everything: configuration order.
    assert_eq!(first, vec!["self", "a", "b", "c"]);
}

#[test]
fn three_way_head_to_head_recurses() {
    // a, b, c: 4 pts and 2 wins each. Inside the group a beat b, b beat c, c beat a,
    // so head-to-head is level too and goal differential decides. d is last.
    let teams: Vec<CompetitionTeam> =
        ["a", "b", "c", "d"].iter().map(|id| CompetitionTeam::new(*id, id.to_uppercase())).collect();
    let games = vec![
        played(1, "a", "b", 1, 0),
        played(2, "b", "c", 5, 0),
        played(3, "c", "a", 2, 1),
        played(4, "a", "d", 1, 0),
        played(5, "b", "d", 1, 0),
        played(6, "c", "d", 1, 0),
    ];
    let rows = compute_standings(&teams, &games, &PointScheme::default(), &rink_scrape::model::DEFAULT_TIEBREAKS).unwrap();
    assert_eq!(ids(&rows), vec!["b", "a", "c", "d"]);
}

#[test]
fn custom_cascade_uses_penalty_minutes() {
    let teams = vec![CompetitionTeam::new("x", "X"), CompetitionTeam::new("y", "Y")];
    let mut g = played(1, "x", "y", 2, 2);
    g.home_pim = 12;
    g.away_pim = 4;
    let rules = [TiebreakRule::Points, TiebreakRule::FewestPenaltyMinutes];
    let rows = compute_standings(&teams, &[g], &PointScheme::default(), &rules).unwrap();
    assert_eq!(ids(&rows), vec!["y", "x"]);
    assert_eq!(rows[1].pim, 12);
}

fn tournament() -> TournamentConfig {
    TournamentConfig {
        id: "xmas".into(),
        team_id: "t1".into(),
        name: "Holiday Classic".into(),
        start_date: day(1),
        end_date: day(3),
        pools: vec![Pool { id: "A".into(), name: "Pool A".into() }, Pool { id: "B".into(), name: "Pool B".into() }],
        teams: vec![
            CompetitionTeam::new("self", "Wildcats").in_pool("A"),
            CompetitionTeam::new("ice", "Ice").in_pool("A"),
            CompetitionTeam::new("rangers", "Rangers").in_pool("B"),
            CompetitionTeam::new("hawks", "Hawks").in_pool("B"),
        ],
        rules: CompetitionRules::default(),
    }
}

#[test]
fn pool_ignores_crossover_games() {
    let games = vec![
        played(1, "self", "ice", 2, 1),
        played(1, "rangers", "hawks", 0, 3),
        played(2, "self", "rangers", 0, 9),
    ];
    let rows = compute_pool_standings(&tournament(), &games, "A").unwrap();
    assert_eq!(ids(&rows), vec!["self", "ice"]);
    assert_eq!((rows[0].gp, rows[0].ga), (1, 1));
}

#[test]
fn configuration_errors_surface() {
    let games = vec![played(1, "self", "ghosts", 2, 1)];
    assert_eq!(
        compute_pool_standings(&tournament(), &games, "A"),
        Err(ConfigError::UnknownTeam { game_id: "2025-03-01-self-ghosts".into(), team_id: "ghosts".into() })
    );
    assert_eq!(compute_pool_standings(&tournament(), &[], "Z"), Err(ConfigError::UnknownPool("Z".into())));

    let mut cfg = playdown(&[("ice", "Ice")]);
    assert_eq!(compute_playdown_standings(&cfg, &[]), Err(ConfigError::MissingSelf));
    cfg.teams.push(CompetitionTeam::new("self", "Wildcats"));
    assert!(compute_playdown_standings(&cfg, &[]).is_ok());
}
