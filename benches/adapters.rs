// benches/adapters.rs
use std::fmt::Write;

use chrono::{Duration, NaiveDate};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use rink_scrape::adapters::{self, ImportContext, SourceKind};
use rink_scrape::model::{CompetitionGame, CompetitionTeam, DEFAULT_TIEBREAKS, PointScheme};
use rink_scrape::standings::compute_standings;

const OPPONENTS: [&str; 6] = ["Ice", "Rangers", "Lightning", "Hawks", "Gryphons", "Canadettes"];

/// A season page shaped like the league site's, `n` rows long.
fn schedule_page(n: usize) -> String {
    let start = NaiveDate::from_ymd_opt(2024, 9, 7).unwrap_or_default();
    let mut rows = String::new();
    for i in 0..n {
        let date = start + Duration::days(i as i64 * 3);
        let opp = OPPONENTS[i % OPPONENTS.len()];
        let (home, away) = if i % 2 == 0 { ("Wildcats", opp) } else { (opp, "Wildcats") };
        let _ = write!(
            rows,
            r#"<tr><td>{id}</td><td>{d}<br>7:15 PM</td><td><a href="/rinks/{r}">Rink {r}</a></td>
               <td><a href="/t/1">{home} ({hs})</a></td><td><a href="/t/2">{away} ({aws})</a></td></tr>"#,
            id = 1000 + i,
            d = date.format("%a, %b %-d"),
            r = i % 4,
            hs = i % 5,
            aws = (i + 2) % 4,
        );
    }
    format!(r#"<html><body><table><tbody aria-live="polite">{rows}</tbody></table></body></html>"#)
}

fn round_robin(teams: &[CompetitionTeam], meetings: usize) -> Vec<CompetitionGame> {
    let start = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap_or_default();
    let mut games = Vec::new();
    for m in 0..meetings {
        for (i, a) in teams.iter().enumerate() {
            for (j, b) in teams.iter().enumerate().skip(i + 1) {
                let day = start + Duration::days((games.len() / 4) as i64);
                let (home, away) = if m % 2 == 0 { (a, b) } else { (b, a) };
                let g = CompetitionGame::new(day, &home.id, &away.id).with_score(((i + m) % 4) as u32, ((j + m) % 3) as u32);
                games.push(g);
            }
        }
    }
    games
}

fn bench_owha(c: &mut Criterion) {
    let ctx = ImportContext::new("t1", "Wildcats", 2024);
    let doc = schedule_page(60);
    c.bench_function("owha_schedule_60", |b| {
        b.iter(|| {
            let out = adapters::parse(SourceKind::OwhaSchedule, black_box(&doc), &ctx);
            black_box(out.map(|o| o.games.len()).unwrap_or(0))
        })
    });
}

fn bench_standings(c: &mut Criterion) {
    let mut teams = vec![CompetitionTeam::new("self", "Wildcats")];
    teams.extend(OPPONENTS.iter().map(|n| CompetitionTeam::new(n.to_ascii_lowercase(), *n)));
    let games = round_robin(&teams, 4);
    let points = PointScheme::default();
    c.bench_function("standings_7_teams_x4", |b| {
        b.iter(|| {
            let rows = compute_standings(black_box(&teams), black_box(&games), &points, &DEFAULT_TIEBREAKS);
            black_box(rows.map(|r| r.len()).unwrap_or(0))
        })
    });
}

criterion_group!(benches, bench_owha, bench_standings);
criterion_main!(benches);
