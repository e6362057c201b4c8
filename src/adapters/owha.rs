// src/adapters/owha.rs
//! League-site schedule/results table.
//!
//! The page carries one live-updating `<tbody aria-live="…">` holding every game
//! of the division. Columns: id | date (+ notes after `<br>`) | rink | home | visitor.
//! Team cells carry a trailing `(n)` once the game is played.

use lazy_regex::regex_captures;
use serde::{Deserialize, Serialize};

use super::{Adapter, ImportContext, ParseOutput, SourceKind};
use crate::config::consts::SCHEDULE_MIN_CELLS;
use crate::core::dates::{parse_game_date, parse_game_time};
use crate::core::html::{Scanner, cell_text, first_link_text, inner_after_open_tag, opener_lc, split_line_breaks};
use crate::core::sanitize::{contains_words, normalize_key};
use crate::error::AdapterError;
use crate::model::{Game, Source};

/// A schedule row as the league prints it, before any team's perspective.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueGame {
    pub id: String,
    /// Raw date text; parsing needs the season year and happens per team.
    pub date: String,
    pub notes: String,
    pub location: String,
    pub home_team: String,
    pub home_score: Option<u32>,
    pub visitor_team: String,
    pub visitor_score: Option<u32>,
    pub played: bool,
}

impl LeagueGame {
    /// Both sides name the same team.
    pub fn plays_itself(&self) -> bool {
        let home = normalize_key(&self.home_team);
        !home.is_empty() && home == normalize_key(&self.visitor_team)
    }

    /// `Some(true)` when `team_name` is the home side, `Some(false)` when visitor.
    /// A name that only loosely matches, and matches both sides, is an error.
    pub fn side_of(&self, team_name: &str) -> Result<Option<bool>, String> {
        let key = normalize_key(team_name);
        if key.is_empty() { return Ok(None); }
        if normalize_key(&self.home_team) == key { return Ok(Some(true)); }
        if normalize_key(&self.visitor_team) == key { return Ok(Some(false)); }
        match (contains_words(&self.home_team, team_name), contains_words(&self.visitor_team, team_name)) {
            (true, true) => Err(format!(
                "{team_name:?} matches both {:?} and {:?}",
                self.home_team, self.visitor_team
            )),
            (home, visitor) => Ok((home || visitor).then_some(home)),
        }
    }

    /// The game from `ctx`'s team's point of view. `Ok(None)` when the team
    /// did not play in it; `Err` carries a skip reason.
    pub fn to_team_game(&self, ctx: &ImportContext) -> Result<Option<Game>, String> {
        let Some(home) = self.side_of(&ctx.team_name)? else { return Ok(None) };
        let date = parse_game_date(&self.date, ctx.season_start_year)
            .ok_or_else(|| format!("unparsable date {:?}", self.date))?;

        let (opponent, ours, theirs) = if home {
            (&self.visitor_team, self.home_score, self.visitor_score)
        } else {
            (&self.home_team, self.visitor_score, self.home_score)
        };
        let sid = Some(self.id.clone()).filter(|s| !s.is_empty());
        let mut g = Game::new(&ctx.team_id, date, opponent.as_str(), Source::Owha, sid);
        g.home = Some(home);
        g.location = self.location.clone();
        g.game_type = ctx.game_type;
        g.notes = self.notes.clone();
        g.time = find_time(&self.notes);
        if let (Some(o), Some(t)) = (ours, theirs) {
            g.record_score(o, t);
        }
        Ok(Some(g))
    }
}

pub struct OwhaSchedule;

impl Adapter for OwhaSchedule {
    fn kind(&self) -> SourceKind { SourceKind::OwhaSchedule }

    fn parse(&self, raw: &str, ctx: &ImportContext) -> Result<ParseOutput, AdapterError> {
        let body = live_region(raw).ok_or(AdapterError::TableNotFound)?;
        let mut out = ParseOutput::default();

        for (i, tr) in Scanner::new(body).split_on_open("tr").into_iter().enumerate() {
            let row = i + 1;
            let cells = Scanner::new(tr).split_on_open("td");
            if cells.len() < SCHEDULE_MIN_CELLS {
                skip_row!(out, row, "{} cells", cells.len());
            }

            let league = league_game(&cells);
            if league.plays_itself() {
                skip_row!(out, row, "{} on both sides", league.home_team);
            }
            let team_game = league.to_team_game(ctx);
            out.league_games.push(league);
            match team_game {
                Ok(Some(g)) => out.games.push(g),
                Ok(None) => {}
                Err(reason) => skip_row!(out, row, "{reason}"),
            }
        }
        Ok(out)
    }
}

/* ---------------- helpers ---------------- */

/// Inner HTML of the first `<tbody>` marked `aria-live`.
pub(crate) fn live_region(doc: &str) -> Option<&str> {
    Scanner::new(doc)
        .blocks("tbody")
        .into_iter()
        .find(|b| opener_lc(b).contains("aria-live"))
        .map(inner_after_open_tag)
}

fn league_game(cells: &[&str]) -> LeagueGame {
    let mut parts = split_line_breaks(cells[1]).into_iter().map(cell_text);
    let date = parts.next().unwrap_or_default();
    let notes = parts.filter(|p| !p.is_empty()).collect::<Vec<_>>().join(" ");

    let location = first_link_text(cells[2]).unwrap_or_else(|| cell_text(cells[2]));
    let (home_team, home_score) = team_and_score(&cell_text(cells[3]));
    let (visitor_team, visitor_score) = team_and_score(&cell_text(cells[4]));

    LeagueGame {
        id: cell_text(cells[0]),
        date,
        notes,
        location,
        played: home_score.is_some() && visitor_score.is_some(),
        home_team,
        home_score,
        visitor_team,
        visitor_score,
    }
}

/// First clock time mentioned in free text; `"7:15 PM"` wins over `"7:15"`.
fn find_time(notes: &str) -> Option<chrono::NaiveTime> {
    let words: Vec<&str> = notes.split_whitespace().collect();
    (0..words.len()).find_map(|i| {
        words
            .get(i + 1)
            .and_then(|next| parse_game_time(&join!(words[i], " ", next)))
            .or_else(|| parse_game_time(words[i]))
    })
}

/// `"Wildcats (3)"` → `("Wildcats", Some(3))`; anything else is all name.
pub(crate) fn team_and_score(text: &str) -> (String, Option<u32>) {
    if let Some((_, name, score)) = regex_captures!(r"^(.*?)\s+\((\d+)\)\s*$", text) {
        if let Ok(n) = score.parse::<u32>() {
            return (name.trim().to_string(), Some(n));
        }
    }
    (text.trim().to_string(), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_score_is_split_off() {
        assert_eq!(team_and_score("Wildcats (3)"), (s!("Wildcats"), Some(3)));
        assert_eq!(team_and_score("  Ice  (10) "), (s!("Ice"), Some(10)));
        assert_eq!(team_and_score("Kitchener (Jr) Rangers"), (s!("Kitchener (Jr) Rangers"), None));
        assert_eq!(team_and_score("Ice"), (s!("Ice"), None));
    }

    #[test]
    fn perspective_follows_owning_team() {
        let lg = LeagueGame {
            id: s!("88"),
            date: s!("Sat Oct 12"),
            notes: s!("7:15 PM"),
            location: s!("Rink A"),
            home_team: s!("Ice"),
            home_score: Some(2),
            visitor_team: s!("Waterloo Wildcats U13 AA"),
            visitor_score: Some(5),
            played: true,
        };
        let ctx = ImportContext::new("t1", "Waterloo Wildcats", 2024);
        let g = lg.to_team_game(&ctx).unwrap().unwrap();
        assert_eq!(g.home, Some(false));
        assert_eq!(g.opponent_name, "Ice");
        assert_eq!(g.score(), Some((5, 2)));
        assert_eq!(g.date, chrono::NaiveDate::from_ymd_opt(2024, 10, 12).unwrap());
        assert_eq!(g.time, chrono::NaiveTime::from_hms_opt(19, 15, 0));
        assert_eq!(g.id, "owha-t1-88");

        let other = ImportContext::new("t2", "Rangers", 2024);
        assert_eq!(lg.to_team_game(&other), Ok(None));
    }

    #[test]
    fn loose_name_matching_both_sides_is_refused() {
        let lg = LeagueGame {
            id: s!("91"),
            date: s!("Sat Oct 19"),
            notes: s!(),
            location: s!(),
            home_team: s!("Waterloo Wildcats U13 AA"),
            home_score: None,
            visitor_team: s!("Waterloo Wildcats U13 A"),
            visitor_score: None,
            played: false,
        };
        assert!(lg.side_of("Waterloo Wildcats").is_err());
        assert!(lg.to_team_game(&ImportContext::new("t1", "Waterloo Wildcats", 2024)).is_err());
        // an exact name still picks its side
        assert_eq!(lg.side_of("Waterloo Wildcats U13 A"), Ok(Some(false)));
        assert!(!lg.plays_itself());
    }
}
