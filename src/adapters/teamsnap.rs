// src/adapters/teamsnap.rs
//! Team-management CSV export. Header row required; columns are found by name.

use lazy_regex::regex_captures;

use super::{Adapter, Columns, ImportContext, ParseOutput, SourceKind, cell, parse_home_flag};
use crate::core::dates::{parse_game_date, parse_game_time};
use crate::csv::parse_rows;
use crate::error::AdapterError;
use crate::model::{Game, GameResult, GameType, Source};

pub struct Teamsnap;

impl Adapter for Teamsnap {
    fn kind(&self) -> SourceKind { SourceKind::Teamsnap }

    fn parse(&self, raw: &str, ctx: &ImportContext) -> Result<ParseOutput, AdapterError> {
        let mut rows = parse_rows(raw, ',').into_iter();
        let header = rows.next().ok_or_else(|| AdapterError::Malformed {
            format: "team-management export",
            reason: s!("empty document"),
        })?;
        let cols = Columns::new(&header);
        let date_col = cols.require(&["date", "eventdate", "gamedate"], "Date")?;
        let opp_col = cols.require(&["opponent", "opponentname"], "Opponent")?;
        let time_col = cols.find(&["time", "starttime", "eventtime"]);
        let loc_col = cols.find(&["location", "locationname", "venue", "arena"]);
        let home_col = cols.find(&["homeaway", "homeoraway", "home"]);
        let result_col = cols.find(&["result", "score", "finalscore"]);
        let type_col = cols.find(&["gametype", "type", "eventtype"]);
        let id_col = cols.find(&["eventid", "id", "gameid"]);
        let notes_col = cols.find(&["notes", "label", "eventname"]);

        let mut out = ParseOutput::default();
        for (i, r) in rows.enumerate() {
            let row = i + 1;
            let opponent = cell(&r, Some(opp_col));
            if opponent.is_empty() {
                skip_row!(out, row, "no opponent (practice or event)");
            }
            let date_text = cell(&r, Some(date_col));
            let Some(date) = parse_game_date(date_text, ctx.season_start_year) else {
                skip_row!(out, row, "unparsable date {date_text:?}");
            };
            let score = match read_result(cell(&r, result_col)) {
                Ok(s) => s,
                Err(reason) => skip_row!(out, row, "{reason}"),
            };

            let sid = Some(cell(&r, id_col).to_string()).filter(|s| !s.is_empty());
            let mut g = Game::new(&ctx.team_id, date, opponent, Source::Teamsnap, sid);
            g.time = parse_game_time(cell(&r, time_col));
            g.location = cell(&r, loc_col).to_string();
            g.home = parse_home_flag(cell(&r, home_col));
            g.notes = cell(&r, notes_col).to_string();
            g.game_type = match GameType::from_label(cell(&r, type_col)) {
                GameType::Unlabeled => ctx.game_type,
                t => t,
            };
            if let Some((ours, theirs)) = score {
                g.record_score(ours, theirs);
            }
            out.games.push(g);
        }
        Ok(out)
    }
}

/* ---------------- helpers ---------------- */

/// `"W 4-2"`, `"L 1-3"`, `"T 2-2"` or a bare `"4-2"` → `(ours, theirs)`.
/// Empty means not played. A letter that disagrees with the score order flips
/// the score when that makes them agree.
pub(crate) fn read_result(text: &str) -> Result<Option<(u32, u32)>, String> {
    let t = text.trim();
    if t.is_empty() {
        return Ok(None);
    }
    let Some((_, letter, a, b)) = regex_captures!(r"^(?i)([wlt])?\s*[:,]?\s*(\d+)\s*-\s*(\d+)$", t) else {
        return Err(format!("unrecognized result {t:?}"));
    };
    let (a, b) = match (a.parse::<u32>(), b.parse::<u32>()) {
        (Ok(a), Ok(b)) => (a, b),
        _ => return Err(format!("score out of range {t:?}")),
    };
    let Some(claimed) = letter.chars().next().and_then(GameResult::from_letter) else {
        return Ok(Some((a, b)));
    };
    if GameResult::from_scores(a, b) == claimed {
        Ok(Some((a, b)))
    } else if GameResult::from_scores(b, a) == claimed {
        Ok(Some((b, a)))
    } else {
        Err(format!("result {t:?} contradicts its score"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_letters() {
        assert_eq!(read_result("W 4-2"), Ok(Some((4, 2))));
        assert_eq!(read_result("w 2-4"), Ok(Some((4, 2))));
        assert_eq!(read_result("L 1-3"), Ok(Some((1, 3))));
        assert_eq!(read_result("3-3"), Ok(Some((3, 3))));
        assert_eq!(read_result(""), Ok(None));
        assert!(read_result("T 2-1").is_err());
        assert!(read_result("Cancelled").is_err());
    }

    #[test]
    fn date_column_is_required() {
        let raw = "Opponent,Time\nIce,7:00 PM\n";
        let err = Teamsnap.parse(raw, &ImportContext::default()).unwrap_err();
        assert!(matches!(err, AdapterError::MissingColumn("Date")));
    }

    #[test]
    fn practices_are_skipped() {
        let raw = "Date,Time,Opponent,Location,Home/Away,Result,Event ID\n\
                   10/05/2024,7:00 PM,Ice,Rink A,Home,W 4-2,9001\n\
                   10/06/2024,6:00 PM,,Rink A,,,9002\n";
        let ctx = ImportContext::new("t1", "Wildcats", 2024);
        let out = Teamsnap.parse(raw, &ctx).unwrap();
        assert_eq!(out.games.len(), 1);
        assert_eq!(out.games[0].id, "teamsnap-t1-9001");
        assert_eq!(out.games[0].home, Some(true));
        assert_eq!(out.skipped[0].row, 2);
    }
}
