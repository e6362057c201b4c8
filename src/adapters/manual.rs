// src/adapters/manual.rs
//! Hand-kept CSV: `date,time,opponent,location,home,team_score,opponent_score,game_type,notes`.

use super::{Adapter, Columns, ImportContext, ParseOutput, SourceKind, cell, parse_home_flag, parse_score_cell};
use crate::core::dates::{parse_game_date, parse_game_time};
use crate::csv::parse_rows;
use crate::error::AdapterError;
use crate::model::{Game, GameType, Source};

pub struct ManualCsv;

impl Adapter for ManualCsv {
    fn kind(&self) -> SourceKind { SourceKind::Manual }

    fn parse(&self, raw: &str, ctx: &ImportContext) -> Result<ParseOutput, AdapterError> {
        let mut rows = parse_rows(raw, ',').into_iter();
        let header = rows.next().ok_or_else(|| AdapterError::Malformed {
            format: "manual CSV",
            reason: s!("empty document"),
        })?;
        let cols = Columns::new(&header);
        let date_col = cols.require(&["date"], "date")?;
        let opp_col = cols.require(&["opponent"], "opponent")?;
        let time_col = cols.find(&["time"]);
        let loc_col = cols.find(&["location"]);
        let home_col = cols.find(&["home"]);
        let ours_col = cols.find(&["teamscore"]);
        let theirs_col = cols.find(&["opponentscore"]);
        let type_col = cols.find(&["gametype"]);
        let notes_col = cols.find(&["notes"]);

        let mut out = ParseOutput::default();
        for (i, r) in rows.enumerate() {
            let row = i + 1;
            let opponent = cell(&r, Some(opp_col));
            if opponent.is_empty() {
                skip_row!(out, row, "no opponent");
            }
            let date_text = cell(&r, Some(date_col));
            let Some(date) = parse_game_date(date_text, ctx.season_start_year) else {
                skip_row!(out, row, "unparsable date {date_text:?}");
            };
            let scores = parse_score_cell(cell(&r, ours_col))
                .and_then(|o| parse_score_cell(cell(&r, theirs_col)).map(|t| (o, t)));
            let score = match scores {
                Ok((Some(o), Some(t))) => Some((o, t)),
                Ok((None, None)) => None,
                Ok(_) => skip_row!(out, row, "only one score present"),
                Err(reason) => skip_row!(out, row, "{reason}"),
            };

            let mut g = Game::new(&ctx.team_id, date, opponent, Source::Manual, None);
            g.time = parse_game_time(cell(&r, time_col));
            g.location = cell(&r, loc_col).to_string();
            g.home = parse_home_flag(cell(&r, home_col));
            g.notes = cell(&r, notes_col).to_string();
            let label = cell(&r, type_col);
            g.game_type = match label.parse::<GameType>().unwrap_or_else(|_| GameType::from_label(label)) {
                GameType::Unlabeled => ctx.game_type,
                t => t,
            };
            if let Some((o, t)) = score {
                g.record_score(o, t);
            }
            out.games.push(g);
        }
        Ok(out)
    }
}
