// src/adapters/team_list.rs
//! Opponent registry seed: a CSV with `Location, Name, Age Group, Level, OWHA Id`
//! headers, or just one full team name per line.

use super::{Adapter, Columns, ImportContext, ParseOutput, SourceKind, cell};
use crate::csv::parse_rows;
use crate::error::AdapterError;
use crate::model::OpponentCandidate;

pub struct TeamList;

impl Adapter for TeamList {
    fn kind(&self) -> SourceKind { SourceKind::TeamList }

    fn parse(&self, raw: &str, _ctx: &ImportContext) -> Result<ParseOutput, AdapterError> {
        let rows = parse_rows(raw, ',');
        let mut out = ParseOutput::default();
        let Some(header) = rows.first() else { return Ok(out) };

        let cols = Columns::new(header);
        let name_col = cols.find(&["name", "teamname", "team"]);
        let full_col = cols.find(&["fullname"]);
        if name_col.is_none() && full_col.is_none() {
            // No recognizable header: every line is a full name.
            for (i, r) in rows.iter().enumerate() {
                let row = i + 1;
                let full = r.join(",");
                let full = full.trim();
                if full.is_empty() {
                    skip_row!(out, row, "empty line");
                }
                out.opponents.push(OpponentCandidate::from_full_name(full));
            }
            return Ok(out);
        }

        let loc_col = cols.find(&["location", "association", "city"]);
        let age_col = cols.find(&["agegroup", "age", "division"]);
        let level_col = cols.find(&["level", "tier"]);
        let owha_col = cols.find(&["owhaid", "externalid"]);

        for (i, r) in rows.iter().skip(1).enumerate() {
            let row = i + 1;
            let mut c = match (cell(r, name_col), cell(r, full_col)) {
                ("", "") => skip_row!(out, row, "no team name"),
                ("", full) => OpponentCandidate::from_full_name(full),
                (name, _) => OpponentCandidate::from_parts(cell(r, loc_col), name),
            };
            c.age_group = cell(r, age_col).to_string();
            c.level = cell(r, level_col).to_string();
            c.owha_id = Some(cell(r, owha_col).to_string()).filter(|s| !s.is_empty());
            out.opponents.push(c);
        }
        Ok(out)
    }
}
