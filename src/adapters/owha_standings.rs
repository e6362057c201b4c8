// src/adapters/owha_standings.rs
//! League-site standings table. Same live region as the schedule; the column
//! meaning comes from the `<th>` header cells when the page has them.

use super::owha::live_region;
use super::{Adapter, Columns, ImportContext, ParseOutput, SourceKind};
use crate::core::html::{Scanner, cell_text, first_link_text, inner_after_open_tag};
use crate::error::AdapterError;
use crate::model::{OpponentCandidate, StandingsRow, StandingsTable};

pub struct OwhaStandings;

/// Column positions when a page ships no header row.
const POSITIONAL: [&str; 11] = ["team", "gp", "w", "l", "t", "otl", "sol", "pts", "gf", "ga", "pim"];

struct Layout {
    team: Option<usize>,
    counted: [(Stat, Option<usize>); 10],
}

#[derive(Clone, Copy)]
enum Stat { Gp, W, L, T, Otl, Sol, Pts, Gf, Ga, Pim }

impl Layout {
    fn from_header(cols: &Columns) -> Self {
        Self {
            team: cols.find(&["team", "teamname", "name"]),
            counted: [
                (Stat::Gp, cols.find(&["gp", "games", "gamesplayed", "g"])),
                (Stat::W, cols.find(&["w", "wins", "win"])),
                (Stat::L, cols.find(&["l", "losses", "loss"])),
                (Stat::T, cols.find(&["t", "ties", "tie"])),
                (Stat::Otl, cols.find(&["otl", "ot", "otloss", "otlosses"])),
                (Stat::Sol, cols.find(&["sol", "sl", "so", "soloss"])),
                (Stat::Pts, cols.find(&["pts", "points", "p"])),
                (Stat::Gf, cols.find(&["gf", "goalsfor"])),
                (Stat::Ga, cols.find(&["ga", "goalsagainst"])),
                (Stat::Pim, cols.find(&["pim", "pims", "penaltyminutes"])),
            ],
        }
    }

    fn positional() -> Self {
        let names: Vec<String> = POSITIONAL.iter().map(|s| s.to_string()).collect();
        Self::from_header(&Columns::new(&names))
    }
}

impl Adapter for OwhaStandings {
    fn kind(&self) -> SourceKind { SourceKind::OwhaStandings }

    fn parse(&self, raw: &str, ctx: &ImportContext) -> Result<ParseOutput, AdapterError> {
        let body = live_region(raw).ok_or(AdapterError::TableNotFound)?;
        let mut out = ParseOutput::default();
        let mut layout = header_cells(raw).map(|h| Layout::from_header(&Columns::new(&h)));
        let mut table = StandingsTable { source_url: ctx.source_url.clone(), ..StandingsTable::default() };

        for (i, tr) in Scanner::new(body).split_on_open("tr").into_iter().enumerate() {
            let row = i + 1;
            let sc = Scanner::new(tr);
            let heads = sc.split_on_open("th");
            if layout.is_none() && !heads.is_empty() {
                let names: Vec<String> = heads.iter().map(|h| cell_text(h)).collect();
                layout = Some(Layout::from_header(&Columns::new(&names)));
                continue;
            }
            let cells = sc.split_on_open("td");
            if cells.len() < 2 {
                skip_row!(out, row, "{} cells", cells.len());
            }
            let lay = layout.get_or_insert_with(Layout::positional);

            let Some(team_cell) = lay.team.and_then(|i| cells.get(i)) else {
                skip_row!(out, row, "no team cell");
            };
            let name = first_link_text(team_cell).unwrap_or_else(|| cell_text(team_cell));
            if name.is_empty() {
                skip_row!(out, row, "empty team name");
            }

            let mut line = StandingsRow::new(name.clone());
            let mut bad = None;
            for (stat, idx) in lay.counted {
                let text = idx.and_then(|i| cells.get(i)).map(|c| cell_text(c)).unwrap_or_default();
                match parse_count(&text) {
                    Some(n) => set(&mut line, stat, n),
                    None => { bad = Some(text); break; }
                }
            }
            if let Some(text) = bad {
                skip_row!(out, row, "non-numeric stat {text:?}");
            }
            line.refresh_derived();
            table.rows.push(line);
            out.opponents.push(OpponentCandidate::from_full_name(&name));
        }

        out.standings = Some(table);
        Ok(out)
    }
}

/* ---------------- helpers ---------------- */

/// `<th>` texts from the document's `<thead>`, if it has one.
fn header_cells(doc: &str) -> Option<Vec<String>> {
    let thead = Scanner::new(doc).blocks("thead").into_iter().next()?;
    let cells: Vec<String> = Scanner::new(inner_after_open_tag(thead))
        .split_on_open("th")
        .into_iter()
        .map(cell_text)
        .collect();
    (!cells.is_empty()).then_some(cells)
}

/// Empty and dash cells count as zero.
fn parse_count(text: &str) -> Option<u32> {
    let t = text.trim();
    if t.is_empty() || t == "-" { return Some(0); }
    t.parse().ok()
}

fn set(row: &mut StandingsRow, stat: Stat, n: u32) {
    match stat {
        Stat::Gp => row.gp = n,
        Stat::W => row.w = n,
        Stat::L => row.l = n,
        Stat::T => row.t = n,
        Stat::Otl => row.otl = n,
        Stat::Sol => row.sol = n,
        Stat::Pts => row.pts = n,
        Stat::Gf => row.gf = n,
        Stat::Ga => row.ga = n,
        Stat::Pim => row.pim = n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<table><thead><tr><th>#</th><th>Team</th><th>GP</th><th>W</th><th>L</th>
        <th>T</th><th>PTS</th><th>GF</th><th>GA</th></tr></thead>
        <tbody aria-live="polite">
        <tr><td>1</td><td><a href="/t/9">Waterloo Wildcats</a></td><td>4</td><td>3</td><td>1</td><td>0</td><td>6</td><td>12</td><td>5</td></tr>
        <tr><td>2</td><td>Kitchener Ice</td><td>4</td><td>1</td><td>3</td><td>0</td><td>2</td><td>5</td><td>12</td></tr>
        <tr><td>3</td><td>Guelph Gryphons</td><td>x</td></tr>
        </tbody></table>"#;

    #[test]
    fn header_drives_columns() {
        let ctx = ImportContext { source_url: Some(s!("https://example.org/standings")), ..ImportContext::default() };
        let out = OwhaStandings.parse(PAGE, &ctx).unwrap();
        let table = out.standings.unwrap();
        assert_eq!(table.source_url.as_deref(), Some("https://example.org/standings"));
        assert_eq!(table.rows.len(), 2);
        let top = &table.rows[0];
        assert_eq!(top.team_name, "Waterloo Wildcats");
        assert_eq!((top.gp, top.w, top.l, top.pts, top.diff), (4, 3, 1, 6, 7));
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.opponents[1].name, "Ice");
    }

    #[test]
    fn positional_without_header() {
        let page = r#"<tbody aria-live="off"><tr><td>Ice</td><td>2</td><td>1</td><td>1</td></tr></tbody>"#;
        let table = OwhaStandings.parse(page, &ImportContext::default()).unwrap().standings.unwrap();
        assert_eq!((table.rows[0].gp, table.rows[0].w, table.rows[0].l), (2, 1, 1));
    }
}
