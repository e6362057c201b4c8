// src/model/standings.rs
use serde::{Deserialize, Serialize};

/// One team's aggregate line in a standings table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StandingsRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_id: Option<String>,
    pub team_name: String,
    pub gp: u32,
    pub w: u32,
    pub l: u32,
    pub t: u32,
    pub otl: u32,
    pub sol: u32,
    pub pts: u32,
    pub gf: u32,
    pub ga: u32,
    pub diff: i64,
    pub pim: u32,
    pub win_pct: f64,
}

impl StandingsRow {
    pub fn new(team_name: impl Into<String>) -> Self {
        Self { team_name: team_name.into(), ..Self::default() }
    }

    /// Recompute the derived columns from the counted ones.
    pub fn refresh_derived(&mut self) {
        self.diff = i64::from(self.gf) - i64::from(self.ga);
        self.win_pct = if self.gp == 0 { 0.0 } else { f64::from(self.w) / f64::from(self.gp) };
    }

    /// `gp == w + l + t + otl + sol`
    pub fn is_balanced(&self) -> bool {
        self.gp == self.w + self.l + self.t + self.otl + self.sol
    }

    pub const HEADERS: [&'static str; 14] =
        ["Team", "GP", "W", "L", "T", "OTL", "SOL", "PTS", "GF", "GA", "DIFF", "PIM", "WIN%", "Id"];

    pub fn to_cells(&self) -> Vec<String> {
        vec![
            self.team_name.clone(),
            self.gp.to_string(),
            self.w.to_string(),
            self.l.to_string(),
            self.t.to_string(),
            self.otl.to_string(),
            self.sol.to_string(),
            self.pts.to_string(),
            self.gf.to_string(),
            self.ga.to_string(),
            self.diff.to_string(),
            self.pim.to_string(),
            format!("{:.3}", self.win_pct),
            self.team_id.clone().unwrap_or_default(),
        ]
    }
}

/// A ranked table plus where it came from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StandingsTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub rows: Vec<StandingsRow>,
}
