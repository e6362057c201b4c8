// src/model/mhr.rs
use serde::{Deserialize, Serialize};

use super::StandingsRow;

/// A ranking-service snapshot line. Imported as-is; never recomputed here.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MhrRankingEntry {
    pub team_nbr: u32,
    pub ranking: u32,
    /// Week-over-week movement; positive means the team climbed.
    #[serde(default)]
    pub difference: i32,
    pub name: String,
    #[serde(default)]
    pub gp: u32,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub ties: u32,
    #[serde(default)]
    pub gf: u32,
    #[serde(default)]
    pub ga: u32,
    #[serde(default)]
    pub rating: f64,
    /// Strength of schedule.
    #[serde(default)]
    pub sched: f64,
    /// Average goal differential.
    #[serde(default)]
    pub agd: f64,
}

impl MhrRankingEntry {
    pub fn to_standings_row(&self) -> StandingsRow {
        let mut row = StandingsRow::new(self.name.clone());
        row.gp = self.gp;
        row.w = self.wins;
        row.l = self.losses;
        row.t = self.ties;
        row.pts = self.wins.saturating_mul(2).saturating_add(self.ties);
        row.gf = self.gf;
        row.ga = self.ga;
        row.refresh_derived();
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standings_row_from_ranking() {
        let e = MhrRankingEntry { name: s!("Ice"), gp: 10, wins: 6, losses: 3, ties: 1, gf: 30, ga: 20, ..Default::default() };
        let row = e.to_standings_row();
        assert_eq!((row.pts, row.diff), (13, 10));
        assert!(row.is_balanced());
    }

    #[test]
    fn absurd_records_do_not_overflow() {
        let e = MhrRankingEntry { name: s!("Ice"), wins: u32::MAX, ties: 7, ..Default::default() };
        assert_eq!(e.to_standings_row().pts, u32::MAX);
    }
}
