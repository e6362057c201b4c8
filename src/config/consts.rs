// src/config/consts.rs

// Local store
pub const STORE_DIR: &str = ".store";
pub const LOG_FILE: &str = "debug.log";
pub const CONFIG_FILE: &str = "rink_scrape.json";

// Season: months before this one belong to the second calendar year of a season
pub const SEASON_FIRST_MONTH: u32 = 8;

// Competitions
pub const SELF_ID: &str = "self";
pub const DEFAULT_WIN_POINTS: u32 = 2;
pub const DEFAULT_TIE_POINTS: u32 = 1;
pub const DEFAULT_OT_LOSS_POINTS: u32 = 1;

// Adapters
pub const SCHEDULE_MIN_CELLS: usize = 5;

// Export
pub const DEFAULT_OUT_DIR: &str = "out";
pub const DEFAULT_STANDINGS_SUBDIR: &str = "standings";
