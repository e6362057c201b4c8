// src/core/dates.rs
//! Loose date/time parsing for schedule cells.
//!
//! League pages print dates in whatever the template of the week says:
//! `2025-01-05`, `Jan 5, 2025`, `Sun, Jan 5`, `Jan 5`. Year-less dates are
//! placed in the hockey season starting in `season_start_year`: August through
//! December belong to that year, January through July to the next one.

use chrono::{Datelike, NaiveDate, NaiveTime};

use crate::config::consts::SEASON_FIRST_MONTH;

const WITH_YEAR: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%b %d, %Y",
    "%b %d %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d-%b-%Y",
];

const WITHOUT_YEAR: &[&str] = &["%b %d %Y", "%B %d %Y", "%m/%d %Y", "%d %b %Y"];

const TIMES: &[&str] = &["%H:%M", "%H:%M:%S", "%I:%M %p", "%I:%M%p", "%I %p", "%I%p"];

const WEEKDAYS: &[&str] = &["mon", "tue", "wed", "thu", "fri", "sat", "sun"];

pub fn parse_game_date(text: &str, season_start_year: i32) -> Option<NaiveDate> {
    let cleaned = strip_weekday(text.trim());
    if cleaned.is_empty() {
        return None;
    }
    // Drop ordinal suffixes ("Jan 5th") and dots ("Sept.").
    let cleaned = cleaned.replace('.', "");
    let cleaned = strip_ordinals(&cleaned);

    for fmt in WITH_YEAR {
        if let Ok(d) = NaiveDate::parse_from_str(&cleaned, fmt) {
            return Some(d);
        }
    }

    // Year-less: months from SEASON_FIRST_MONTH on belong to the start year,
    // earlier months to the year after.
    let cleaned = cleaned.trim_end_matches(',').to_string();
    for fmt in WITHOUT_YEAR {
        if let Some(d) = in_season(&cleaned, fmt, season_start_year) {
            return Some(d);
        }
    }
    // "Sept 14" is common enough to special-case
    if let Some(rest) = cleaned.strip_prefix("Sept ") {
        return parse_game_date(&join!("Sep ", rest), season_start_year);
    }
    None
}

/// `text` read in whichever half of the season its month falls in. Feb 29
/// only parses against a leap year, so both years are tried.
fn in_season(text: &str, fmt: &str, season_start_year: i32) -> Option<NaiveDate> {
    let with = |year: i32| NaiveDate::parse_from_str(&format!("{text} {year}"), fmt).ok();
    match with(season_start_year) {
        Some(d) if d.month() >= SEASON_FIRST_MONTH => Some(d),
        _ => with(season_start_year + 1).filter(|d| d.month() < SEASON_FIRST_MONTH),
    }
}

pub fn parse_game_time(text: &str) -> Option<NaiveTime> {
    let t = text.trim().to_ascii_uppercase().replace('.', "");
    if t.is_empty() || !t.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    TIMES.iter().find_map(|fmt| NaiveTime::parse_from_str(&t, fmt).ok())
}

fn strip_weekday(s: &str) -> &str {
    let (first, rest) = match s.split_once(|c: char| c == ' ' || c == ',') {
        Some(parts) => parts,
        None => return s,
    };
    let lc = first.to_ascii_lowercase();
    let is_weekday = lc.len() >= 3
        && lc.chars().all(|c| c.is_ascii_alphabetic())
        && WEEKDAYS.iter().any(|w| lc.starts_with(w));
    if is_weekday { rest.trim_start_matches([',', ' ']) } else { s }
}

fn strip_ordinals(s: &str) -> String {
    s.split(' ')
        .map(|tok| {
            let (num, tail) = tok.split_at(tok.find(|c: char| !c.is_ascii_digit()).unwrap_or(tok.len()));
            let tail_lc = tail.trim_end_matches(',').to_ascii_lowercase();
            if !num.is_empty() && matches!(tail_lc.as_str(), "st" | "nd" | "rd" | "th") {
                join!(num, &tail[2..])
            } else {
                tok.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn explicit_years() {
        assert_eq!(parse_game_date("2025-01-05", 2024), Some(d(2025, 1, 5)));
        assert_eq!(parse_game_date("Jan 5, 2025", 2024), Some(d(2025, 1, 5)));
        assert_eq!(parse_game_date("Sun, Jan 5, 2025", 2024), Some(d(2025, 1, 5)));
    }

    #[test]
    fn season_year_inference() {
        assert_eq!(parse_game_date("Jan 5", 2024), Some(d(2025, 1, 5)));
        assert_eq!(parse_game_date("Oct 12", 2024), Some(d(2024, 10, 12)));
        assert_eq!(parse_game_date("Sat Nov 2nd", 2024), Some(d(2024, 11, 2)));
        assert_eq!(parse_game_date("Sept 14", 2024), Some(d(2024, 9, 14)));
    }

    #[test]
    fn leap_day_in_the_second_half_of_the_season() {
        assert_eq!(parse_game_date("Feb 29", 2023), Some(d(2024, 2, 29)));
        assert_eq!(parse_game_date("Thu, Feb 29", 2023), Some(d(2024, 2, 29)));
        assert_eq!(parse_game_date("02/29", 2023), Some(d(2024, 2, 29)));
        assert_eq!(parse_game_date("Feb 29", 2024), None);
    }

    #[test]
    fn garbage_is_none() {
        assert_eq!(parse_game_date("", 2024), None);
        assert_eq!(parse_game_date("TBD", 2024), None);
    }

    #[test]
    fn clock_times() {
        assert_eq!(parse_game_time("7:30 PM"), NaiveTime::from_hms_opt(19, 30, 0));
        assert_eq!(parse_game_time("19:30"), NaiveTime::from_hms_opt(19, 30, 0));
        assert_eq!(parse_game_time("7:05p.m."), NaiveTime::from_hms_opt(19, 5, 0));
        assert_eq!(parse_game_time("Rescheduled"), None);
    }
}
