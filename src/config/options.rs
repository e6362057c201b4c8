// src/config/options.rs
//! Runtime options.
//!
//! Defaults come from `consts`; a camelCase JSON file can override any of
//! them, and the CLI overrides the file. Engine computations never read these:
//! competition rules travel with each competition's own configuration.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::consts::*;
use crate::error::StoreError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppOptions {
    pub store_dir: PathBuf,
    pub log_file: Option<PathBuf>,
    pub log_level: LogLevel,
    /// Year the current hockey season started in; year-less dates resolve against it.
    pub season_start_year: i32,
    pub export: ExportOptions,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            store_dir: PathBuf::from(STORE_DIR),
            log_file: None,
            log_level: LogLevel::Info,
            season_start_year: current_season_start_year(),
            export: ExportOptions::default(),
        }
    }
}

impl AppOptions {
    /// Load from `path`, or from `rink_scrape.json` in the working directory when
    /// `path` is `None`. A missing default file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, StoreError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(CONFIG_FILE), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| self.store_dir.join(LOG_FILE))
    }
}

fn current_season_start_year() -> i32 {
    let today = chrono::Local::now().date_naive();
    if today.month() >= SEASON_FIRST_MONTH { today.year() } else { today.year() - 1 }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    Tsv,
    Json,
}

impl ExportFormat {
    pub fn ext(&self) -> &'static str {
        match self { ExportFormat::Csv => "csv", ExportFormat::Tsv => "tsv", ExportFormat::Json => "json" }
    }
    /// Field separator for delimited formats.
    pub fn delim(&self) -> Option<char> {
        match self { ExportFormat::Csv => Some(','), ExportFormat::Tsv => Some('\t'), ExportFormat::Json => None }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "tsv" => Ok(ExportFormat::Tsv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!("Unknown format: {other}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub out_dir: PathBuf,
    pub include_headers: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            out_dir: PathBuf::from(DEFAULT_OUT_DIR).join(DEFAULT_STANDINGS_SUBDIR),
            include_headers: true,
        }
    }
}

impl ExportOptions {
    /// `<out_dir>/<stem>.<ext>`; the format decides the extension.
    pub fn out_path(&self, stem: &str) -> PathBuf {
        self.out_dir.join(join!(stem, ".", self.format.ext()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let opts: AppOptions = serde_json::from_str(r#"{ "storeDir": "data", "export": { "format": "tsv" } }"#).unwrap();
        assert_eq!(opts.store_dir, PathBuf::from("data"));
        assert_eq!(opts.export.format, ExportFormat::Tsv);
        assert!(opts.export.include_headers);
        assert_eq!(opts.log_level, LogLevel::Info);
    }

    #[test]
    fn out_path_follows_format() {
        let mut export = ExportOptions::default();
        assert!(export.out_path("u13").to_string_lossy().ends_with("u13.csv"));
        export.format = ExportFormat::Json;
        assert!(export.out_path("u13").to_string_lossy().ends_with("u13.json"));
    }
}
