// src/file.rs

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use serde::Serialize;

use crate::config::options::{ExportFormat, ExportOptions};
use crate::csv::rows_to_string;
use crate::model::{StandingsRow, StandingsTable};

/// Render a standings table in the requested format.
pub fn standings_to_string(table: &StandingsTable, format: ExportFormat, include_headers: bool) -> io::Result<String> {
    match format.delim() {
        Some(sep) => {
            let headers: Vec<String> = StandingsRow::HEADERS.iter().map(|h| h.to_string()).collect();
            let rows: Vec<Vec<String>> = table.rows.iter().map(StandingsRow::to_cells).collect();
            Ok(rows_to_string(&rows, include_headers.then_some(headers.as_slice()), sep))
        }
        None => Ok(join!(&serde_json::to_string_pretty(table)?, "\n")),
    }
}

/// Write a standings export. `out` overrides the path derived from `export`
/// and `stem`. Returns the final path written to.
pub fn write_standings_export(
    export: &ExportOptions,
    table: &StandingsTable,
    stem: &str,
    out: Option<&Path>,
) -> io::Result<PathBuf> {
    let path = match out {
        Some(p) if looks_like_dir_hint(p) || p.is_dir() => p.join(format!("{stem}.{}", export.format.ext())),
        Some(p) => p.to_path_buf(),
        None => export.out_path(stem),
    };
    let contents = standings_to_string(table, export.format, export.include_headers)?;
    write_atomic(&path, contents.as_bytes())?;
    Ok(path)
}

/// Pretty JSON, written atomically.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    write_atomic(path, text.as_bytes())
}

/// Write to a sibling temp file, then rename over the target, so readers never
/// see a half-written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)
}

pub fn ensure_directory(dir: &Path) -> io::Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", dir.display()),
        ));
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

pub fn looks_like_dir_hint(p: &Path) -> bool {
    let s = p.to_string_lossy();
    s.ends_with('/') || s.ends_with('\\')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> StandingsTable {
        let mut r = StandingsRow::new("Ice");
        r.gp = 2;
        r.w = 1;
        r.l = 1;
        r.pts = 2;
        r.refresh_derived();
        StandingsTable { title: Some(s!("Pool A")), source_url: None, rows: vec![r] }
    }

    #[test]
    fn tsv_with_headers() {
        let out = standings_to_string(&table(), ExportFormat::Tsv, true).unwrap();
        let mut lines = out.lines();
        assert!(lines.next().unwrap().starts_with("Team\tGP\tW"));
        assert_eq!(lines.next().unwrap(), "Ice\t2\t1\t1\t0\t0\t0\t2\t0\t0\t0\t0\t0.500\t");
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("pool.json");
        write_json(&target, &table()).unwrap();
        assert!(target.exists());
        assert!(!dir.path().join("nested").join("pool.json.tmp").exists());
        let back: StandingsTable = serde_json::from_str(&fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(back, table());
    }
}
