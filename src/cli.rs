// src/cli.rs
//! Command-line front end: `import`, `standings`, `status`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};

use crate::adapters::{ImportContext, SourceKind};
use crate::config::options::{AppOptions, ExportFormat};
use crate::file::{standings_to_string, write_standings_export};
use crate::import::{ImportOutcome, commit, prepare_import};
use crate::logger;
use crate::model::{Competition, CompetitionGame, GameType, StandingsRow, StandingsTable};
use crate::progress::Progress;
use crate::qualification::{TeamStatus, is_expired, playdown_status, pool_status, status_counts};
use crate::standings::{compute_playdown_standings, compute_pool_standings};
use crate::store::{JsonStore, Store};

#[derive(Parser)]
#[command(name = "rink_scrape", version)]
#[command(about = "Import hockey schedules, compute standings and qualification status", long_about = None)]
pub struct Cli {
    /// Data directory (default: .store)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Options file (default: rink_scrape.json if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log detail; repeat for trace
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a downloaded document and store its records
    Import(ImportArgs),
    /// Compute ranked standings for a competition
    Standings(StandingsArgs),
    /// Show expiry and OUT/ALIVE/LOCKED status for a competition
    Status(StatusArgs),
}

#[derive(Args)]
struct ImportArgs {
    /// owha-schedule, owha-standings, mhr-games, mhr-rankings, teamsnap, manual, playdown-entry, team-list
    #[arg(long)]
    source: SourceKind,
    #[arg(long)]
    file: PathBuf,
    #[arg(long)]
    team_id: String,
    /// Team name as the source prints it
    #[arg(long, default_value = "")]
    team_name: String,
    /// Year the season started in (2024 for 2024-25)
    #[arg(long)]
    season: Option<i32>,
    #[arg(long)]
    game_type: Option<GameType>,
    /// Ranking-service team number
    #[arg(long)]
    mhr_team: Option<u64>,
    /// Where the document was downloaded from; kept with standings
    #[arg(long)]
    source_url: Option<String>,
    /// Competition the imported games belong to
    #[arg(long)]
    competition: Option<String>,
    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct StandingsArgs {
    /// Competition file (JSON, `"kind": "playdown" | "tournament"`)
    #[arg(long)]
    competition: PathBuf,
    /// Only this pool (tournaments)
    #[arg(long)]
    pool: Option<String>,
    #[arg(long)]
    format: Option<ExportFormat>,
    /// Output file, or directory when several pools are written
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct StatusArgs {
    #[arg(long)]
    competition: PathBuf,
    #[arg(long)]
    pool: Option<String>,
    /// Evaluate as of this date (default: today)
    #[arg(long)]
    today: Option<NaiveDate>,
}

pub fn run() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let mut opts = AppOptions::load(cli.config.as_deref()).wrap_err("loading options")?;
    if let Some(dir) = cli.store {
        opts.store_dir = dir;
    }
    let level = match cli.verbose {
        0 => opts.log_level.to_filter(),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let log_path = opts.log_path();
    logger::init(&log_path, level).wrap_err_with(|| format!("opening log file {}", log_path.display()))?;

    let mut store = JsonStore::open(&opts.store_dir);
    match cli.command {
        Command::Import(args) => import(&mut store, &opts, args, cli.verbose > 0),
        Command::Standings(args) => standings(&mut store, &opts, args),
        Command::Status(args) => status(&store, args),
    }
}

/* ---------------- import ---------------- */

struct CliProgress {
    verbose: bool,
}

impl Progress for CliProgress {
    fn log(&mut self, msg: &str) {
        log::debug!("{msg}");
        if self.verbose {
            eprintln!("{msg}");
        }
    }
}

fn import(store: &mut JsonStore, opts: &AppOptions, args: ImportArgs, verbose: bool) -> Result<()> {
    let raw = fs::read_to_string(&args.file).wrap_err_with(|| format!("reading {}", args.file.display()))?;
    let ctx = ImportContext {
        team_id: args.team_id,
        team_name: args.team_name,
        season_start_year: args.season.unwrap_or(opts.season_start_year),
        game_type: args.game_type.unwrap_or_default(),
        mhr_team_nbr: args.mhr_team,
        source_url: args.source_url,
    };

    let mut progress = CliProgress { verbose };
    let outcome = prepare_import(&*store, args.source, &raw, &ctx, args.competition.as_deref(), &mut progress)
        .wrap_err_with(|| format!("importing {}", args.file.display()))?;
    print_outcome(&outcome);

    if args.dry_run {
        println!("dry run: nothing written");
        return Ok(());
    }
    let report = commit(store, &outcome).wrap_err("writing imported records")?;
    println!(
        "written: {} new games, {} score corrections, {} competition games, {} opponents{}",
        report.inserted,
        report.corrected,
        report.competition_games,
        report.opponents,
        if report.standings_saved { ", standings" } else { "" }
    );
    Ok(())
}

fn print_outcome(outcome: &ImportOutcome) {
    let s = &outcome.summary;
    println!(
        "parsed {}, skipped {}, duplicate {}, ambiguous {}, new {}, unresolved {}",
        s.parsed, s.skipped, s.duplicate, s.ambiguous, s.new, s.unresolved
    );
    for row in &outcome.parsed.skipped {
        log::debug!("skipped row {}: {}", row.row, row.reason);
    }
    let mut ambiguous = outcome.ambiguous().peekable();
    if ambiguous.peek().is_some() {
        println!("needs review (same contest, different source):");
        for d in ambiguous {
            println!("  {} ~ {} [{}]", d.incoming_id, d.matched_game_id.as_deref().unwrap_or("?"), d.matched_fields.join(", "));
        }
    }
    if !outcome.resolve.needs_review.is_empty() {
        println!("opponent names matching several registry entries:");
        for r in &outcome.resolve.needs_review {
            println!("  {} {:?} → {}", r.game_id, r.opponent_name, r.candidate_ids.join(" | "));
        }
    }
}

/* ---------------- standings ---------------- */

fn load_competition(path: &Path) -> Result<Competition> {
    let text = fs::read_to_string(path).wrap_err_with(|| format!("reading {}", path.display()))?;
    let comp: Competition = serde_json::from_str(&text).wrap_err_with(|| format!("parsing {}", path.display()))?;
    comp.validate().wrap_err_with(|| format!("checking {}", path.display()))?;
    Ok(comp)
}

/// `(key, table)` per pool asked for; playdowns have a single table.
fn standings_tables(
    comp: &Competition,
    games: &[CompetitionGame],
    pool: Option<&str>,
) -> Result<Vec<(String, StandingsTable)>> {
    let table = |title: String, rows: Vec<StandingsRow>| StandingsTable { title: Some(title), source_url: None, rows };
    match comp {
        Competition::Playdown(c) => {
            let rows = compute_playdown_standings(c, games)?;
            Ok(vec![(c.id.clone(), table(c.name.clone(), rows))])
        }
        Competition::Tournament(c) => {
            let mut out = Vec::new();
            for p in c.pools.iter().filter(|p| pool.is_none_or(|want| want == p.id)) {
                let rows = compute_pool_standings(c, games, &p.id)?;
                let title = if p.name.is_empty() { join!(&c.name, " ", &p.id) } else { join!(&c.name, " ", &p.name) };
                out.push((join!(&c.id, "-", &p.id), table(title, rows)));
            }
            if out.is_empty() {
                return Err(eyre!("no pool {:?} in {}", pool.unwrap_or_default(), c.id));
            }
            Ok(out)
        }
    }
}

fn standings(store: &mut JsonStore, opts: &AppOptions, args: StandingsArgs) -> Result<()> {
    let comp = load_competition(&args.competition)?;
    let games = store.fetch_competition_games(comp.id())?;
    let tables = standings_tables(&comp, &games, args.pool.as_deref())?;

    let mut export = opts.export.clone();
    if let Some(f) = args.format {
        export.format = f;
    }
    let several = tables.len() > 1;
    for (key, table) in &tables {
        store.save_standings(key, table)?;
        match &args.out {
            Some(out) => {
                let dir_hint = several.then(|| out.join(""));
                let path = write_standings_export(&export, table, key, Some(dir_hint.as_deref().unwrap_or(out)))?;
                println!("wrote {}", path.display());
            }
            None => {
                if several {
                    println!("# {}", table.title.as_deref().unwrap_or(key));
                }
                print!("{}", standings_to_string(table, export.format, export.include_headers)?);
            }
        }
    }
    Ok(())
}

/* ---------------- status ---------------- */

fn status(store: &JsonStore, args: StatusArgs) -> Result<()> {
    let comp = load_competition(&args.competition)?;
    let games = store.fetch_competition_games(comp.id())?;
    let today = args.today.unwrap_or_else(|| chrono::Local::now().date_naive());

    let state = if is_expired(&comp, &games, today) { "expired" } else { "active" };
    println!("{} ({}): {state} as of {today}", comp.name(), comp.id());

    let groups: Vec<(String, Vec<TeamStatus>)> = match &comp {
        Competition::Playdown(c) => vec![(c.id.clone(), playdown_status(c, &games, today)?)],
        Competition::Tournament(c) => c
            .pools
            .iter()
            .filter(|p| args.pool.as_deref().is_none_or(|want| want == p.id))
            .map(|p| -> Result<(String, Vec<TeamStatus>)> { Ok((p.id.clone(), pool_status(c, &games, &p.id, today)?)) })
            .collect::<Result<_>>()?,
    };

    for (key, statuses) in &groups {
        println!("\n[{key}]");
        println!("{:>3}  {:<28} {:>4} {:>4} {:>4}  STATUS", "#", "TEAM", "PTS", "MAX", "LEFT");
        for s in statuses {
            println!(
                "{:>3}  {:<28} {:>4} {:>4} {:>4}  {}",
                s.rank, s.team_name, s.pts, s.max_pts, s.remaining, s.status.as_str()
            );
        }
        let c = status_counts(statuses);
        println!("out {}, alive {}, locked {}", c.out, c.alive, c.locked);
    }
    Ok(())
}
