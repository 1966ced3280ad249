//! Command-line driver for the habit tracker core.
//!
//! # Responsibility
//! - Map subcommands onto registry, ledger, aggregation and transfer APIs.
//! - Turn every core error kind into a one-line message and exit code.

mod render;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use habitgrid_core::config::parse_window_days;
use habitgrid_core::db::open_db;
use habitgrid_core::{
    contribution_window, day_summary, export_json, habits_completed_on, import_json,
    init_logging, load_snapshot, CompletionDate, CompletionService, HabitId, HabitPatch,
    HabitService, SqliteCompletionRepository, SqliteHabitRepository, TrackerConfig,
};
use log::info;
use rusqlite::Connection;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "habitgrid")]
#[command(about = "Track daily habits and review them as a contribution graph", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database file (overrides HABITGRID_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Absolute directory for rolling logs (overrides HABITGRID_LOG_DIR)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error (overrides HABITGRID_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new habit
    Add(AddArgs),
    /// Rename or re-style a habit
    Edit(EditArgs),
    /// Delete a habit and its completion history
    Delete(IdArgs),
    /// List habits in creation order
    List,
    /// Flip a habit's completion for one day
    Toggle(ToggleArgs),
    /// Show one day's checklist
    Today(DateArgs),
    /// Show habits completed on a given date
    Day(DayArgs),
    /// Render the contribution graph
    Graph(GraphArgs),
    /// Write all data as JSON
    Export(ExportArgs),
    /// Replace all data from a JSON export
    Import(ImportArgs),
    /// Insert the starter habits into an empty store
    Seed,
}

#[derive(Args)]
struct AddArgs {
    name: String,
    #[arg(long)]
    icon: Option<String>,
    #[arg(long)]
    color: Option<String>,
}

#[derive(Args)]
struct EditArgs {
    id: String,
    #[arg(long)]
    name: Option<String>,
    /// Empty string clears the icon
    #[arg(long)]
    icon: Option<String>,
    /// Empty string clears the color
    #[arg(long)]
    color: Option<String>,
}

#[derive(Args)]
struct IdArgs {
    id: String,
}

#[derive(Args)]
struct ToggleArgs {
    id: String,
    /// Day to toggle (YYYY-MM-DD, default: local today)
    #[arg(long)]
    date: Option<String>,
}

#[derive(Args)]
struct DateArgs {
    /// Day to show (YYYY-MM-DD, default: local today)
    #[arg(long)]
    date: Option<String>,
}

#[derive(Args)]
struct DayArgs {
    date: String,
}

#[derive(Args)]
struct GraphArgs {
    /// Last day of the window (YYYY-MM-DD, default: local today)
    #[arg(long)]
    today: Option<String>,
    /// Window length in days (overrides HABITGRID_WINDOW_DAYS)
    #[arg(long)]
    days: Option<String>,
}

#[derive(Args)]
struct ExportArgs {
    /// Output file (default: stdout)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args)]
struct ImportArgs {
    file: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = TrackerConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(dir) = cli.log_dir {
        config.log_dir = Some(dir);
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if let Some(dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, dir)?;
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open {}", config.db_path.display()))?;
    info!(
        "event=cli_start module=cli status=ok db={}",
        config.db_path.display()
    );

    match cli.command {
        Commands::Add(args) => {
            let habit = habits(&conn)?
                .add_habit(&args.name, args.icon.as_deref(), args.color.as_deref())
                .map_err(|err| anyhow!("[{}] {err}", err.kind().as_str()))?;
            println!("{}", render::habit_line(&habit));
        }
        Commands::Edit(args) => {
            let patch = HabitPatch {
                name: args.name,
                icon: args.icon,
                color: args.color,
            };
            if patch.is_empty() {
                return Err(anyhow!("nothing to change; pass --name, --icon or --color"));
            }
            let habit = habits(&conn)?
                .edit_habit(&parse_id(&args.id)?, &patch)
                .map_err(|err| anyhow!("[{}] {err}", err.kind().as_str()))?;
            println!("{}", render::habit_line(&habit));
        }
        Commands::Delete(args) => {
            habits(&conn)?
                .delete_habit(&parse_id(&args.id)?)
                .map_err(|err| anyhow!("[{}] {err}", err.kind().as_str()))?;
            println!("deleted {}", args.id);
        }
        Commands::List => {
            let listed = habits(&conn)?
                .list_habits()
                .map_err(|err| anyhow!("[{}] {err}", err.kind().as_str()))?;
            for habit in &listed {
                println!("{}", render::habit_line(habit));
            }
        }
        Commands::Toggle(args) => {
            let date = resolve_date(args.date.as_deref())?;
            let outcome = ledger(&conn)?
                .toggle_completion(&parse_id(&args.id)?, date)
                .map_err(|err| anyhow!("[{}] {err}", err.kind().as_str()))?;
            let state = if outcome.completed { "completed" } else { "unmarked" };
            println!("{} {state} on {date}", args.id);
        }
        Commands::Today(args) => {
            let date = resolve_date(args.date.as_deref())?;
            let snapshot = load_snapshot(&conn)?;
            let summary = day_summary(date, &snapshot.habits, &snapshot.completions);
            println!("{date}  {}/{} completed", summary.completed, summary.total);
            let done = snapshot.completions.get(&date);
            for habit in &snapshot.habits {
                let checked = done.is_some_and(|ids| ids.contains(&habit.id));
                println!("[{}] {}", if checked { "x" } else { " " }, render::habit_line(habit));
            }
        }
        Commands::Day(args) => {
            let date = parse_date(&args.date)?;
            let snapshot = load_snapshot(&conn)?;
            let done = habits_completed_on(date, &snapshot.habits, &snapshot.completions);
            println!("{date}  {}/{} completed", done.len(), snapshot.habits.len());
            for habit in done {
                println!("{}", render::habit_line(habit));
            }
        }
        Commands::Graph(args) => {
            let today = resolve_date(args.today.as_deref())?;
            let days = match args.days.as_deref() {
                Some(raw) => parse_window_days(raw)?,
                None => config.window_days,
            };
            let snapshot = load_snapshot(&conn)?;
            let buckets = contribution_window(&snapshot, today, days);
            print!("{}", render::graph(&buckets));
        }
        Commands::Export(args) => {
            let rendered = export_json(&conn).map_err(|err| anyhow!("[{}] {err}", err.kind().as_str()))?;
            match args.out {
                Some(path) => std::fs::write(&path, rendered)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => println!("{rendered}"),
            }
        }
        Commands::Import(args) => {
            let raw = std::fs::read_to_string(&args.file)
                .with_context(|| format!("failed to read {}", args.file.display()))?;
            let summary = import_json(&conn, &raw)
                .map_err(|err| anyhow!("[{}] {err}", err.kind().as_str()))?;
            println!(
                "imported {} habits and {} completions ({} dropped references)",
                summary.habits, summary.completions, summary.dropped_references
            );
        }
        Commands::Seed => {
            let created = habits(&conn)?
                .seed_default_habits()
                .map_err(|err| anyhow!("[{}] {err}", err.kind().as_str()))?;
            if created.is_empty() {
                println!("registry not empty; nothing seeded");
            }
            for habit in &created {
                println!("{}", render::habit_line(habit));
            }
        }
    }

    Ok(())
}

fn habits(conn: &Connection) -> Result<HabitService<SqliteHabitRepository<'_>>> {
    Ok(HabitService::new(SqliteHabitRepository::try_new(conn)?))
}

fn ledger(conn: &Connection) -> Result<CompletionService<SqliteCompletionRepository<'_>>> {
    Ok(CompletionService::new(SqliteCompletionRepository::try_new(
        conn,
    )?))
}

fn parse_id(raw: &str) -> Result<HabitId> {
    HabitId::parse(raw).map_err(|err| anyhow!("[validation] {err}"))
}

fn parse_date(raw: &str) -> Result<CompletionDate> {
    CompletionDate::parse(raw).map_err(|err| anyhow!("[validation] {err}"))
}

fn resolve_date(raw: Option<&str>) -> Result<CompletionDate> {
    match raw {
        Some(value) => parse_date(value),
        None => Ok(CompletionDate::from_naive(Local::now().date_naive())),
    }
}
