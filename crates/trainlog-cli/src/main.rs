//! trainlog CLI: record sets, import the progress workbook and review
//! weekly metrics from the terminal.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use comfy_table::{presets::UTF8_FULL, Table};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use trainlog_core::dashboard::{self, Headline, WeekFilter};
use trainlog_core::ingest;
use trainlog_core::{
    compute_summary, storage, IngestReport, Ingestor, Session, SummaryRecord, TrainlogConfig,
    WeekLabel,
};
use trainlog_server::chart::{self, ChartMetric};
use trainlog_server::{serve, ServerConfig};

#[derive(Parser)]
#[command(
    name = "trainlog",
    about = "🏋️  trainlog: weekly strength training log",
    version
)]
struct Cli {
    /// Config file (default: ./trainlog.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Record store CSV, overriding the config
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Show weekly metrics for one exercise
    Summary {
        /// Week label, or "all"
        #[arg(long, short)]
        week: Option<String>,
        /// Exercise (default: first available)
        #[arg(long, short)]
        exercise: Option<String>,
        /// Output format
        #[arg(long, short, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// List recorded weeks and exercises
    List {
        /// Only exercises with data in this week
        #[arg(long, short)]
        week: Option<String>,
    },
    /// Enter sets line by line and append them to the store
    Record {
        #[arg(long, short)]
        exercise: String,
        /// Week label (default: the current week)
        #[arg(long, short, conflicts_with_all = ["week_of_month", "month"])]
        week: Option<String>,
        /// Week of the month, 1-4
        #[arg(long, requires = "month")]
        week_of_month: Option<u8>,
        /// Month number, 1-12
        #[arg(long, requires = "week_of_month")]
        month: Option<u32>,
    },
    /// Rebuild the set list from the progress workbook
    Import {
        /// Workbook to read (default: from config)
        #[arg(long)]
        workbook: Option<PathBuf>,
        /// CSV file to write (default: the record store)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Write SVG charts of one exercise's weekly history
    Chart {
        #[arg(long, short)]
        exercise: String,
        /// Output directory (default: from config)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Start the dashboard API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,
    },
    /// Print the effective configuration
    Config {
        /// Save it to the config file
        #[arg(long)]
        write: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let mut config = TrainlogConfig::load(cli.config.as_deref())?;
    if let Some(store) = cli.store {
        config.store_path = store;
    }

    match cli.command {
        Commands::Summary {
            week,
            exercise,
            format,
        } => {
            cmd_summary(&config, week, exercise, format)?;
        }
        Commands::List { week } => {
            cmd_list(&config, week)?;
        }
        Commands::Record {
            exercise,
            week,
            week_of_month,
            month,
        } => {
            let week = match (week, week_of_month, month) {
                (Some(week), _, _) => week,
                (None, Some(n), Some(m)) => WeekLabel::new(n, m)?.to_string(),
                _ => WeekLabel::current().to_string(),
            };
            cmd_record(&config, exercise, week)?;
        }
        Commands::Import { workbook, output } => {
            cmd_import(&config, workbook, output)?;
        }
        Commands::Chart { exercise, out_dir } => {
            cmd_chart(&config, &exercise, out_dir)?;
        }
        Commands::Serve { host, port } => {
            cmd_serve(&config, host, port).await?;
        }
        Commands::Config { write } => {
            let path = cli
                .config
                .unwrap_or_else(|| PathBuf::from(TrainlogConfig::FILE_NAME));
            cmd_config(&config, &path, write)?;
        }
    }

    Ok(())
}

// ─── Command implementations ──────────────────────────────────────────────────

fn load_summary(config: &TrainlogConfig) -> Result<Vec<SummaryRecord>> {
    let records = storage::load_records(&config.store_path)?;
    Ok(compute_summary(&records))
}

fn cmd_summary(
    config: &TrainlogConfig,
    week: Option<String>,
    exercise: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let summary = load_summary(config)?;
    if summary.is_empty() {
        println!(
            "No sets recorded in '{}' yet. Add some with `trainlog record` or `trainlog import`.",
            config.store_path.display()
        );
        return Ok(());
    }

    let filter = WeekFilter::from_option(week.as_deref());
    let exercise = match exercise {
        Some(e) => e,
        None => match dashboard::available_exercises(&summary, &filter).into_iter().next() {
            Some(e) => e,
            None => {
                println!("No exercises recorded for {}", filter.label());
                return Ok(());
            }
        },
    };

    let rows = dashboard::select(&summary, &filter, &exercise);
    if rows.is_empty() {
        println!("No data for '{}' in {}", exercise, filter.label());
        return Ok(());
    }

    match format {
        OutputFormat::Table => print_summary(&exercise, &filter, &rows),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(io::stdout());
            for row in &rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}

fn print_summary(exercise: &str, filter: &WeekFilter, rows: &[&SummaryRecord]) {
    let headline = Headline::from_rows(rows);
    println!("Exercise: {} ({})", exercise, filter.label());
    println!("  Mean weight:  {} kg", format_value(headline.mean_weight));
    println!("  Total reps:   {}", headline.total_reps);
    println!("  Total volume: {}", format_value(headline.total_volume));
    println!();

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header([
        "Week",
        "Mean weight",
        "Reps",
        "Volume",
        "Sets",
        "Volume/set",
        "Est. 1RM",
        "Intensity %",
        "Max weight",
        "Δ Volume",
    ]);
    for row in rows {
        table.add_row([
            row.week.clone(),
            format_value(row.mean_weight),
            row.total_reps.to_string(),
            format_value(row.total_volume),
            row.set_count.to_string(),
            format_value(row.volume_per_set),
            format_value(row.estimated_one_rep_max),
            format_value(row.intensity_pct),
            format_value(row.max_weight),
            row.volume_delta
                .map(format_value)
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    println!("{}", table);
}

fn cmd_list(config: &TrainlogConfig, week: Option<String>) -> Result<()> {
    let summary = load_summary(config)?;
    if summary.is_empty() {
        println!("No sets recorded in '{}'", config.store_path.display());
        return Ok(());
    }

    let filter = WeekFilter::from_option(week.as_deref());
    let exercises = dashboard::available_exercises(&summary, &filter);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["Exercise", "Weeks", "Latest week"]);
    for exercise in &exercises {
        let history = dashboard::exercise_history(&summary, exercise);
        let latest = history.last().map(|r| r.week.as_str()).unwrap_or("-");
        table.add_row([exercise.as_str(), &history.len().to_string(), latest]);
    }

    println!("Weeks: {}", dashboard::available_weeks(&summary).join(", "));
    println!("Exercises in {}:", filter.label());
    println!("{}", table);
    Ok(())
}

/// One line of input to `trainlog record`.
#[derive(Debug, PartialEq)]
enum Entry {
    Set { weight: f64, reps: u32 },
    Delete(usize),
    Exercise(String),
    Week(String),
    List,
    Save,
    Quit,
    Blank,
}

fn parse_entry(line: &str) -> Result<Entry, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };
    match word {
        "" => Ok(Entry::Blank),
        "quit" | "exit" | "q" => Ok(Entry::Quit),
        "save" => Ok(Entry::Save),
        "list" | "ls" => Ok(Entry::List),
        "del" | "rm" => rest
            .parse::<usize>()
            .ok()
            .filter(|n| *n >= 1)
            .map(|n| Entry::Delete(n - 1))
            .ok_or_else(|| format!("expected a set number after '{word}'")),
        "exercise" if !rest.is_empty() => Ok(Entry::Exercise(rest.to_string())),
        "week" if !rest.is_empty() => Ok(Entry::Week(rest.to_string())),
        "add" => parse_set(rest),
        _ => parse_set(line),
    }
}

fn parse_set(text: &str) -> Result<Entry, String> {
    let mut parts = text.split_whitespace();
    let (Some(weight), Some(reps), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(format!("expected '<weight> <reps>', got '{text}'"));
    };
    let weight = weight
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| format!("'{weight}' is not a weight"))?;
    let reps = reps
        .parse::<u32>()
        .map_err(|_| format!("'{reps}' is not a rep count"))?;
    Ok(Entry::Set { weight, reps })
}

fn cmd_record(config: &TrainlogConfig, exercise: String, week: String) -> Result<()> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    if interactive {
        println!("Recording into {}", config.store_path.display());
        println!("Enter '<weight> <reps>' per set; commands: del <n>, list, exercise <name>, week <label>, save, quit");
    }
    record_loop(&config.store_path, exercise, week, stdin.lock(), interactive)
}

fn record_loop(
    store: &Path,
    mut exercise: String,
    mut week: String,
    input: impl BufRead,
    interactive: bool,
) -> Result<()> {
    let mut session = Session::new();
    let mut lines = input.lines();

    loop {
        if interactive {
            print!("{} · {}> ", exercise, week);
            io::stdout().flush()?;
        }
        let Some(line) = lines.next() else { break };
        let entry = match parse_entry(&line?) {
            Ok(entry) => entry,
            Err(msg) => {
                println!("Error: {}", msg);
                continue;
            }
        };

        match entry {
            Entry::Blank => {}
            Entry::Quit => break,
            Entry::Set { weight, reps } => {
                match session.add(exercise.as_str(), week.as_str(), weight, reps) {
                    Ok(_) => println!(
                        "  + {} · {} · {} kg × {} ({} pending)",
                        exercise,
                        week,
                        weight,
                        reps,
                        session.len()
                    ),
                    Err(e) => println!("Error: {}", e),
                }
            }
            Entry::Delete(index) => match session.remove(index) {
                Ok(set) => println!("  - removed {} kg × {}", set.weight, set.reps),
                Err(e) => println!("Error: {}", e),
            },
            Entry::Exercise(name) => {
                exercise = name;
                println!("Exercise: {}", exercise);
            }
            Entry::Week(label) => {
                week = label;
                println!("Week: {}", week);
            }
            Entry::List => print_pending(&session),
            Entry::Save => {
                if session.is_empty() {
                    println!("Nothing to save.");
                    continue;
                }
                match session.save(store) {
                    Ok(saved) => {
                        println!("  ✓ Saved {} set(s) to {}", saved.len(), store.display())
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
        }
    }

    if !session.is_empty() {
        warn!(sets = session.len(), "Discarding unsaved sets");
    }
    Ok(())
}

fn print_pending(session: &Session) {
    if session.is_empty() {
        println!("No pending sets.");
        return;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["#", "Exercise", "Week", "Weight", "Reps"]);
    for (i, set) in session.pending().iter().enumerate() {
        table.add_row([
            (i + 1).to_string(),
            set.exercise.clone(),
            set.week.clone(),
            set.weight.to_string(),
            set.reps.to_string(),
        ]);
    }
    println!("{}", table);
}

fn cmd_import(
    config: &TrainlogConfig,
    workbook: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let workbook = workbook.unwrap_or_else(|| config.workbook_path.clone());
    let output = output.unwrap_or_else(|| config.store_path.clone());
    if !workbook.exists() {
        anyhow::bail!("Workbook not found: {}", workbook.display());
    }

    let sheets = ingest::read_workbook(&workbook)?;
    let progress = ProgressBar::new(sheets.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} sheets {msg}")?
            .progress_chars("=> "),
    );

    let mut ingestor = Ingestor::new(config.header_marker.as_str());
    for sheet in &sheets {
        progress.set_message(sheet.name.clone());
        ingestor.ingest_sheet(sheet);
        progress.inc(1);
    }
    progress.finish_and_clear();

    let report = ingestor.finish();
    storage::write_imported(&output, &report.records)?;
    println!(
        "Imported {} set(s) from {} row(s) in {} sheet(s) into {}",
        report.records.len(),
        report.rows,
        report.sheets,
        output.display()
    );

    print_issues(&report);
    let rejected = report.errors().count();
    if rejected > 0 {
        anyhow::bail!("{} row(s) or sheet(s) were rejected", rejected);
    }
    Ok(())
}

fn print_issues(report: &IngestReport) {
    if report.issues.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(["Sheet", "Row", "Severity", "Problem"]);
    for issue in &report.issues {
        let severity = if issue.problem.is_error() { "error" } else { "warning" };
        table.add_row([
            issue.sheet.clone(),
            issue
                .row
                .map(|r| r.to_string())
                .unwrap_or_else(|| "-".to_string()),
            severity.to_string(),
            issue.problem.to_string(),
        ]);
    }
    println!("── Issues ({}) ──────────────────────────", report.issues.len());
    println!("{}", table);
}

fn cmd_chart(config: &TrainlogConfig, exercise: &str, out_dir: Option<PathBuf>) -> Result<()> {
    let summary = load_summary(config)?;
    let history = dashboard::exercise_history(&summary, exercise);
    if history.is_empty() {
        anyhow::bail!("No data recorded for '{}'", exercise);
    }

    let out_dir = out_dir.unwrap_or_else(|| config.chart_dir.clone());
    storage::ensure_dir(&out_dir)?;
    let stem = file_stem(exercise);

    for metric in ChartMetric::ALL {
        match chart::render(metric, &history)? {
            Some(svg) => {
                let path = out_dir.join(format!("{}-{}.svg", stem, metric.slug()));
                std::fs::write(&path, svg)?;
                println!("  ✓ {}", path.display());
            }
            None => println!("  - {}: no data", metric.title()),
        }
    }
    Ok(())
}

async fn cmd_serve(config: &TrainlogConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut server = ServerConfig::from(config);
    if let Some(host) = host {
        server.host = host;
    }
    if let Some(port) = port {
        server.port = port;
    }

    println!("🏋️  trainlog dashboard");
    println!("   Store: {}", server.store_path.display());
    println!("   URL:   http://{}:{}/api", server.host, server.port);
    println!();

    serve(server).await
}

fn cmd_config(config: &TrainlogConfig, path: &Path, write: bool) -> Result<()> {
    if write {
        storage::save_yaml(path, config)?;
        println!("Wrote {}", path.display());
    } else {
        print!("{}", serde_yaml::to_string(config)?);
    }
    Ok(())
}

// ─── Utilities ────────────────────────────────────────────────────────────────

/// Two decimals, or "-" for undefined values.
fn format_value(value: f64) -> String {
    if value.is_finite() {
        format!("{:.2}", value)
    } else {
        "-".to_string()
    }
}

/// Lowercase, dash-separated file name stem for an exercise.
fn file_stem(name: &str) -> String {
    let stem = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if stem.is_empty() {
        "exercise".to_string()
    } else {
        stem
    }
}
