//! Command-line front end for the task store.
//!
//! # Responsibility
//! - Map subcommands onto `TaskStore` operations.
//! - Warn about categories/priorities outside the configured lists without
//!   rejecting them.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use log::warn;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use taskpicker_core::{
    init_logging, init_logging_from_config, load_config, Task, TaskId, TaskStore, TrackerConfig,
};

#[derive(Parser)]
#[command(name = "taskpicker")]
#[command(version)]
#[command(about = "Track tasks and pick a random one to do next")]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, env = "TASKPICKER_CONFIG", default_value = "taskpicker.toml")]
    config: PathBuf,
    /// Database file; overrides `database_path` from the config
    #[arg(long, env = "TASKPICKER_DB")]
    db: Option<PathBuf>,
    /// Absolute directory for log files; overrides `log_dir` from the config
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Log level (trace|debug|info|warn|error)
    #[arg(long)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        name: String,
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        /// Deadline as YYYY-MM-DD
        #[arg(short, long, value_parser = parse_date)]
        deadline: Option<NaiveDate>,
    },
    /// List tasks, optionally filtered by category ("All" lists everything)
    List {
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Toggle completion of every task with this exact name
    Toggle { name: String },
    /// Toggle completion of a single task by id
    ToggleId { id: TaskId },
    /// Pick a random incomplete task
    Pick,
    /// Show task counts
    Stats,
    /// Show configured category filter choices
    Categories,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", error_report(err.as_ref()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = load_config(&cli.config)?;
    if let Some(db) = cli.db {
        config.database_path = db;
    }
    if let Some(level) = cli.log_level {
        config.log_level = Some(level);
    }
    match cli.log_dir {
        Some(dir) => {
            let level = config
                .log_level
                .as_deref()
                .unwrap_or(taskpicker_core::default_log_level());
            init_logging(level, &dir)?;
        }
        None => {
            init_logging_from_config(&config)?;
        }
    }

    if let Commands::Categories = cli.command {
        for option in config.category_filter_options() {
            println!("{option}");
        }
        return Ok(());
    }

    let store = TaskStore::open_with_config(&config)?;
    let result = execute(&store, &config, cli.command);
    store.close()?;
    result
}

fn execute(
    store: &TaskStore,
    config: &TrackerConfig,
    command: Commands,
) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Add {
            name,
            priority,
            category,
            deadline,
        } => {
            warn_unknown_labels(config, priority.as_deref(), category.as_deref());
            let task = store.add_task(&name, priority.as_deref(), category.as_deref(), deadline)?;
            println!("added #{}: {}", task.id, task.name);
        }
        Commands::List { category } => {
            let tasks = store.get_tasks(category.as_deref())?;
            print_tasks(&tasks);
        }
        Commands::Toggle { name } => {
            let completed = store.toggle_completion(&name)?;
            println!("{} {name}", status_glyph(completed));
        }
        Commands::ToggleId { id } => {
            let completed = store.toggle_completion_by_id(id)?;
            println!("{} #{id}", status_glyph(completed));
        }
        Commands::Pick => match store.pick_random_incomplete()? {
            Some(task) => println!("Selected Task: {}", task.name),
            None => println!("No tasks available!"),
        },
        Commands::Stats => {
            let stats = store.stats()?;
            println!(
                "total={} completed={} incomplete={}",
                stats.total,
                stats.completed,
                stats.incomplete()
            );
        }
        Commands::Categories => {}
    }
    Ok(())
}

/// Formats `err` followed by its `source()` chain, one cause per line.
fn error_report(err: &dyn Error) -> String {
    let mut report = format!("error: {err}");
    let mut cause = err.source();
    while let Some(inner) = cause {
        report.push_str(&format!("\n  caused by: {inner}"));
        cause = inner.source();
    }
    report
}

fn warn_unknown_labels(config: &TrackerConfig, priority: Option<&str>, category: Option<&str>) {
    if let Some(priority) = priority.filter(|p| !p.trim().is_empty()) {
        if !config.is_known_priority(priority) {
            eprintln!("warning: priority `{priority}` is not in the configured list");
            warn!("event=cli_add module=cli status=warn reason=unknown_priority");
        }
    }
    if let Some(category) = category.filter(|c| !c.trim().is_empty()) {
        if !config.is_known_category(category) {
            eprintln!("warning: category `{category}` is not in the configured list");
            warn!("event=cli_add module=cli status=warn reason=unknown_category");
        }
    }
}

fn print_tasks(tasks: &[Task]) {
    println!(
        "{:>4}  {:<30} {:<8} {:<10} {:<10} Status",
        "ID", "Task", "Priority", "Category", "Deadline"
    );
    for task in tasks {
        println!(
            "{:>4}  {:<30} {:<8} {:<10} {:<10} {}",
            task.id,
            task.name,
            task.priority.as_ref().map_or("", |p| p.as_str()),
            task.category.as_deref().unwrap_or(""),
            task.deadline
                .map(|date| date.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            status_glyph(task.completed)
        );
    }
}

fn status_glyph(completed: bool) -> &'static str {
    if completed {
        "✓"
    } else {
        "○"
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD, got `{value}`: {err}"))
}
