//! Taskbox command-line entry point.
//!
//! # Responsibility
//! - Own the application state (`TaskStore`) for one command invocation.
//! - Translate subcommands into store operations and print the views.
//!
//! # Invariants
//! - `init_data` runs before any command touches the cache.
//! - Failures are printed as `error: ...` on stderr with exit status 1.

mod render;

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use taskbox_core::model::time_block::format_time;
use taskbox_core::service::backup::{read_backup_file, write_backup_file};
use taskbox_core::view::schedule::pickable_tasks;
use taskbox_core::{
    init_logging, parse_date, parse_time, AppConfig, CalendarMode, ConfigOverrides, InboxView,
    MatrixView, ScheduleView, TaskPatch, TaskStore,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "taskbox")]
#[command(about = "To-do inbox, Eisenhower matrix and calendar scheduler", version)]
struct Cli {
    /// Database file (overrides TASKBOX_DB_PATH)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// trace|debug|info|warn|error (overrides TASKBOX_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List active tasks; completed ones are collapsed
    Inbox {
        #[arg(long)]
        show_completed: bool,
    },
    /// Show active tasks by urgency and importance
    Matrix,
    /// Show the hourly calendar
    Schedule {
        #[arg(long, value_enum, default_value = "day")]
        mode: ModeArg,
        /// Anchor date, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// List categories
    Categories,
    /// Add a task
    Add {
        title: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Add a category
    AddCategory { name: String, color: String },
    /// Flip a task between active and completed
    Toggle { task_id: String },
    /// Change task fields
    Update {
        task_id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long)]
        clear_description: bool,
        #[arg(long, conflicts_with = "clear_category")]
        category: Option<String>,
        #[arg(long)]
        clear_category: bool,
        #[arg(long, action = clap::ArgAction::Set)]
        urgent: Option<bool>,
        #[arg(long, action = clap::ArgAction::Set)]
        important: Option<bool>,
        #[arg(long, action = clap::ArgAction::Set)]
        archived: Option<bool>,
    },
    /// Delete a task and its time blocks
    Delete { task_id: String },
    /// Put a task into a calendar slot, replacing whatever is there
    Assign {
        task_id: String,
        /// HH:MM
        #[arg(long)]
        time: String,
        /// YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove one time block
    Unassign { block_id: String },
    /// Write all data to a JSON file
    Export { path: PathBuf },
    /// Replace all data with a JSON backup
    Import { path: PathBuf },
    /// Delete all data
    Reset {
        /// Required confirmation
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Day,
    ThreeDay,
    Week,
}

impl From<ModeArg> for CalendarMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Day => CalendarMode::Day,
            ModeArg::ThreeDay => CalendarMode::ThreeDay,
            ModeArg::Week => CalendarMode::Week,
        }
    }
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Self::Inbox { .. } => "inbox",
            Self::Matrix => "matrix",
            Self::Schedule { .. } => "schedule",
            Self::Categories => "categories",
            Self::Add { .. } => "add",
            Self::AddCategory { .. } => "add-category",
            Self::Toggle { .. } => "toggle",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Assign { .. } => "assign",
            Self::Unassign { .. } => "unassign",
            Self::Export { .. } => "export",
            Self::Import { .. } => "import",
            Self::Reset { .. } => "reset",
        }
    }
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

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::resolve(ConfigOverrides {
        db_path: cli.db,
        log_level: cli.log_level,
        log_dir: None,
    })
    .context("invalid configuration")?;

    if let Err(err) = init_logging(&config) {
        eprintln!("warning: logging disabled: {err}");
    }

    let mut store = TaskStore::open(&config.db_path)
        .with_context(|| format!("cannot open database `{}`", config.db_path.display()))?;
    store.init_data().context("cannot load data")?;

    let command = cli.command.unwrap_or(Commands::Inbox {
        show_completed: false,
    });
    info!("event=cli_command module=cli status=start command={}", command.name());

    match command {
        Commands::Inbox { show_completed } => {
            let view = InboxView::build(store.tasks(), show_completed);
            print!("{}", render::inbox(&view, store.state()));
        }
        Commands::Matrix => {
            let view = MatrixView::build(store.tasks());
            print!("{}", render::matrix(&view, store.state()));
        }
        Commands::Schedule { mode, date } => {
            let anchor = date_or_today(date.as_deref())?;
            let view = ScheduleView::build(store.state(), mode.into(), anchor, config.grid);
            print!("{}", render::schedule(&view));
        }
        Commands::Categories => {
            print!("{}", render::categories(store.categories()));
        }
        Commands::Add { title, category } => {
            let category_id = category.as_deref().map(parse_id).transpose()?;
            match store.add_task(&title, category_id)? {
                Some(id) => println!("added {id}"),
                None => println!("nothing added: title is blank"),
            }
        }
        Commands::AddCategory { name, color } => {
            let id = store.add_category(&name, &color)?;
            println!("added category {id}");
        }
        Commands::Toggle { task_id } => {
            let id = parse_id(&task_id)?;
            let Some(believed) = store.task(id).map(|task| task.is_completed) else {
                bail!("task not found: {id}");
            };
            store.toggle_task_completion(id, believed)?;
            println!(
                "{id} is now {}",
                if believed { "active" } else { "completed" }
            );
        }
        Commands::Update {
            task_id,
            title,
            description,
            clear_description,
            category,
            clear_category,
            urgent,
            important,
            archived,
        } => {
            let id = parse_id(&task_id)?;
            let patch = TaskPatch {
                title,
                description: if clear_description {
                    Some(None)
                } else {
                    description.map(Some)
                },
                category_id: if clear_category {
                    Some(None)
                } else {
                    category.as_deref().map(parse_id).transpose()?.map(Some)
                },
                is_completed: None,
                is_archived: archived,
                is_urgent: urgent,
                is_important: important,
            };
            if patch.is_empty() {
                bail!("nothing to update");
            }
            store.update_task(id, &patch)?;
            println!("updated {id}");
        }
        Commands::Delete { task_id } => {
            let id = parse_id(&task_id)?;
            store.delete_task(id)?;
            println!("deleted {id}");
        }
        Commands::Assign {
            task_id,
            time,
            date,
        } => {
            let id = parse_id(&task_id)?;
            let date = date_or_today(date.as_deref())?;
            let time = parse_time(&time)?;
            if !pickable_tasks(store.tasks()).iter().any(|task| task.id == id) {
                bail!("task {id} is not an active task");
            }
            let block_id = store.assign_task_to_time(id, time, date)?;
            println!(
                "assigned {id} to {date} {} (block {block_id})",
                format_time(time)
            );
        }
        Commands::Unassign { block_id } => {
            let id = parse_id(&block_id)?;
            store.remove_from_schedule(id)?;
            println!("removed block {id}");
        }
        Commands::Export { path } => {
            let text = store.export_backup()?;
            write_backup_file(&path, &text)
                .with_context(|| format!("cannot write `{}`", path.display()))?;
            println!("exported to {}", path.display());
        }
        Commands::Import { path } => {
            let text = read_backup_file(&path)
                .with_context(|| format!("cannot read `{}`", path.display()))?;
            let state = store.import_backup(&text)?;
            println!(
                "imported {} tasks, {} categories, {} time blocks",
                state.tasks.len(),
                state.categories.len(),
                state.time_blocks.len()
            );
        }
        Commands::Reset { yes } => {
            if !yes {
                bail!("reset deletes all tasks and settings; pass --yes to confirm");
            }
            store.reset_all()?;
            println!("all data deleted");
        }
    }

    Ok(())
}

fn parse_id(value: &str) -> anyhow::Result<Uuid> {
    let trimmed = value.trim();
    Uuid::parse_str(trimmed).with_context(|| format!("invalid id `{trimmed}`"))
}

fn date_or_today(value: Option<&str>) -> anyhow::Result<NaiveDate> {
    match value {
        Some(raw) => Ok(parse_date(raw)?),
        None => Ok(Local::now().date_naive()),
    }
}
