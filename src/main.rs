use std::path::PathBuf;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use task_manager::commands::{self, DeleteTarget};
use task_manager::db::resolve_db_path;
use task_manager::export::ExportFormat;
use task_manager::model::{Priority, SortKey, Status, TaskChanges, TaskFilter};
use task_manager::{menu, Config, Database, ReminderLoop};

#[derive(Parser, Debug)]
#[command(name = "tm")]
#[command(author, version, about = "Personal task manager - track, filter and get reminded about your tasks")]
struct Cli {
    /// Path to the SQLite database (default: $TM_DB_PATH or ./tasks.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a new task
    Add {
        /// Task description
        description: String,

        /// Due date (e.g., today, tomorrow, next week, 2026-01-20)
        #[arg(long)]
        due: Option<String>,

        /// Task priority (default from config)
        #[arg(long, value_enum)]
        priority: Option<Priority>,

        /// Task category (e.g., work, personal)
        #[arg(long)]
        category: Option<String>,
    },

    /// List tasks
    List {
        /// Filter by priority
        #[arg(long, value_enum)]
        priority: Option<Priority>,

        /// Filter by category
        #[arg(long)]
        category: Option<String>,

        /// Filter by status
        #[arg(long, value_enum)]
        status: Option<Status>,

        /// Show only overdue tasks
        #[arg(long)]
        overdue: bool,

        /// Sort order
        #[arg(long, value_enum, default_value = "due_date")]
        sort: SortKey,
    },

    /// Update a task
    Update {
        /// Task ID
        id: i32,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New due date
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,

        /// Remove the due date
        #[arg(long)]
        clear_due: bool,

        /// New priority
        #[arg(long, value_enum)]
        priority: Option<Priority>,

        /// New category
        #[arg(long)]
        category: Option<String>,

        /// New status
        #[arg(long, value_enum)]
        status: Option<Status>,
    },

    /// Delete a task
    Delete {
        /// Task ID (or use --last)
        #[arg(required_unless_present = "last", conflicts_with = "last")]
        id: Option<i32>,

        /// Delete the last added task
        #[arg(long)]
        last: bool,
    },

    /// Search task descriptions
    Search {
        /// Keyword to search for
        keyword: String,
    },

    /// Show completion statistics
    Report,

    /// Export tasks to a file
    Export {
        /// Export format
        #[arg(long, value_enum, default_value = "json")]
        format: ExportFormat,

        /// Output filename (default: tasks_export_<timestamp>.<format>)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Import tasks from a JSON export
    Import {
        /// File to import from
        file: PathBuf,
    },

    /// Run the reminder loop until Ctrl+C
    Reminders,

    /// Create the database, optionally with sample tasks
    Init {
        /// Add a few example tasks
        #[arg(long)]
        sample: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("TM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load();
    let db_path = resolve_db_path(cli.db.as_deref());
    // Opened per command so completions never touch the database
    let open_db = || Database::open_with_config(&db_path, &config);

    let Some(command) = cli.command else {
        menu::run(&open_db()?, &config).await?;
        return Ok(());
    };

    match command {
        Command::Completion { shell } => {
            generate(shell, &mut Cli::command(), "tm", &mut std::io::stdout());
        }
        Command::Add { description, due, priority, category } => {
            commands::add(&open_db()?, &description, due.as_deref(), priority, category.as_deref())?;
        }
        Command::List { priority, category, status, overdue, sort } => {
            let filter = TaskFilter { priority, category, status, overdue };
            commands::list(&open_db()?, &filter, sort)?;
        }
        Command::Update { id, description, due, clear_due, priority, category, status } => {
            let due_date = if clear_due { Some(None) } else { due.map(Some) };
            let changes = TaskChanges { description, due_date, priority, category, status };
            commands::update(&open_db()?, id, &changes)?;
        }
        Command::Delete { id, last } => {
            let target = match id {
                Some(id) if !last => DeleteTarget::Id(id),
                _ => DeleteTarget::MostRecent,
            };
            commands::delete(&open_db()?, target)?;
        }
        Command::Search { keyword } => {
            commands::search(&open_db()?, &keyword)?;
        }
        Command::Report => {
            commands::report(&open_db()?)?;
        }
        Command::Export { format, file } => {
            commands::export(&open_db()?, format, file.as_deref())?;
        }
        Command::Import { file } => {
            commands::import(&open_db()?, &file)?;
        }
        Command::Reminders => {
            let mut reminders = ReminderLoop::console(open_db()?, config.reminder_period());
            reminders.start();
            println!("{}", "✓ Reminder system started".green());
            println!("Reminder system running. Press Ctrl+C to stop...");

            tokio::signal::ctrl_c().await?;
            reminders.stop().await;
            println!("\n{}", "Reminder system stopped".yellow());
        }
        Command::Init { sample } => {
            commands::init(&open_db()?, &db_path, sample)?;
        }
    }

    Ok(())
}
