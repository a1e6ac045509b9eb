use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use tasklist::jsonl;
use tasklist::{Config, FilterMode, KeyValueStore, MemoryKv, Priority, SqliteKv, Store, Task, TaskId};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tasklist")]
#[command(about = "Tasklist CLI - add, complete, reprioritize, filter and delete tasks")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding the task database (overrides config)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Path to a YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Start with the last stored filter mode active
    #[arg(long)]
    restore_filter: bool,

    /// Keep tasks in memory only; nothing is written to disk
    #[arg(long)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        /// Task text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Task priority (default from config)
        #[arg(short, long, value_enum)]
        priority: Option<PriorityArg>,
    },

    /// Show tasks under the active filter
    List {
        /// Switch to this filter first
        #[arg(short, long, value_enum)]
        filter: Option<FilterArg>,
    },

    /// Set the active filter mode
    Filter {
        #[arg(value_enum)]
        mode: FilterArg,
    },

    /// Toggle a task between pending and complete
    Done { id: TaskId },

    /// Toggle a task between Low and High priority
    Priority { id: TaskId },

    /// Delete a task
    Delete { id: TaskId },

    /// Delete every task
    Clear,

    /// Write all tasks to a JSONL file
    Export { path: PathBuf },

    /// Replace all tasks with the contents of a JSONL file
    Import { path: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum PriorityArg {
    Low,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Priority::Low,
            PriorityArg::High => Priority::High,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FilterArg {
    All,
    Completed,
    Pending,
    Priority,
}

impl From<FilterArg> for FilterMode {
    fn from(arg: FilterArg) -> Self {
        match arg {
            FilterArg::All => FilterMode::All,
            FilterArg::Completed => FilterMode::Completed,
            FilterArg::Pending => FilterMode::Pending,
            FilterArg::Priority => FilterMode::Priority,
        }
    }
}

fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    if cli.restore_filter {
        config.restore_filter = true;
    }

    let kv = open_kv(&config, cli.ephemeral);
    let mut store = Store::open_with(kv, config.store_options());

    match cli.command {
        Commands::Add { text, priority } => {
            let priority = priority.map(Priority::from).unwrap_or(config.default_priority);
            if let Some(id) = store.add(&text.join(" "), priority) {
                println!("{}", format!("Added task #{}", id).green());
            }
        }
        Commands::List { filter } => {
            if let Some(mode) = filter {
                store.set_filter(mode.into());
            }
        }
        Commands::Filter { mode } => {
            store.set_filter(mode.into());
        }
        Commands::Done { id } => {
            if !store.toggle_complete(id) {
                report_missing(id);
            }
        }
        Commands::Priority { id } => {
            if !store.toggle_priority(id) {
                report_missing(id);
            }
        }
        Commands::Delete { id } => {
            if store.delete(id) {
                println!("Deleted task #{}", id);
            } else {
                report_missing(id);
            }
        }
        Commands::Clear => {
            store.clear();
        }
        Commands::Export { path } => {
            let count = jsonl::export_jsonl(&path, store.tasks())?;
            println!("Exported {} tasks to {}", count, path.display());
        }
        Commands::Import { path } => {
            let tasks = jsonl::read_jsonl(&path)?;
            let count = tasks.len();
            if store.replace_all(tasks) {
                println!("Imported {} tasks from {}", count, path.display());
            }
        }
    }

    render(&store);

    Ok(())
}

/// Durable SQLite store, or memory when asked for or when it cannot be opened
fn open_kv(config: &Config, ephemeral: bool) -> Box<dyn KeyValueStore> {
    if ephemeral {
        return Box::new(MemoryKv::new());
    }

    match SqliteKv::open(&config.data_dir) {
        Ok(kv) => Box::new(kv),
        Err(e) => {
            warn!(dir = ?config.data_dir, error = ?e, "Task database unavailable, changes will not be saved");
            Box::new(MemoryKv::new())
        }
    }
}

fn report_missing(id: TaskId) {
    println!("{}", format!("No task #{}", id).yellow());
}

fn render<K: KeyValueStore>(store: &Store<K>) {
    let tasks = store.view();

    println!();
    println!("{} {}", "TASK LIST".bold(), format!("[{}]", store.filter()).dimmed());

    if tasks.is_empty() {
        println!("{}", "  (no tasks)".dimmed());
        return;
    }

    for task in tasks {
        println!("{}", render_task(task));
    }
}

fn render_task(task: &Task) -> String {
    let status = if task.completed {
        "Complete".green()
    } else {
        "Pending ".blue()
    };

    let priority = match task.priority {
        Priority::High => "High".red().bold(),
        Priority::Low => "Low ".normal(),
    };

    let text = if task.completed {
        task.text.strikethrough()
    } else {
        task.text.normal()
    };

    format!(
        "  {:>4}  {}  {}  {}  {}",
        format!("#{}", task.id),
        status,
        priority,
        text,
        task.created_at.dimmed()
    )
}
