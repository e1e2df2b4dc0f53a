use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::Result;
use std::path::PathBuf;
use todolist::{Board, Config, Task, TaskStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todo")]
#[command(about = "Personal to-do list stored in a local SQLite database")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Path to a YAML config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides the config file)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a pending task
    Add {
        /// Task text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Show pending and completed tasks
    List {
        /// Print the lists as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark a pending task as done
    Done { id: i64 },

    /// Delete a completed task
    Rm { id: i64 },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database = database;
    }

    // Open store
    let mut store = TaskStore::open(&config.database, config.on_write_failure)?;
    let mut board = Board::load(&store)?;

    match cli.command {
        Commands::Add { text } => {
            let text = text.join(" ");
            if board.submit(&mut store, &text)?.is_none() {
                println!("{}", "Nothing added".yellow());
            }
            print_board(&board);
        }
        Commands::List { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(board.lists())?);
            } else {
                print_board(&board);
            }
        }
        Commands::Done { id } => {
            board.tap_pending(&mut store, id)?;
            print_board(&board);
        }
        Commands::Rm { id } => {
            board.tap_completed(&mut store, id)?;
            print_board(&board);
        }
    }

    Ok(())
}

fn print_board(board: &Board) {
    print_section("Todo", board.pending());
    println!();
    print_section("Completed", board.completed());
}

fn print_section(heading: &str, tasks: &[Task]) {
    println!("{}", heading.bold());
    if tasks.is_empty() {
        println!("  {}", "(none)".dimmed());
        return;
    }
    for task in tasks {
        println!("{}", format_row(task));
    }
}

fn format_row(task: &Task) -> String {
    let id = format!("#{:<4}", task.id);
    let date = task
        .created_on()
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| task.date.clone());

    if task.done {
        format!(
            "  {} {}  {}",
            id.dimmed(),
            task.value.dimmed().strikethrough(),
            date.dimmed()
        )
    } else {
        format!("  {} {}  {}", id.cyan(), task.value, date.dimmed())
    }
}
