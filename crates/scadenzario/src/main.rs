use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

mod board;
mod config;
mod db;
mod html;
mod kv;
mod server;
mod store;
mod types;
mod urgency;

use board::Board;
use config::{Backend, Settings};
use kv::{FileStore, KeyValueStore, MemoryStore, SqliteStore};
use server::{AppState, DynStore};
use types::{AssignmentDraft, Priority};

#[derive(Parser, Debug)]
#[command(name = "scadenzario")]
#[command(about = "Track homework assignments by due date and get urgency reminders")]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Database file (sqlite backend) or directory (file backend)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Storage backend
    #[arg(long, value_enum, global = true)]
    backend: Option<Backend>,

    /// Classify against this day (YYYY-MM-DD) instead of the local clock
    #[arg(long, global = true)]
    today: Option<NaiveDate>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Add a new assignment
    Add {
        /// Assignment title
        title: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: String,

        #[arg(long, default_value = "")]
        subject: String,

        /// high, medium or low
        #[arg(long, default_value = "medium")]
        priority: Priority,

        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List pending assignments by due date, then completed ones
    List,

    /// Mark an assignment complete, or pending again
    Toggle { id: String },

    /// Delete an assignment
    Remove { id: String },

    /// Print the reminder summary
    Remind,

    /// Generate static HTML (no server)
    Build {
        /// Output directory for index.html
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

/// `RUST_LOG` wins as given; otherwise `--log-level` with hyper quieted
fn log_filter(log_level: &str) -> Result<EnvFilter> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(log_level).add_directive("hyper=warn".parse()?),
    };
    Ok(filter)
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = log_filter(log_level)?;

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_max_level(Level::TRACE)
        .init();
    Ok(())
}

fn open_store(settings: &Settings) -> Result<DynStore> {
    let kv: Box<dyn KeyValueStore + Send> = match settings.backend {
        Backend::Sqlite => Box::new(SqliteStore::open(&settings.db_path).with_context(|| {
            format!("Failed to open database at {}", settings.db_path.display())
        })?),
        Backend::File => Box::new(FileStore::open(&settings.db_path).with_context(|| {
            format!("Failed to open store directory {}", settings.db_path.display())
        })?),
        Backend::Memory => Box::new(MemoryStore::new()),
    };

    let store = store::AssignmentStore::open(kv).context("Failed to load assignments")?;
    info!(
        backend = ?settings.backend,
        path = %settings.db_path.display(),
        count = store.len(),
        "Store opened"
    );
    Ok(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level)?;

    let mut settings = Settings::from_env()?;
    if let Some(db) = args.db {
        settings.db_path = db;
    }
    if let Some(backend) = args.backend {
        settings.backend = backend;
    }
    if args.today.is_some() {
        settings.today = args.today;
    }

    let mut store = open_store(&settings)?;
    let today = settings.today();

    match args.command {
        // Default to serve if no command specified
        None => {
            let state = Arc::new(AppState::new(store, settings.today));
            server::serve(settings.port, state).await?;
        }
        Some(Commands::Serve { port }) => {
            let state = Arc::new(AppState::new(store, settings.today));
            server::serve(port.unwrap_or(settings.port), state).await?;
        }
        Some(Commands::Add {
            title,
            due,
            subject,
            priority,
            notes,
        }) => {
            let draft = AssignmentDraft::new(&title, &due)
                .with_subject(&subject)
                .with_priority(priority)
                .with_notes(&notes);
            let assignment = store.add(draft)?;
            println!("{}", assignment.id);
        }
        Some(Commands::List) => {
            let board = Board::build(store.list(), today);
            for item in board.pending.iter().chain(&board.completed) {
                let a = item.assignment;
                println!(
                    "{}  {}  {:<14} [{}] {}{}",
                    a.id,
                    html::format_date(a.due_date),
                    item.urgency.label,
                    a.priority,
                    a.title,
                    if a.subject.is_empty() {
                        String::new()
                    } else {
                        format!(" ({})", a.subject)
                    }
                );
            }
            println!("{}", board.summary);
        }
        Some(Commands::Toggle { id }) => {
            if !store.toggle_complete(&id)? {
                info!(id = %id, "No assignment with that id");
            }
        }
        Some(Commands::Remove { id }) => {
            if !store.remove(&id)? {
                info!(id = %id, "No assignment with that id");
            }
        }
        Some(Commands::Remind) => {
            println!("{}", urgency::summarize(store.list(), today));
        }
        Some(Commands::Build { output }) => {
            let board = Board::build(store.list(), today);
            let html_path = output.join("index.html");
            html::generate_html(&board, today, &html_path)?;
            info!(path = %html_path.display(), "HTML saved");
        }
    }

    Ok(())
}
