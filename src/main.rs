use std::fs;
use std::io::{self, Write};
use std::sync::Mutex;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};

use fretpad::store::{RestoreOutcome, Store, TabBook, UserPrompt, export_filename};
use fretpad::{config, share, tui};

#[derive(Parser)]
#[command(name = "fretpad", version = env!("FRETPAD_VERSION"), about = "Edit and collect guitar tabs in your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the tab editor (default)
    Edit,
    /// Initialize the fretpad config directory and database
    Init,
    /// List saved tabs
    List,
    /// Print one saved tab
    Show {
        /// Record id (see `fretpad list`)
        id: i64,
    },
    /// Search saved tabs by title
    Search {
        /// Case-insensitive substring to match against titles
        query: String,
    },
    /// Delete one saved tab
    Delete {
        /// Record id (see `fretpad list`)
        id: i64,
    },
    /// Export all saved tabs as a JSON backup
    Export {
        /// Output path (default: easy-guitar-tabs-<date>.json)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Replace all saved tabs from a JSON backup (asks for confirmation)
    Restore {
        /// Path to a backup written by `export`
        file: String,
    },
    /// Copy a share summary of your tabs to the clipboard
    Share,
}

/// Notification and confirmation over stderr/stdin for CLI restores.
struct StdinPrompt;

impl UserPrompt for StdinPrompt {
    fn notify(&mut self, message: &str) {
        println!("{message}");
    }

    fn confirm(&mut self, message: &str) -> bool {
        print!("{message} [y/N] ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if io::stdin().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim(), "y" | "Y" | "yes")
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Edit) {
        Commands::Init => {
            config::ensure_dirs()?;
            let store = Store::open()?;
            store.migrate()?;
            println!("fretpad initialized at ~/.fretpad/");
            Ok(())
        }
        Commands::List => {
            let book = open_book()?;
            if book.is_empty() {
                println!("No saved tabs. Run `fretpad` to write your first one.");
            } else {
                for record in book.records() {
                    println!("  {}  ({})  id {}", record.title, record.date, record.id);
                }
            }
            Ok(())
        }
        Commands::Show { id } => {
            let book = open_book()?;
            let record = book.get(id).with_context(|| format!("no tab with id {id}"))?;
            println!("{} ({})", record.title, record.date);
            println!();
            println!("{}", record.tab);
            Ok(())
        }
        Commands::Search { query } => {
            let book = open_book()?;
            let mut found = false;
            for record in book.search(&query) {
                found = true;
                println!("  {}  ({})  id {}", record.title, record.date, record.id);
            }
            if !found {
                println!("No tabs matching '{query}'.");
            }
            Ok(())
        }
        Commands::Delete { id } => {
            let (store, mut book) = open_store_and_book()?;
            if book.delete(id) {
                store.persist_tabs(&book)?;
                println!("Deleted tab {id}");
            } else {
                println!("No tab with id {id}");
            }
            Ok(())
        }
        Commands::Export { output } => {
            let book = open_book()?;
            let json = book.export_json()?;
            let path = output.unwrap_or_else(|| export_filename(Local::now()));
            fs::write(&path, json).with_context(|| format!("failed to write {path}"))?;
            println!("Exported {} tabs to {path}", book.len());
            Ok(())
        }
        Commands::Restore { file } => {
            let (store, mut book) = open_store_and_book()?;
            let text =
                fs::read_to_string(&file).with_context(|| format!("failed to read {file}"))?;
            match book.restore_with_prompt(&text, &mut StdinPrompt)? {
                RestoreOutcome::Replaced(count) => {
                    store.persist_tabs(&book)?;
                    println!("Restored {count} tabs.");
                }
                RestoreOutcome::Declined => println!("Restore cancelled."),
            }
            Ok(())
        }
        Commands::Share => {
            let book = open_book()?;
            let text = share::summary(&book);
            match share::copy_to_clipboard(&text) {
                Ok(()) => println!("Share text copied to clipboard."),
                Err(_) => println!("{text}"),
            }
            Ok(())
        }
        Commands::Edit => {
            config::ensure_dirs()?;
            init_logging()?;
            let store = Store::open()?;
            store.migrate()?;
            let cfg = config::load()?;
            tui::run(store, cfg)
        }
    }
}

fn open_book() -> Result<TabBook> {
    Ok(open_store_and_book()?.1)
}

fn open_store_and_book() -> Result<(Store, TabBook)> {
    config::ensure_dirs()?;
    let store = Store::open()?;
    store.migrate()?;
    let book = store.load_tabs()?;
    Ok((store, book))
}

/// Log to ~/.fretpad/fretpad.log; the terminal belongs to the TUI.
fn init_logging() -> Result<()> {
    let path = config::log_path()?;
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .init();
    Ok(())
}
