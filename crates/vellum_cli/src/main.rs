//! Vellum CLI
//!
//! Command-line access to a Vellum store.
//!
//! # Commands
//!
//! - `create`, `read`, `update`, `del` - Version chain operations
//! - `docs`, `history` - List documents and their versions
//! - `export`, `import` - Move a store's corpus through a framed file
//! - `replicate` - Copy every version into another store

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Vellum versioned document store.
#[derive(Parser)]
#[command(name = "vellum")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the store directory
    #[arg(global = true, short, long, env = "VELLUM_PATH")]
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One item per line
    Text,
    /// A JSON document
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a document and print the key of its first version
    Create {
        /// Document id
        doc: String,
        /// Value, or `-` to read it from stdin
        value: String,
    },

    /// Print the value stored under a version key
    Read {
        /// Version key
        key: String,
    },

    /// Append a version after KEY and print the new key
    Update {
        /// Parent version key
        key: String,
        /// Value, or `-` to read it from stdin
        value: String,
    },

    /// Delete a single version
    Del {
        /// Version key
        key: String,
    },

    /// List document ids
    Docs {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// List the version keys of a document
    History {
        /// Document id
        doc: String,
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Write every version to a framed file (`-` for stdout)
    Export {
        /// Output file
        file: PathBuf,
    },

    /// Apply every version from a framed file (`-` for stdin)
    Import {
        /// Input file
        file: PathBuf,
    },

    /// Copy every version into the store at TARGET
    Replicate {
        /// Target store directory, created if missing
        target: PathBuf,
    },

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so `read` and `export` can use stdout for data
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Version = cli.command {
        println!("Vellum CLI v{}", env!("CARGO_PKG_VERSION"));
        println!("Vellum Core v{}", vellum_core::VERSION);
        return Ok(());
    }

    let path = cli.path.ok_or("store path required (use --path or VELLUM_PATH)")?;
    let store = commands::open_store(&path).await?;

    match cli.command {
        Commands::Create { doc, value } => commands::crud::create(&store, doc, &value).await?,
        Commands::Read { key } => commands::crud::read(&store, key).await?,
        Commands::Update { key, value } => commands::crud::update(&store, key, &value).await?,
        Commands::Del { key } => commands::crud::del(&store, key).await?,
        Commands::Docs { format } => commands::query::docs(&store, format).await?,
        Commands::History { doc, format } => commands::query::history(&store, doc, format).await?,
        Commands::Export { file } => commands::transfer::export(&store, &file).await?,
        Commands::Import { file } => commands::transfer::import(&store, &file).await?,
        Commands::Replicate { target } => commands::transfer::replicate(&store, &target).await?,
        Commands::Version => {}
    }

    Ok(())
}
