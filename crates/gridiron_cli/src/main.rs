//! Gridiron CLI
//!
//! Simulates games from JSON requests and writes persistence records.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use gridiron_cli::{RecordFormat, RecordMetadata};
#[cfg(feature = "cli")]
use log::{info, warn};
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "gridiron")]
#[command(about = "Simulate American football games from JSON requests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Simulate one game
    Simulate {
        /// Input game request (JSON)
        #[arg(long)]
        r#in: PathBuf,

        /// Output record path
        #[arg(long)]
        out: PathBuf,

        #[arg(long, value_enum, default_value = "json")]
        format: RecordFormat,

        /// Include the full event log in the record
        #[arg(long, default_value = "false")]
        events: bool,

        /// Verify the written record against its checksum
        #[arg(long, default_value = "false")]
        verify: bool,
    },

    /// Simulate a slate of games in parallel
    Slate {
        /// Input JSON array of game requests
        #[arg(long)]
        r#in: PathBuf,

        /// Directory for the records (game_<n>.<ext>)
        #[arg(long)]
        out_dir: PathBuf,

        #[arg(long, value_enum, default_value = "packed")]
        format: RecordFormat,
    },

    /// Print the JSON Schema of the game record
    Schema {
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate { r#in, out, format, events, verify } => {
            info!("simulating {}", r#in.display());
            let record = gridiron_cli::simulate_file(&r#in, events)?;
            let meta = gridiron_cli::write_record(&record, &out, format)?;
            print_summary(&record, &meta, &out);
            if verify {
                verify_record(&out, &meta.checksum)?;
            }
        }

        Commands::Slate { r#in, out_dir, format } => {
            let setups = gridiron_cli::load_slate(&r#in)?;
            info!("simulating slate of {} games from {}", setups.len(), r#in.display());
            let results = gridiron_core::simulate_slate(setups);
            let mut failed = 0;
            for (n, result) in results.into_iter().enumerate() {
                match result {
                    Ok(record) => {
                        let out = out_dir.join(format!("game_{n}.{}", format.extension()));
                        let meta = gridiron_cli::write_record(&record, &out, format)?;
                        print_summary(&record, &meta, &out);
                    }
                    Err(err) => {
                        failed += 1;
                        warn!("game {n} failed: {err}");
                    }
                }
            }
            if failed > 0 {
                anyhow::bail!("{failed} game(s) in the slate failed");
            }
        }

        Commands::Schema { out } => {
            let schema = gridiron_core::game_record_schema_json().map_err(anyhow::Error::msg)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, schema)
                        .with_context(|| format!("Failed to write schema: {}", path.display()))?;
                    info!("schema written to {}", path.display());
                }
                None => println!("{schema}"),
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_summary(record: &gridiron_core::GameRecord, meta: &RecordMetadata, out: &std::path::Path) {
    let score = record.final_state.score;
    println!(
        "{} {} - {} {} ({} drives, {} plays)",
        record.home.name,
        score.home,
        score.away,
        record.away.name,
        record.total_drives(),
        record.final_state.play_index
    );
    println!("   Record:      {} ({:?})", out.display(), meta.format);
    println!(
        "   Size:        {} bytes ({:.1}% of JSON)",
        meta.written_size,
        meta.compression_ratio() * 100.0
    );
    println!("   Checksum:    {}", meta.checksum);
    println!("   Fingerprint: {}", meta.fingerprint);
}

#[cfg(feature = "cli")]
fn verify_record(path: &std::path::Path, checksum: &str) -> Result<()> {
    if gridiron_cli::verify_record(path, checksum)? {
        info!("record verification passed");
        Ok(())
    } else {
        anyhow::bail!("record verification failed - checksum mismatch")
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("gridiron CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
