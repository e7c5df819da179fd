//! `sealer` binary entry point.
//!
//! Startup sequence:
//! 1. Parse the command line.
//! 2. Load and validate [`Config`] from environment variables.
//! 3. Initialise structured logging.
//! 4. Build the [`RecordStore`] and run the requested command.
//!
//! Failures exit with the code from [`SealError::exit_code`].

use std::io::{Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};

use common::SealError;
use sealer::config::Config;
use sealer::record::RecordStore;
use sealer::telemetry;

/// Exit code for a configuration that could not be loaded (sysexits `EX_CONFIG`).
const EXIT_CONFIG: u8 = 78;

#[derive(Debug, Parser)]
#[command(name = "sealer", version, about = "Seal and open text records at rest")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store plaintext at RECORD, sealed when ENCRYPTION_ENABLED is set.
    Seal {
        record: PathBuf,
        /// Read plaintext from this file instead of stdin.
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
    /// Print the plaintext of RECORD to stdout.
    Open { record: PathBuf },
}

fn main() -> ExitCode {
    // -----------------------------------------------------------------------
    // 1. Command line
    // -----------------------------------------------------------------------
    let cli = Cli::parse();

    // -----------------------------------------------------------------------
    // 2. Configuration
    // -----------------------------------------------------------------------
    let cfg = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            // Telemetry is not yet up; write to stderr directly.
            eprintln!("ERROR: configuration invalid: {e:#}");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    // -----------------------------------------------------------------------
    // 3. Telemetry
    // -----------------------------------------------------------------------
    if let Err(e) = telemetry::init_telemetry(&cfg.log_level) {
        eprintln!("ERROR: {e:#}");
        return ExitCode::FAILURE;
    }
    info!(
        version = env!("CARGO_PKG_VERSION"),
        encryption_enabled = cfg.encryption_enabled,
        "sealer starting"
    );

    // -----------------------------------------------------------------------
    // 4. Command
    // -----------------------------------------------------------------------
    match run(cli.command, &cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, exit_code = e.exit_code(), "command failed");
            eprintln!("ERROR: {e}");
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

fn run(command: Command, cfg: &Config) -> Result<(), SealError> {
    let sealing = cfg.sealing()?;
    match command {
        Command::Seal { record, input } => {
            let text = match input {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            RecordStore::new(record, sealing).save(&text)
        }
        Command::Open { record } => {
            let store = RecordStore::new(record, sealing);
            let text = store.load()?.unwrap_or_default();
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}
