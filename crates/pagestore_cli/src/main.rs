//! PageStore CLI
//!
//! Command-line tools for EEPROM images holding PageStore calibration data.
//!
//! # Commands
//!
//! - `init` - Create an erased image
//! - `inspect` - List every calibration slot and its state
//! - `verify` - Check that the image holds an intact calibration record
//! - `show` - Print the calibration record that would be loaded at boot
//! - `flag` - Change a calibration flag and save
//! - `import` - Replace the calibration record from JSON and save
//! - `erase` - Reset the calibration range to the erased state

mod commands;

use clap::{Parser, Subcommand};
use commands::flag::{FlagAction, FlagName};
use commands::OutputFormat;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// PageStore command-line image tools.
#[derive(Parser)]
#[command(name = "pagestore")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the EEPROM image file
    #[arg(global = true, short, long)]
    image: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an erased image
    Init {
        /// Image size in bytes
        #[arg(short, long, default_value_t = pagestore_calibration::EEPROM_SIZE as u64)]
        size: u64,
    },

    /// List every calibration slot and its state
    Inspect {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Check that the image holds an intact calibration record
    Verify,

    /// Print the calibration record that would be loaded at boot
    Show {
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Change a calibration flag and save
    Flag {
        /// Flag to change
        #[arg(value_enum)]
        name: FlagName,

        /// What to do with it
        #[arg(value_enum)]
        action: FlagAction,
    },

    /// Replace the calibration record from a JSON file and save
    Import {
        /// JSON file as printed by `show --format json`
        file: PathBuf,
    },

    /// Reset the calibration range to the erased state
    Erase,

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Init { size } => {
            let image = cli.image.ok_or("Image path required for init")?;
            commands::init::run(&image, size)?;
        }
        Commands::Inspect { format } => {
            let image = cli.image.ok_or("Image path required for inspect")?;
            commands::inspect::run(&image, format)?;
        }
        Commands::Verify => {
            let image = cli.image.ok_or("Image path required for verify")?;
            commands::verify::run(&image)?;
        }
        Commands::Show { format } => {
            let image = cli.image.ok_or("Image path required for show")?;
            commands::show::run(&image, format)?;
        }
        Commands::Flag { name, action } => {
            let image = cli.image.ok_or("Image path required for flag")?;
            commands::flag::run(&image, name, action)?;
        }
        Commands::Import { file } => {
            let image = cli.image.ok_or("Image path required for import")?;
            commands::import::run(&image, &file)?;
        }
        Commands::Erase => {
            let image = cli.image.ok_or("Image path required for erase")?;
            commands::erase::run(&image)?;
        }
        Commands::Version => {
            println!("PageStore CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("PageStore Core v{}", pagestore_core::VERSION);
        }
    }

    Ok(())
}
