//! cafkit CLI - Command-line interface for Core Audio Format files
//!
//! This binary inspects the header and chunk layout of CAF files and creates
//! silent files in any supported sample format.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use cafkit_cli::commands;

/// cafkit - Core Audio Format container tool
#[derive(Parser)]
#[command(name = "cafkit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log header parsing at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stream summary of a CAF file
    Info {
        /// Path to the CAF file
        file: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,

        /// Include the BLAKE3 digest of the sample data
        #[arg(long)]
        hash: bool,
    },

    /// List every chunk with its offset and declared size
    Chunks {
        /// Path to the CAF file
        file: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Print the header parse log
    Log {
        /// Path to the CAF file
        file: String,
    },

    /// Create a CAF file of silent frames
    Create {
        /// Output path
        file: String,

        /// Sample format (see `cafkit formats`)
        #[arg(short, long, default_value = "pcm16")]
        format: String,

        /// Number of channels
        #[arg(short, long, default_value_t = 2)]
        channels: u32,

        /// Sample rate in Hz
        #[arg(short, long, default_value_t = 44100)]
        rate: u32,

        /// Number of frames to write
        #[arg(short = 'n', long, default_value_t = 0)]
        frames: u64,

        /// Byte order (file, little, big, cpu)
        #[arg(long, default_value = "file")]
        endian: String,
    },

    /// List supported sample formats
    Formats,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Info { file, json, hash } => commands::info::run(&file, json, hash),
        Commands::Chunks { file, json } => commands::chunks::run(&file, json),
        Commands::Log { file } => commands::log::run(&file),
        Commands::Create {
            file,
            format,
            channels,
            rate,
            frames,
            endian,
        } => commands::create::run(&commands::create::CreateOptions {
            path: &file,
            format: &format,
            channels,
            sample_rate: rate,
            frames,
            endian: &endian,
        }),
        Commands::Formats => commands::formats::run(),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
