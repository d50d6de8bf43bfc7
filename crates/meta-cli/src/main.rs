//! Command-line host for Metascript.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "meta",
    about = "Metascript: declarative entity scripts driven frame by frame",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse and bind a script, reporting diagnostics
    Check {
        /// Script file
        file: PathBuf,
    },

    /// Print a script in canonical layout
    Fmt {
        /// Script file
        file: PathBuf,

        /// Rewrite the file in place
        #[arg(short, long)]
        write: bool,

        /// Fail if the file is not already formatted
        #[arg(long, conflicts_with = "write")]
        check: bool,
    },

    /// Run a script headless and print the final entity state
    Run {
        /// Script file
        file: PathBuf,

        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u64,

        /// Seconds per frame (ignored with --realtime)
        #[arg(long, default_value = "0.016")]
        dt: f64,

        /// Initial velocity of Physics entities, as x,y,z
        #[arg(long, value_parser = commands::parse_vec3)]
        velocity: Option<meta_core::Vec3>,

        /// Engine configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Pace frames with the wall clock instead of a fixed dt
        #[arg(long)]
        realtime: bool,

        /// Print every frame
        #[arg(short, long)]
        verbose: bool,

        /// Print the final snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize component, event, and builtin usage across scripts
    Stats {
        /// Directory containing .meta files
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Entries to show per table
        #[arg(short, long, default_value = "5")]
        top: usize,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { file } => commands::check::run(&file),
        Commands::Fmt { file, write, check } => commands::fmt::run(&file, write, check),
        Commands::Run {
            file,
            frames,
            dt,
            velocity,
            config,
            realtime,
            verbose,
            json,
        } => commands::run::run(
            &file,
            &commands::run::RunOptions {
                frames,
                dt,
                velocity,
                config,
                realtime,
                verbose,
                json,
            },
        ),
        Commands::Stats { dir, top, json } => commands::stats::run(&dir, top, json),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
