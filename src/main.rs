#![forbid(unsafe_code)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

use skate_schedule::config::DEFAULT_CONFIG;
use skate_schedule::{build_cmd, check_cmd, disk_cmd};

#[derive(Parser, Debug)]
#[command(name = "skate-schedule")]
#[command(about = "Build the running order, timing and printed program for a skating show", long_about = None)]
struct Cli {
    /// Enable verbose logging (or set SKATE_SCHEDULE_LOG)
    #[arg(long)]
    verbose: bool,

    /// Show configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the whole pipeline and write every report
    Build {
        /// Override the show start time (HH:MM or HH:MM:SS)
        #[arg(long)]
        start: Option<String>,
        /// Keep registered lengths instead of reading them from the music
        #[arg(long)]
        skip_music: bool,
        /// Write program.tex but do not run the typesetter
        #[arg(long)]
        skip_typeset: bool,
    },

    /// Print warnings and the timed schedule without writing files
    Check {
        /// Override the show start time (HH:MM or HH:MM:SS)
        #[arg(long)]
        start: Option<String>,
        /// Exit non-zero if ingestion produced any warnings
        #[arg(long)]
        strict: bool,
    },

    /// Copy cached music into music_ordered/ in running order
    Disk {
        /// Do not write track numbers into the copies
        #[arg(long)]
        no_tags: bool,
    },
}

fn init_tracing(verbose: bool) {
    let env = std::env::var("SKATE_SCHEDULE_LOG").unwrap_or_else(|_| {
        if verbose { "skate_schedule=debug".to_string() } else { "skate_schedule=info".to_string() }
    });
    let _ = tracing_subscriber::fmt()
        .with_span_events(FmtSpan::ACTIVE)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Build { start, skip_music, skip_typeset } => {
            build_cmd::run(cli.config, start, skip_music, skip_typeset)
        }
        Commands::Check { start, strict } => check_cmd::run(cli.config, start, strict),
        Commands::Disk { no_tags } => disk_cmd::run(cli.config, no_tags),
    };

    if let Err(e) = result {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
