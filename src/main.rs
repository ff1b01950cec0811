//! jiggler -- keeps the computer awake by nudging the mouse pointer.
//!
//! Entry point: argument parsing, config layering, signal handling and the
//! session lifecycle. Exit status is 0 on normal completion or interrupt and
//! 1 on invalid arguments or a fatal platform error.

mod config;
mod pattern;
mod platform;
mod session;
mod signal;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;

use config::{JigglerConfig, Options};
use pattern::Pattern;
use session::Session;
use signal::StopSignal;

const EXAMPLES: &str = "\
Examples:
  jiggler                          # Run with defaults (60s interval, gentle pattern)
  jiggler -i 30                    # Jiggle every 30 seconds
  jiggler -i 120 -d 5              # Jiggle every 2 minutes, move 5 pixels
  jiggler -i 60 -t 30              # Run for 30 minutes then stop
  jiggler -p circular -i 45        # Use circular pattern every 45 seconds
  jiggler -p random -i 90 -q       # Random pattern, quiet mode";

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "jiggler",
    about = "Mouse jiggler - keep your computer awake by moving the mouse",
    version,
    after_help = EXAMPLES
)]
struct Cli {
    /// Seconds between each jiggle [default: 60]
    #[arg(short, long, value_name = "SECONDS", allow_negative_numbers = true)]
    interval: Option<i64>,

    /// Pixels to move the mouse [default: 1]
    #[arg(short, long, value_name = "PIXELS", allow_negative_numbers = true)]
    distance: Option<i64>,

    /// Total duration in minutes [default: run indefinitely]
    #[arg(short = 't', long = "time", value_name = "MINUTES", allow_negative_numbers = true)]
    time: Option<i64>,

    /// Movement pattern [default: gentle]
    #[arg(short, long, value_enum)]
    pattern: Option<Pattern>,

    /// Quiet mode - suppress status messages
    #[arg(short, long)]
    quiet: bool,

    /// Print status messages even if the config file sets `quiet = true`
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Read settings from a TOML file; flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            interval: self.interval,
            distance: self.distance,
            time: self.time,
            pattern: self.pattern,
            quiet: match (self.quiet, self.verbose) {
                (true, _) => Some(true),
                (false, true) => Some(false),
                (false, false) => None,
            },
        }
    }

    /// Merges flags over the optional config file and validates.
    fn resolve(&self) -> Result<JigglerConfig, config::ConfigError> {
        let file = match &self.config {
            Some(path) => config::load_options(path)?,
            None => Options::default(),
        };
        JigglerConfig::from_options(self.options().or(file))
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let stop = StopSignal::new();
    if let Err(e) = signal::install_interrupt_handler(&stop) {
        eprintln!("Error: cannot install interrupt handler: {e}");
        return ExitCode::FAILURE;
    }

    let pointer = match platform::create_pointer() {
        Ok(pointer) => pointer,
        Err(e) => {
            log::debug!("main: pointer backend unavailable: {e:?}");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut session = Session::new(config, pointer, io::stdout(), stop);
    match session.run() {
        Ok(summary) => {
            log::info!(
                "main: session ended ({:?}) after {} jiggles in {:.1}s",
                summary.outcome,
                summary.jiggles,
                summary.elapsed.as_secs_f64()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
