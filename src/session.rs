//! The jiggler loop.
//!
//! `Session` owns the validated config, a `Pointer` backend and the stdout
//! sink for status lines. Lifecycle: `Idle` → `Running` → `Stopped`.
//!
//! Each iteration runs one pattern cycle, reports it, then sleeps on the
//! `StopSignal` for the configured interval. The loop ends when the
//! duration has elapsed (checked fresh at the top of every iteration) or
//! when a stop is requested. A cycle already in progress always completes.

use std::fmt;
use std::io::{self, Write};
use std::time::{Duration, Instant};

use chrono::Local;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::config::JigglerConfig;
use crate::platform::{PlatformError, Pointer};
use crate::signal::StopSignal;

/// Timestamp format for status lines and clock estimates.
const CLOCK_FORMAT: &str = "%H:%M:%S";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error("cannot write status output: {0}")]
    Output(#[from] io::Error),
    #[error("session was already started")]
    AlreadyStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Running,
    Stopped,
}

/// Why `run` returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    DurationReached,
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    pub jiggles: u64,
    pub elapsed: Duration,
    pub outcome: Outcome,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct Session<P, W> {
    config: JigglerConfig,
    pointer: P,
    out: W,
    stop_signal: StopSignal,
    rng: StdRng,
    state: SessionState,
    jiggle_count: u64,
    started_at: Option<Instant>,
}

impl<P: Pointer, W: Write> Session<P, W> {
    pub fn new(config: JigglerConfig, pointer: P, out: W, stop: StopSignal) -> Self {
        Session {
            config,
            pointer,
            out,
            stop_signal: stop,
            rng: StdRng::from_entropy(),
            state: SessionState::Idle,
            jiggle_count: 0,
            started_at: None,
        }
    }

    /// Time since `start`, or zero if the session never started.
    pub fn elapsed(&self) -> Duration {
        self.started_at
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// Transitions `Idle` → `Running` and prints the header.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::AlreadyStarted);
        }
        self.state = SessionState::Running;
        self.started_at = Some(Instant::now());
        log::debug!("session: started with {:?}", self.config);

        let interval = self.config.interval.as_secs_f64();
        let distance = self.config.distance;
        let pattern = self.config.pattern;
        self.status(format_args!("Mouse jiggler started"))?;
        self.status(format_args!(
            "   Interval: {interval}s | Distance: {distance}px | Pattern: {pattern}"
        ))?;
        match self.config.duration {
            Some(duration) => {
                let until = clock_after(duration);
                let total = HumanDuration(duration);
                self.status(format_args!("   Running until: {until} ({total})"))?;
            }
            None => self.status(format_args!(
                "   Running indefinitely (press Ctrl+C to stop)"
            ))?,
        }
        if self.config.verbose {
            writeln!(self.out)?;
        }
        Ok(())
    }

    /// Runs one pattern cycle from the current pointer position.
    ///
    /// The counter moves by exactly one per completed cycle.
    pub fn jiggle(&mut self) -> Result<(), SessionError> {
        let origin = self.pointer.position()?;
        let plan = self
            .config
            .pattern
            .plan(origin, self.config.distance, &mut self.rng);
        plan.execute(&self.pointer)?;
        self.jiggle_count += 1;
        log::debug!(
            "session: jiggle #{} from {origin} ({} moves)",
            self.jiggle_count,
            plan.steps().len()
        );
        Ok(())
    }

    /// Starts the session and loops until the duration elapses or a stop is
    /// requested.
    ///
    /// A pointer or output failure ends the session (`Stopped`) and is
    /// returned; nothing is retried.
    pub fn run(&mut self) -> Result<SessionSummary, SessionError> {
        let result = self.run_loop();
        if result.is_err() {
            self.state = SessionState::Stopped;
        }
        result
    }

    fn run_loop(&mut self) -> Result<SessionSummary, SessionError> {
        self.start()?;

        while self.state == SessionState::Running
            && !self.stop_signal.is_stop_requested()
            && !self.duration_reached()
        {
            self.jiggle()?;

            if self.config.verbose {
                let n = self.jiggle_count;
                let next = clock_after(self.config.interval);
                self.status(format_args!("Jiggle #{n} completed. Next jiggle at {next}"))?;
            }

            if self.stop_signal.wait_timeout(self.config.interval) {
                break;
            }
        }

        let outcome = if self.stop_signal.is_stop_requested() {
            self.stop()?;
            Outcome::Interrupted
        } else {
            self.state = SessionState::Stopped;
            let n = self.jiggle_count;
            self.status(format_args!("Duration reached. Completed {n} jiggles."))?;
            Outcome::DurationReached
        };

        Ok(SessionSummary {
            jiggles: self.jiggle_count,
            elapsed: self.elapsed(),
            outcome,
        })
    }

    /// Stops the session and prints the shutdown summary.
    ///
    /// Only the first call on a running session has any effect.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        self.stop_signal.request_stop();
        if self.state != SessionState::Running {
            return Ok(());
        }
        self.state = SessionState::Stopped;

        let n = self.jiggle_count;
        let secs = self.elapsed().as_secs_f64();
        log::debug!("session: stopped after {n} jiggles, {secs:.1}s");
        if self.config.verbose {
            writeln!(self.out)?;
        }
        self.status(format_args!("Mouse jiggler stopped. Completed {n} jiggles."))?;
        self.status(format_args!("   Total runtime: {secs:.1} seconds"))?;
        Ok(())
    }

    fn duration_reached(&self) -> bool {
        match (self.config.duration, self.started_at) {
            (Some(duration), Some(started)) => started.elapsed() >= duration,
            _ => false,
        }
    }

    /// Writes a timestamped status line when verbose.
    fn status(&mut self, message: fmt::Arguments<'_>) -> io::Result<()> {
        if !self.config.verbose {
            return Ok(());
        }
        let now = Local::now().format(CLOCK_FORMAT);
        writeln!(self.out, "[{now}] {message}")?;
        self.out.flush()
    }
}

#[cfg(test)]
impl<P, W> Session<P, W> {
    fn state(&self) -> SessionState {
        self.state
    }

    fn jiggle_count(&self) -> u64 {
        self.jiggle_count
    }

    fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    fn output(&self) -> &W {
        &self.out
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Wall-clock time `after` from now, as `HH:MM:SS`.
fn clock_after(after: Duration) -> String {
    chrono::Duration::from_std(after)
        .ok()
        .and_then(|delta| Local::now().checked_add_signed(delta))
        .map(|t| t.format(CLOCK_FORMAT).to_string())
        .unwrap_or_else(|| "--:--:--".to_string())
}

/// Whole minutes as minutes, anything else as seconds.
#[derive(Debug, Clone, Copy)]
struct HumanDuration(Duration);

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = self.0;
        let secs = d.as_secs();
        if d.subsec_nanos() != 0 || secs == 0 || secs % 60 != 0 {
            return write!(f, "{}s", d.as_secs_f64());
        }
        match secs / 60 {
            1 => write!(f, "1 minute"),
            minutes => write!(f, "{minutes} minutes"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
