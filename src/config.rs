//! Session configuration.
//!
//! Settings come from three layers, highest precedence first: command-line
//! flags, an optional TOML file, built-in defaults. Each layer produces
//! `Options` (every field optional); the merged result is validated once by
//! `JigglerConfig::from_options`.
//!
//! Example file:
//!
//! ```toml
//! interval = 30      # seconds between jiggles
//! distance = 2       # pixels
//! time = 45          # minutes; omit to run indefinitely
//! pattern = "circular"
//! quiet = false
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::pattern::Pattern;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_INTERVAL_SECS: i64 = 60;
pub const DEFAULT_DISTANCE_PX: i64 = 1;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Interval must be at least 1 second")]
    InvalidInterval,
    #[error("Distance must be at least 1 pixel")]
    InvalidDistance,
    #[error("Duration must be at least 1 minute")]
    InvalidDuration,
    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ---------------------------------------------------------------------------
// Raw options
// ---------------------------------------------------------------------------

/// Unvalidated settings from a single layer. Integers are signed so that
/// negative input reaches validation and is rejected with a clear message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub interval: Option<i64>,
    pub distance: Option<i64>,
    pub time: Option<i64>,
    pub pattern: Option<Pattern>,
    pub quiet: Option<bool>,
}

impl Options {
    /// Fills every unset field of `self` from `lower`.
    pub fn or(self, lower: Options) -> Options {
        Options {
            interval: self.interval.or(lower.interval),
            distance: self.distance.or(lower.distance),
            time: self.time.or(lower.time),
            pattern: self.pattern.or(lower.pattern),
            quiet: self.quiet.or(lower.quiet),
        }
    }
}

/// On-disk representation of the config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileOptions {
    interval: Option<i64>,
    distance: Option<i64>,
    time: Option<i64>,
    pattern: Option<String>,
    quiet: Option<bool>,
}

impl From<FileOptions> for Options {
    fn from(file: FileOptions) -> Self {
        Options {
            interval: file.interval,
            distance: file.distance,
            time: file.time,
            pattern: file.pattern.as_deref().map(Pattern::from_name),
            quiet: file.quiet,
        }
    }
}

/// Parses TOML config text.
pub fn parse_options(text: &str, path: &Path) -> Result<Options, ConfigError> {
    let file: FileOptions = toml::from_str(text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.into())
}

/// Reads and parses the config file at `path`.
pub fn load_options(path: &Path) -> Result<Options, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let options = parse_options(&text, path)?;
    log::debug!("config: loaded {}: {options:?}", path.display());
    Ok(options)
}

// ---------------------------------------------------------------------------
// Validated config
// ---------------------------------------------------------------------------

/// Validated session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JigglerConfig {
    /// Time between the end of one cycle and the start of the next.
    pub interval: Duration,
    /// Perturbation magnitude in pixels.
    pub distance: u32,
    /// Total run length; `None` runs until interrupted.
    pub duration: Option<Duration>,
    pub pattern: Pattern,
    /// Print timestamped status lines to stdout.
    pub verbose: bool,
}

impl Default for JigglerConfig {
    fn default() -> Self {
        JigglerConfig {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS as u64),
            distance: DEFAULT_DISTANCE_PX as u32,
            duration: None,
            pattern: Pattern::default(),
            verbose: true,
        }
    }
}

impl JigglerConfig {
    /// Applies defaults to unset fields and validates the result.
    ///
    /// `interval`, `distance` and (when given) `time` must all be at least 1.
    pub fn from_options(options: Options) -> Result<Self, ConfigError> {
        let interval = options.interval.unwrap_or(DEFAULT_INTERVAL_SECS);
        let interval = u64::try_from(interval)
            .ok()
            .filter(|&secs| secs >= 1)
            .ok_or(ConfigError::InvalidInterval)?;

        let distance = options.distance.unwrap_or(DEFAULT_DISTANCE_PX);
        let distance = u32::try_from(distance)
            .ok()
            .filter(|&px| px >= 1)
            .ok_or(ConfigError::InvalidDistance)?;

        let duration = match options.time {
            None => None,
            Some(minutes) => {
                let minutes = u64::try_from(minutes)
                    .ok()
                    .filter(|&m| m >= 1)
                    .ok_or(ConfigError::InvalidDuration)?;
                Some(Duration::from_secs(minutes.saturating_mul(60)))
            }
        };

        Ok(JigglerConfig {
            interval: Duration::from_secs(interval),
            distance,
            duration,
            pattern: options.pattern.unwrap_or_default(),
            verbose: !options.quiet.unwrap_or(false),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> PathBuf {
        PathBuf::from("jiggler.toml")
    }

    #[test]
    fn empty_options_give_defaults() {
        let config = JigglerConfig::from_options(Options::default()).unwrap();
        assert_eq!(config, JigglerConfig::default());
        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.distance, 1);
        assert_eq!(config.duration, None);
        assert_eq!(config.pattern, Pattern::Gentle);
        assert!(config.verbose);
    }

    #[test]
    fn explicit_values_are_converted() {
        let config = JigglerConfig::from_options(Options {
            interval: Some(30),
            distance: Some(5),
            time: Some(2),
            pattern: Some(Pattern::Random),
            quiet: Some(true),
        })
        .unwrap();
        assert_eq!(config.interval, Duration::from_secs(30));
        assert_eq!(config.distance, 5);
        assert_eq!(config.duration, Some(Duration::from_secs(120)));
        assert_eq!(config.pattern, Pattern::Random);
        assert!(!config.verbose);
    }

    #[test]
    fn zero_and_negative_interval_rejected() {
        for bad in [0, -1, -60] {
            let err = JigglerConfig::from_options(Options {
                interval: Some(bad),
                ..Options::default()
            })
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidInterval), "{bad}");
        }
    }

    #[test]
    fn zero_and_negative_distance_rejected() {
        for bad in [0, -3] {
            let err = JigglerConfig::from_options(Options {
                distance: Some(bad),
                ..Options::default()
            })
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidDistance), "{bad}");
        }
    }

    #[test]
    fn oversized_distance_rejected() {
        let err = JigglerConfig::from_options(Options {
            distance: Some(i64::from(u32::MAX) + 1),
            ..Options::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDistance));
    }

    #[test]
    fn zero_and_negative_duration_rejected() {
        for bad in [0, -10] {
            let err = JigglerConfig::from_options(Options {
                time: Some(bad),
                ..Options::default()
            })
            .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidDuration), "{bad}");
        }
    }

    #[test]
    fn validation_messages() {
        assert_eq!(
            ConfigError::InvalidInterval.to_string(),
            "Interval must be at least 1 second"
        );
        assert_eq!(
            ConfigError::InvalidDistance.to_string(),
            "Distance must be at least 1 pixel"
        );
        assert_eq!(
            ConfigError::InvalidDuration.to_string(),
            "Duration must be at least 1 minute"
        );
    }

    #[test]
    fn higher_layer_wins() {
        let cli = Options {
            interval: Some(10),
            ..Options::default()
        };
        let file = Options {
            interval: Some(99),
            distance: Some(4),
            ..Options::default()
        };
        let merged = cli.or(file);
        assert_eq!(merged.interval, Some(10));
        assert_eq!(merged.distance, Some(4));
        assert_eq!(merged.time, None);
    }

    #[test]
    fn parses_full_file() {
        let text = r#"
            interval = 45
            distance = 3
            time = 30
            pattern = "circular"
            quiet = true
        "#;
        let options = parse_options(text, &path()).unwrap();
        assert_eq!(
            options,
            Options {
                interval: Some(45),
                distance: Some(3),
                time: Some(30),
                pattern: Some(Pattern::Circular),
                quiet: Some(true),
            }
        );
    }

    #[test]
    fn unknown_pattern_in_file_falls_back_to_gentle() {
        let options = parse_options(r#"pattern = "figure-eight""#, &path()).unwrap();
        assert_eq!(options.pattern, Some(Pattern::Gentle));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = parse_options("speed = 3", &path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("jiggler.toml"));
    }

    #[test]
    fn wrong_type_is_rejected() {
        let err = parse_options(r#"interval = "fast""#, &path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_options(Path::new("/nonexistent/jiggler.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/jiggler.toml"));
    }
}
