use std::env;
use std::num::ParseIntError;
use std::time::Duration;

use thiserror::Error;

pub const HOST_VAR: &str = "HOST";
pub const TICK_VAR: &str = "TICK";
pub const RETENTION_VAR: &str = "RETENTION";

const TICK_ONCE: &str = "once";
const DURATION_FORMAT_DOCS: &str =
    "https://docs.rs/humantime/latest/humantime/fn.parse_duration.html";

/// How often the backup cycle runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    /// `TICK` unset: run once, exit status reflects the outcome.
    Once,
    /// `TICK=once`: run once, always exit successfully.
    OnceForced,
    /// Run now and then every interval until terminated.
    Every(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub schedule: Schedule,
    pub retention_days: u32,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("$HOST must be provided")]
    MissingHost,
    #[error("$RETENTION must be an integer: {0}")]
    RetentionNotInteger(ParseIntError),
    #[error("$RETENTION must be a positive integer")]
    NegativeRetention,
    #[error("$TICK is not a valid format ({value:?}: {reason}): see {}", DURATION_FORMAT_DOCS)]
    InvalidTick { value: String, reason: String },
    #[error("$TICK must be greater than zero")]
    ZeroTick,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from a variable lookup. Unset and empty are treated alike.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(HOST_VAR).unwrap_or_default();
        if host.is_empty() {
            return Err(ConfigError::MissingHost);
        }

        let retention_days = parse_retention(&lookup(RETENTION_VAR).unwrap_or_default())?;
        let schedule = parse_tick(&lookup(TICK_VAR).unwrap_or_default())?;

        Ok(Self {
            host,
            schedule,
            retention_days,
        })
    }
}

fn parse_retention(raw: &str) -> Result<u32, ConfigError> {
    let days: i32 = raw.parse().map_err(ConfigError::RetentionNotInteger)?;
    u32::try_from(days).map_err(|_| ConfigError::NegativeRetention)
}

fn parse_tick(raw: &str) -> Result<Schedule, ConfigError> {
    match raw {
        "" => Ok(Schedule::Once),
        TICK_ONCE => Ok(Schedule::OnceForced),
        other => {
            let interval = parse_interval(other)?;
            if interval.is_zero() {
                return Err(ConfigError::ZeroTick);
            }
            Ok(Schedule::Every(interval))
        }
    }
}

fn parse_interval(raw: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(raw).or_else(|e| {
        parse_fractional(raw).ok_or_else(|| ConfigError::InvalidTick {
            value: raw.to_owned(),
            reason: e.to_string(),
        })
    })
}

/// Decimal magnitude with a single unit, e.g. `1.5h`.
fn parse_fractional(raw: &str) -> Option<Duration> {
    let split = raw.find(|c: char| !(c.is_ascii_digit() || c == '.'))?;
    let (magnitude, unit) = raw.split_at(split);
    if !magnitude.contains('.') || !unit.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let magnitude: f64 = magnitude.parse().ok()?;
    let unit = humantime::parse_duration(&format!("1{unit}")).ok()?;
    Duration::try_from_secs_f64(unit.as_secs_f64() * magnitude).ok()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn unset_tick_runs_once() {
        let cfg = load(&[("HOST", "mongo:27017"), ("RETENTION", "7")]).expect("config");
        assert_eq!(
            cfg,
            Config {
                host: "mongo:27017".to_owned(),
                schedule: Schedule::Once,
                retention_days: 7,
            }
        );
    }

    #[test]
    fn empty_tick_runs_once() {
        let cfg = load(&[("HOST", "mongo"), ("RETENTION", "7"), ("TICK", "")]).expect("config");
        assert_eq!(cfg.schedule, Schedule::Once);
    }

    #[test]
    fn literal_once_forces_single_run() {
        let cfg = load(&[("HOST", "mongo"), ("RETENTION", "7"), ("TICK", "once")]).expect("config");
        assert_eq!(cfg.schedule, Schedule::OnceForced);
    }

    #[test]
    fn durations_parse_into_periodic_schedule() {
        let cases = [
            ("24h", Duration::from_secs(24 * 3600)),
            ("10m", Duration::from_secs(600)),
            ("1h 30m", Duration::from_secs(5400)),
            ("1.5h", Duration::from_secs(5400)),
            ("0.5s", Duration::from_millis(500)),
        ];
        for (tick, expected) in cases {
            let cfg = load(&[("HOST", "mongo"), ("RETENTION", "7"), ("TICK", tick)]).expect(tick);
            assert_eq!(cfg.schedule, Schedule::Every(expected), "TICK={tick}");
        }
    }

    #[test]
    fn invalid_tick_points_to_format_docs() {
        for tick in ["daily", "-1h", "h"] {
            let err = load(&[("HOST", "mongo"), ("RETENTION", "7"), ("TICK", tick)])
                .expect_err(tick);
            assert!(matches!(err, ConfigError::InvalidTick { .. }), "TICK={tick}");
            assert!(err.to_string().contains(DURATION_FORMAT_DOCS));
        }
    }

    #[test]
    fn zero_tick_is_rejected() {
        let err = load(&[("HOST", "mongo"), ("RETENTION", "7"), ("TICK", "0s")]).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroTick));
    }

    #[test]
    fn empty_host_is_fatal() {
        let err = load(&[("HOST", ""), ("RETENTION", "7")]).unwrap_err();
        assert_eq!(err.to_string(), "$HOST must be provided");

        let err = load(&[("RETENTION", "7")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingHost));
    }

    #[test]
    fn negative_retention_is_fatal() {
        let err = load(&[("HOST", "mongo"), ("RETENTION", "-3")]).unwrap_err();
        assert_eq!(err.to_string(), "$RETENTION must be a positive integer");
    }

    #[test]
    fn non_integer_retention_reports_parse_error() {
        let err = load(&[("HOST", "mongo"), ("RETENTION", "abc")]).unwrap_err();
        assert!(matches!(err, ConfigError::RetentionNotInteger(_)));
        assert!(err.to_string().starts_with("$RETENTION must be an integer: "));

        let err = load(&[("HOST", "mongo")]).unwrap_err();
        assert!(matches!(err, ConfigError::RetentionNotInteger(_)));
    }

    #[test]
    fn retention_beyond_i32_is_rejected() {
        let err = load(&[("HOST", "mongo"), ("RETENTION", "4294967296")]).unwrap_err();
        assert!(matches!(err, ConfigError::RetentionNotInteger(_)));
    }

    #[test]
    fn zero_retention_is_accepted() {
        let cfg = load(&[("HOST", "mongo"), ("RETENTION", "0")]).expect("config");
        assert_eq!(cfg.retention_days, 0);
    }

    #[test]
    fn invalid_tick_fails_even_when_other_values_are_valid() {
        let err = load(&[("HOST", "mongo"), ("RETENTION", "3"), ("TICK", "soon")]).unwrap_err();
        assert!(err.to_string().starts_with("$TICK is not a valid format"));
    }
}
