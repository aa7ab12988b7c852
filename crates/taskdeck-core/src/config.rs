//! Configuration for the auto-complete pipeline.
//!
//! # Environment Variables
//!
//! - `AUTO_COMPLETE_MINUTES` (default: 5)
//! - `AUTO_COMPLETE_DELAY_MS` (overrides the minutes when set)
//! - `AUTO_COMPLETE_WORKERS` (default: 4)
//! - `AUTO_COMPLETE_QUEUE_CAPACITY` (default: 100)
//! - `AUTO_COMPLETE_ENQUEUE_TIMEOUT_MS` (default: 500)
//! - `SHUTDOWN_TIMEOUT_SECS` (default: 10)
//!
//! Invalid or non-positive values fall back to the default with a warning;
//! a bad variable never stops the process from starting.

use std::time::Duration;

use tracing::warn;

pub const DEFAULT_AUTO_COMPLETE_MINUTES: u64 = 5;
pub const DEFAULT_WORKERS: usize = 4;
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;
pub const DEFAULT_ENQUEUE_TIMEOUT: Duration = Duration::from_millis(500);
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// How long after creation a task gets auto-completed.
    pub auto_complete_delay: Duration,
    pub workers: usize,
    pub queue_capacity: usize,
    /// How long task creation may wait on a full queue.
    pub enqueue_timeout: Duration,
    /// Shared deadline for draining the workers.
    pub shutdown_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_complete_delay: Duration::from_secs(DEFAULT_AUTO_COMPLETE_MINUTES * 60),
            workers: DEFAULT_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            enqueue_timeout: DEFAULT_ENQUEUE_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl Config {
    /// Load from process environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load through an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();

        let minutes = positive(&lookup, "AUTO_COMPLETE_MINUTES", DEFAULT_AUTO_COMPLETE_MINUTES);
        let by_minutes = Duration::from_secs(minutes).checked_mul(60).unwrap_or_else(|| {
            warn!(minutes, "AUTO_COMPLETE_MINUTES out of range, using default");
            default.auto_complete_delay
        });
        let auto_complete_delay = parse_positive(&lookup, "AUTO_COMPLETE_DELAY_MS")
            .map(Duration::from_millis)
            .unwrap_or(by_minutes);

        Self {
            auto_complete_delay,
            workers: positive(&lookup, "AUTO_COMPLETE_WORKERS", default.workers as u64) as usize,
            queue_capacity: positive(
                &lookup,
                "AUTO_COMPLETE_QUEUE_CAPACITY",
                default.queue_capacity as u64,
            ) as usize,
            enqueue_timeout: Duration::from_millis(positive(
                &lookup,
                "AUTO_COMPLETE_ENQUEUE_TIMEOUT_MS",
                default.enqueue_timeout.as_millis() as u64,
            )),
            shutdown_timeout: Duration::from_secs(positive(
                &lookup,
                "SHUTDOWN_TIMEOUT_SECS",
                default.shutdown_timeout.as_secs(),
            )),
        }
    }
}

/// Parse a positive integer variable, falling back to `default` on bad input.
fn positive<F>(lookup: &F, var_name: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    parse_positive(lookup, var_name).unwrap_or(default)
}

/// `None` when unset or invalid. Invalid values are logged.
fn parse_positive<F>(lookup: &F, var_name: &str) -> Option<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(var_name)?;
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            warn!(
                var = var_name,
                value = %value,
                "invalid value for environment variable, using default"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(load(&[]), Config::default());
        assert_eq!(Config::default().auto_complete_delay, Duration::from_secs(300));
    }

    #[test]
    fn reads_every_variable() {
        let config = load(&[
            ("AUTO_COMPLETE_MINUTES", "2"),
            ("AUTO_COMPLETE_WORKERS", "8"),
            ("AUTO_COMPLETE_QUEUE_CAPACITY", "10"),
            ("AUTO_COMPLETE_ENQUEUE_TIMEOUT_MS", "250"),
            ("SHUTDOWN_TIMEOUT_SECS", "30"),
        ]);

        assert_eq!(config.auto_complete_delay, Duration::from_secs(120));
        assert_eq!(config.workers, 8);
        assert_eq!(config.queue_capacity, 10);
        assert_eq!(config.enqueue_timeout, Duration::from_millis(250));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(30));
    }

    #[test]
    fn delay_ms_overrides_minutes() {
        let config = load(&[
            ("AUTO_COMPLETE_MINUTES", "2"),
            ("AUTO_COMPLETE_DELAY_MS", "200"),
        ]);

        assert_eq!(config.auto_complete_delay, Duration::from_millis(200));
    }

    #[rstest]
    #[case::zero("0")]
    #[case::negative("-3")]
    #[case::garbage("five")]
    #[case::empty("")]
    fn invalid_minutes_fall_back_to_five(#[case] value: &str) {
        let config = load(&[("AUTO_COMPLETE_MINUTES", value)]);

        assert_eq!(config.auto_complete_delay, Duration::from_secs(300));
    }

    #[rstest]
    #[case::overflows_seconds("400000000000000000")]
    #[case::overflows_u64("18446744073709551615")]
    fn huge_minutes_fall_back_to_five(#[case] value: &str) {
        let config = load(&[("AUTO_COMPLETE_MINUTES", value)]);

        assert_eq!(config.auto_complete_delay, Duration::from_secs(300));
    }

    #[test]
    fn huge_minutes_do_not_block_delay_ms() {
        let config = load(&[
            ("AUTO_COMPLETE_MINUTES", "400000000000000"),
            ("AUTO_COMPLETE_DELAY_MS", "200"),
        ]);

        assert_eq!(config.auto_complete_delay, Duration::from_millis(200));
    }

    #[test]
    fn invalid_delay_ms_falls_back_to_minutes() {
        let config = load(&[
            ("AUTO_COMPLETE_MINUTES", "2"),
            ("AUTO_COMPLETE_DELAY_MS", "soon"),
        ]);

        assert_eq!(config.auto_complete_delay, Duration::from_secs(120));
    }
}
