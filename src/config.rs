//! Relay configuration loading from environment variables.
//!
//! All values are loaded from `RELAY_*` environment variables with
//! sensible defaults. Invalid values fall back to defaults without
//! crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `RELAY_QUEUE_CAPACITY` | 10 | Max pending requests |
//! | `RELAY_MAX_WAIT_SECS` | 30 | Per-request wait budget (secs) |
//! | `RELAY_REAPER_INTERVAL_MS` | 2000 | Reaper sweep period (ms) |
//! | `RELAY_COALESCE_DUPLICATES` | true | Fan one result out to all in-flight duplicates |
//! | `RELAY_SHUTDOWN_TIMEOUT_SECS` | 30 | Drain window at teardown (secs) |

use std::time::Duration;

use serde::Serialize;

use crate::RelayConfig;

/// All relay configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub relay: RelayConfig,
    pub shutdown_timeout: Duration,
}

/// Effective configuration summary (serializable).
#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    pub queue_capacity: usize,
    pub max_wait_secs: u64,
    pub reaper_interval_ms: u64,
    pub coalesce_duplicates: bool,
    pub shutdown_timeout_secs: u64,
}

/// Parse a `usize` env var, returning `default` on missing or invalid.
fn parse_usize(key: &str, default: usize) -> usize {
    match std::env::var(key) {
        Ok(val) => val.parse::<usize>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a `u64` env var, returning `default` on missing or invalid.
fn parse_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(val) => val.parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}

/// Parse a boolean env var ("true"/"false"/"1"/"0"), returning `default`
/// on missing or invalid.
fn parse_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(val) => match val.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

/// Load all configuration from environment variables.
///
/// Missing or invalid values fall back to safe defaults without panicking.
pub fn load() -> EnvConfig {
    let queue_capacity = parse_usize("RELAY_QUEUE_CAPACITY", 10).max(1);
    let max_wait_secs = parse_u64("RELAY_MAX_WAIT_SECS", 30).max(1);
    // Floor at 10ms: a hotter sweep only burns CPU.
    let reaper_interval_ms = parse_u64("RELAY_REAPER_INTERVAL_MS", 2000).max(10);
    let coalesce_duplicates = parse_bool("RELAY_COALESCE_DUPLICATES", true);
    let shutdown_secs = parse_u64("RELAY_SHUTDOWN_TIMEOUT_SECS", 30).max(1);

    EnvConfig {
        relay: RelayConfig {
            queue_capacity,
            max_wait: Duration::from_secs(max_wait_secs),
            reaper_interval: Duration::from_millis(reaper_interval_ms),
            coalesce_duplicates,
        },
        shutdown_timeout: Duration::from_secs(shutdown_secs),
    }
}

impl EnvConfig {
    /// Return a serializable summary of all effective values.
    pub fn effective_config(&self) -> EffectiveConfig {
        EffectiveConfig {
            queue_capacity: self.relay.queue_capacity,
            max_wait_secs: self.relay.max_wait.as_secs(),
            reaper_interval_ms: self.relay.reaper_interval.as_millis() as u64,
            coalesce_duplicates: self.relay.coalesce_duplicates,
            shutdown_timeout_secs: self.shutdown_timeout.as_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Serialize env-mutating tests to avoid cross-test pollution.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "RELAY_QUEUE_CAPACITY",
        "RELAY_MAX_WAIT_SECS",
        "RELAY_REAPER_INTERVAL_MS",
        "RELAY_COALESCE_DUPLICATES",
        "RELAY_SHUTDOWN_TIMEOUT_SECS",
    ];

    fn clear_env_vars() {
        for k in ENV_KEYS {
            std::env::remove_var(k);
        }
    }

    #[test]
    fn test_defaults_are_sensible() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        let cfg = load();
        assert_eq!(cfg.relay.queue_capacity, 10);
        assert_eq!(cfg.relay.max_wait, Duration::from_secs(30));
        assert_eq!(cfg.relay.reaper_interval, Duration::from_millis(2000));
        assert!(cfg.relay.coalesce_duplicates);
        assert_eq!(cfg.shutdown_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_env_vars_override_defaults() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("RELAY_QUEUE_CAPACITY", "64");
        std::env::set_var("RELAY_MAX_WAIT_SECS", "5");
        std::env::set_var("RELAY_REAPER_INTERVAL_MS", "250");
        std::env::set_var("RELAY_COALESCE_DUPLICATES", "false");
        let cfg = load();
        assert_eq!(cfg.relay.queue_capacity, 64);
        assert_eq!(cfg.relay.max_wait, Duration::from_secs(5));
        assert_eq!(cfg.relay.reaper_interval, Duration::from_millis(250));
        assert!(!cfg.relay.coalesce_duplicates);
        clear_env_vars();
    }

    #[test]
    fn test_invalid_env_falls_back_to_default() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("RELAY_QUEUE_CAPACITY", "not_a_number");
        std::env::set_var("RELAY_MAX_WAIT_SECS", "abc");
        std::env::set_var("RELAY_COALESCE_DUPLICATES", "maybe");
        let cfg = load();
        assert_eq!(cfg.relay.queue_capacity, 10);
        assert_eq!(cfg.relay.max_wait, Duration::from_secs(30));
        assert!(cfg.relay.coalesce_duplicates);
        clear_env_vars();
    }

    #[test]
    fn test_floors_applied() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        std::env::set_var("RELAY_QUEUE_CAPACITY", "0");
        std::env::set_var("RELAY_MAX_WAIT_SECS", "0");
        std::env::set_var("RELAY_REAPER_INTERVAL_MS", "1");
        let cfg = load();
        assert!(cfg.relay.queue_capacity >= 1, "capacity must have floor");
        assert!(cfg.relay.max_wait >= Duration::from_secs(1));
        assert!(cfg.relay.reaper_interval >= Duration::from_millis(10));
        clear_env_vars();
    }

    #[test]
    fn test_effective_config_reflects_values() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env_vars();
        let cfg = load();
        let eff = cfg.effective_config();
        assert_eq!(eff.queue_capacity, 10);
        assert_eq!(eff.max_wait_secs, 30);
        assert_eq!(eff.reaper_interval_ms, 2000);
        assert!(eff.coalesce_duplicates);
        assert_eq!(eff.shutdown_timeout_secs, 30);
    }
}
