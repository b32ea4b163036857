//! Core type aliases, error kinds, and logging bootstrap for the GEMP bot.
//!
//! This crate provides the foundational types shared across the workspace,
//! mirroring the shape of a small "kernel" crate: no business logic, just
//! the vocabulary other crates build on.

use std::time::Duration;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Server-assigned channel cursor for the long-poll event stream.
pub type ChannelNumber = u64;
/// Stable integer slot assigned by the server to a location in play.
pub type LocationIndex = usize;
/// Server-assigned opaque identifier for a physical card instance.
pub type CardId = String;
/// Opaque stable identifier for a card template ("1_249").
pub type BlueprintId = String;
/// Server-assigned identifier for a pending decision.
pub type DecisionId = String;

/// Which side of the table a card, player, or zone belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Side {
    Light,
    Dark,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Light => Side::Dark,
            Side::Dark => Side::Light,
        }
    }
}

impl std::str::FromStr for Side {
    type Err = CoreError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" | "light side" => Ok(Side::Light),
            "dark" | "dark side" => Ok(Side::Dark),
            other => Err(CoreError::Parse(format!("unknown side: {other}"))),
        }
    }
}

/// Identifies whose perspective a card, zone, or power value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Me,
    Opponent,
}

impl Owner {
    pub fn opposite(self) -> Owner {
        match self {
            Owner::Me => Owner::Opponent,
            Owner::Opponent => Owner::Me,
        }
    }
}

// ============================================================================
// ERROR KINDS
// ============================================================================
/// The five error categories the core recognizes (spec §7).
///
/// Only `Fatal` ever stops the worker; every other variant is handled
/// in place and the worker keeps running.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("transient transport error: {0}")]
    Transient(String),
    #[error("fatal transport error: {0}")]
    Fatal(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("state invariant violation: {0}")]
    Invariant(String),
}

impl CoreError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, CoreError::Fatal(_))
    }
}

// ============================================================================
// CONFIGURATION (spec §6.2)
// ============================================================================
/// Recognized configuration keys, with the defaults spec.md §6.2 specifies.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub server_url: String,
    pub username: String,
    pub password: String,
    pub card_json_dir: String,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub game_state_timeout: Duration,
    pub deploy_threshold: i32,
    pub max_hand_size: i32,
    pub hand_soft_cap: i32,
    pub force_gen_target: i32,
    pub battle_favorable_threshold: i32,
    pub battle_danger_threshold: i32,
    pub brain_name: String,
    /// Consecutive read-timeouts before the worker enters the reconnect substate.
    pub max_consecutive_timeouts: u32,
}

impl WorkerConfig {
    /// Reads configuration from environment variables, applying spec.md §6.2
    /// defaults for every key that has one. `server_url`, `username`,
    /// `password`, and `card_json_dir` are required and return a `Fatal`
    /// error if missing.
    pub fn from_env() -> Result<Self, CoreError> {
        let required = |key: &str| -> Result<String, CoreError> {
            std::env::var(key).map_err(|_| {
                CoreError::Fatal(format!("missing required config key: {key}"))
            })
        };
        let optional_i32 = |key: &str, default: i32| -> i32 {
            std::env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default)
        };
        let optional_secs = |key: &str, default: u64| -> Duration {
            let secs = std::env::var(key)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default);
            Duration::from_secs(secs)
        };
        Ok(Self {
            server_url: required("SERVER_URL")?,
            username: required("USERNAME")?,
            password: required("PASSWORD")?,
            card_json_dir: required("CARD_JSON_DIR")?,
            poll_interval: optional_secs("POLL_INTERVAL_SECONDS", 3),
            request_timeout: optional_secs("REQUEST_TIMEOUT_SECONDS", 10),
            game_state_timeout: optional_secs("GAME_STATE_TIMEOUT_SECONDS", 15),
            deploy_threshold: optional_i32("DEPLOY_THRESHOLD", 0),
            max_hand_size: optional_i32("MAX_HAND_SIZE", 7),
            hand_soft_cap: optional_i32("HAND_SOFT_CAP", 5),
            force_gen_target: optional_i32("FORCE_GEN_TARGET", 4),
            battle_favorable_threshold: optional_i32("BATTLE_FAVORABLE_THRESHOLD", 3),
            battle_danger_threshold: optional_i32("BATTLE_DANGER_THRESHOLD", -3),
            brain_name: std::env::var("BRAIN_NAME").unwrap_or_else(|_| "Static".to_string()),
            max_consecutive_timeouts: optional_i32("MAX_CONSECUTIVE_TIMEOUTS", 3) as u32,
        })
    }
}

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initializes dual logging (terminal + file), matching the teacher's
/// `rbp_core::log()` shape: DEBUG to a timestamped file under `logs/`,
/// INFO to the terminal.
pub fn init_logging() -> Result<(), CoreError> {
    std::fs::create_dir_all("logs")
        .map_err(|e| CoreError::Fatal(format!("create logs directory: {e}")))?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_err(|e| CoreError::Fatal(format!("time moves slow: {e}")))?
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{time}.log"))
            .map_err(|e| CoreError::Fatal(format!("create log file: {e}")))?,
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file])
        .map_err(|e| CoreError::Fatal(format!("initialize logger: {e}")))
}

/// Cooperative stop flag shared between the admin surface and the worker.
/// Checked only at suspension points (spec §5 "cooperative... between
/// suspension points").
#[derive(Debug, Default)]
pub struct StopFlag(std::sync::atomic::AtomicBool);

impl StopFlag {
    pub fn new() -> Self {
        Self(std::sync::atomic::AtomicBool::new(false))
    }
    pub fn request_stop(&self) {
        self.0.store(true, std::sync::atomic::Ordering::SeqCst);
    }
    pub fn should_stop(&self) -> bool {
        self.0.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_opposite_round_trips() {
        assert_eq!(Side::Light.opposite(), Side::Dark);
        assert_eq!(Side::Dark.opposite(), Side::Light);
    }

    #[test]
    fn side_from_str_case_insensitive() {
        assert_eq!("Dark".parse::<Side>().unwrap(), Side::Dark);
        assert_eq!("light".parse::<Side>().unwrap(), Side::Light);
        assert!("sith".parse::<Side>().is_err());
    }

    #[test]
    fn owner_opposite_round_trips() {
        assert_eq!(Owner::Me.opposite(), Owner::Opponent);
        assert_eq!(Owner::Opponent.opposite(), Owner::Me);
    }

    #[test]
    fn core_error_is_fatal_only_for_fatal_variant() {
        assert!(CoreError::Fatal("x".into()).is_fatal());
        assert!(!CoreError::Transient("x".into()).is_fatal());
        assert!(!CoreError::Parse("x".into()).is_fatal());
        assert!(!CoreError::Invariant("x".into()).is_fatal());
    }

    #[test]
    fn stop_flag_starts_clear() {
        let flag = StopFlag::new();
        assert!(!flag.should_stop());
        flag.request_stop();
        assert!(flag.should_stop());
    }

    #[test]
    fn config_from_env_requires_server_url() {
        // Isolated by using keys unlikely to already be set in the test env.
        std::env::remove_var("SERVER_URL");
        std::env::remove_var("USERNAME");
        std::env::remove_var("PASSWORD");
        std::env::remove_var("CARD_JSON_DIR");
        let result = WorkerConfig::from_env();
        assert!(result.is_err());
    }
}
