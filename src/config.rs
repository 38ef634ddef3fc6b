//! Configuration loading and management

use std::time::Duration;

use anyhow::{ensure, Result};
use clap::{Parser, ValueEnum};

use crate::session::RestartPolicy;

/// Which recognition backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Backend {
    /// Read recognized speech from the console
    #[default]
    Console,
    /// No speech recognition available
    None,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Console => write!(f, "console"),
            Backend::None => write!(f, "none"),
        }
    }
}

/// Voice overlay configuration
#[derive(Parser, Debug, Clone)]
#[command(name = "heritage-voice")]
#[command(version, about = "Voice command overlay for the Digital Cultural Heritage Museum", long_about = None)]
pub struct Config {
    /// Speech recognition backend
    #[arg(long, value_enum, env = "HERITAGE_SPEECH_BACKEND", default_value_t = Backend::Console)]
    pub backend: Backend,

    /// Viewport height used by scroll commands
    #[arg(long, env = "HERITAGE_VIEWPORT_HEIGHT", default_value = "800")]
    pub viewport_height: i64,

    /// Route shown at startup
    #[arg(long, default_value = "/")]
    pub start_path: String,

    /// Open the voice overlay immediately
    #[arg(long)]
    pub start_active: bool,

    /// Delay before the second consecutive capture restart (ms)
    #[arg(long, default_value = "250")]
    pub restart_initial_delay_ms: u64,

    /// Upper bound on the capture restart delay (ms)
    #[arg(long, default_value = "5000")]
    pub restart_max_delay_ms: u64,

    /// Consecutive capture restarts allowed before listening stops
    #[arg(long, default_value = "8")]
    pub restart_max_attempts: u32,

    /// Print every session event as a JSON line
    #[arg(long)]
    pub json_events: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "HERITAGE_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Load configuration from arguments, environment and defaults
    pub fn load() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.viewport_height > 0, "viewport height must be positive");
        ensure!(
            self.start_path.starts_with('/'),
            "start path must be absolute, got {:?}",
            self.start_path
        );
        ensure!(
            self.restart_max_attempts > 0,
            "restart attempts must be at least 1"
        );
        ensure!(
            self.restart_initial_delay_ms > 0,
            "restart initial delay must be at least 1ms"
        );
        ensure!(
            self.restart_initial_delay_ms <= self.restart_max_delay_ms,
            "restart initial delay ({}ms) exceeds max delay ({}ms)",
            self.restart_initial_delay_ms,
            self.restart_max_delay_ms
        );
        Ok(())
    }

    pub fn restart_policy(&self) -> RestartPolicy {
        RestartPolicy {
            initial_delay: Duration::from_millis(self.restart_initial_delay_ms),
            max_delay: Duration::from_millis(self.restart_max_delay_ms),
            max_attempts: self.restart_max_attempts,
        }
    }
}
