use std::{
    env, fs, io,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::{Path, PathBuf},
    time::Duration,
};

use robot_runtime::{Arena, ArenaError, Position};
use serde::Deserialize;
use thiserror::Error;

pub const BUILTIN_ACTOR_CONFIG: &str = include_str!("data/actor_config.json");

/// Environment variable naming an actor config file that replaces the builtin one.
pub const ACTOR_CONFIG_ENV: &str = "ROBOT_ACTOR_CONFIG_PATH";

/// Actor process settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    pub listen_addr: SocketAddr,
    /// Simulation ticks per second.
    pub fps: u32,
    pub arena: Arena,
    /// Starting position; the arena center when absent.
    pub spawn: Option<Position>,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 2024),
            fps: 60,
            arena: Arena::default(),
            spawn: None,
        }
    }
}

impl ActorConfig {
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_ACTOR_CONFIG).unwrap_or_else(|err| {
            tracing::error!(
                target: "robot::config",
                error = %err,
                "actor_config.builtin_invalid"
            );
            Self::default()
        })
    }

    /// Parse and validate a config document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// The arena must leave room to move and the spawn point must lie inside it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.arena.check()?;
        match self.spawn {
            Some(position) if !self.arena.contains(position) => {
                Err(ConfigError::InvalidSpawn { position })
            }
            _ => Ok(()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let config = ActorConfig::from_json_str(&contents)?;
        Ok(config)
    }

    pub fn spawn_point(&self) -> Position {
        self.spawn.unwrap_or_else(|| self.arena.center())
    }

    /// Wall-clock budget of one tick.
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse actor config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read actor config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid actor arena: {0}")]
    InvalidArena(#[from] ArenaError),
    #[error("spawn point {position} lies outside the arena margins")]
    InvalidSpawn { position: Position },
}

/// Load the actor config named by [`ACTOR_CONFIG_ENV`], falling back to the builtin.
pub fn load_actor_config_from_env() -> (ActorConfig, Option<PathBuf>) {
    let Some(path) = env::var(ACTOR_CONFIG_ENV).ok().map(PathBuf::from) else {
        tracing::info!(target: "robot::config", "actor_config.loaded=builtin");
        return (ActorConfig::builtin(), None);
    };

    match ActorConfig::from_file(&path) {
        Ok(config) => {
            tracing::info!(
                target: "robot::config",
                path = %path.display(),
                "actor_config.loaded=file"
            );
            (config, Some(path))
        }
        Err(err) => {
            tracing::warn!(
                target: "robot::config",
                path = %path.display(),
                error = %err,
                "actor_config.load_failed"
            );
            (ActorConfig::builtin(), None)
        }
    }
}
