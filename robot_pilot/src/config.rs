use std::{
    env, fs, io,
    net::{IpAddr, Ipv4Addr, SocketAddr, ToSocketAddrs},
    path::{Path, PathBuf},
    time::Duration,
};

use robot_runtime::{Arena, ArenaError, Position};
use serde::Deserialize;
use thiserror::Error;

use crate::gesture::GestureTuning;

pub const BUILTIN_PILOT_CONFIG: &str = include_str!("data/pilot_config.json");

/// Environment variable naming a pilot config file that replaces the builtin one.
pub const PILOT_CONFIG_ENV: &str = "ROBOT_PILOT_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PilotConfig {
    pub server_host: String,
    pub server_port: u16,
    pub local_port: u16,
    /// Distance one command moves the mirrored estimate.
    pub step_distance: i32,
    /// Ascent and descent command count of a jump.
    pub jump_height: u32,
    pub arena_width: i32,
    pub arena_height: i32,
    pub margin_x: i32,
    pub margin_y: i32,
    pub gesture_distance: u32,
    pub walk_speed: f64,
    pub gesture_tick_ms: u64,
    /// Where the actor is assumed to start; the arena center when absent.
    pub start: Option<Position>,
}

impl Default for PilotConfig {
    fn default() -> Self {
        let arena = Arena::default();
        let tuning = GestureTuning::default();
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 2024,
            local_port: 2025,
            step_distance: arena.step,
            jump_height: tuning.jump_height,
            arena_width: arena.width,
            arena_height: arena.height,
            margin_x: arena.margin_x,
            margin_y: arena.margin_y,
            gesture_distance: tuning.distance,
            walk_speed: tuning.walk_speed,
            gesture_tick_ms: 50,
            start: None,
        }
    }
}

impl PilotConfig {
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_PILOT_CONFIG).unwrap_or_else(|err| {
            tracing::error!(
                target: "robot::config",
                error = %err,
                "pilot_config.builtin_invalid"
            );
            Self::default()
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Same rules as the actor: a usable arena and a start point inside it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let arena = self.arena();
        arena.check()?;
        match self.start {
            Some(position) if !arena.contains(position) => {
                Err(ConfigError::InvalidStart { position })
            }
            _ => Ok(()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let config = PilotConfig::from_json_str(&contents)?;
        Ok(config)
    }

    pub fn arena(&self) -> Arena {
        Arena {
            width: self.arena_width,
            height: self.arena_height,
            margin_x: self.margin_x,
            margin_y: self.margin_y,
            step: self.step_distance,
        }
    }

    pub fn tuning(&self) -> GestureTuning {
        GestureTuning {
            jump_height: self.jump_height,
            distance: self.gesture_distance,
            walk_speed: self.walk_speed,
            gesture_tick: Duration::from_millis(self.gesture_tick_ms),
        }
    }

    pub fn start_position(&self) -> Position {
        self.start.unwrap_or_else(|| self.arena().center())
    }

    pub fn local_addr(&self) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.local_port)
    }

    /// Resolve `server_host:server_port`, taking the first address returned.
    pub fn server_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host = self.server_host.as_str();
        (host, self.server_port)
            .to_socket_addrs()
            .map_err(|source| ConfigError::Resolve {
                host: self.server_host.clone(),
                source,
            })?
            .next()
            .ok_or_else(|| ConfigError::Resolve {
                host: self.server_host.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "no addresses"),
            })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse pilot config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read pilot config from {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid pilot arena: {0}")]
    InvalidArena(#[from] ArenaError),
    #[error("start position {position} lies outside the arena margins")]
    InvalidStart { position: Position },
    #[error("failed to resolve server host '{host}': {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },
}

/// Load the pilot config named by [`PILOT_CONFIG_ENV`], falling back to the builtin.
pub fn load_pilot_config_from_env() -> PilotConfig {
    let Some(path) = env::var(PILOT_CONFIG_ENV).ok().map(PathBuf::from) else {
        tracing::info!(target: "robot::config", "pilot_config.loaded=builtin");
        return PilotConfig::builtin();
    };

    match PilotConfig::from_file(&path) {
        Ok(config) => {
            tracing::info!(
                target: "robot::config",
                path = %path.display(),
                "pilot_config.loaded=file"
            );
            config
        }
        Err(err) => {
            tracing::warn!(
                target: "robot::config",
                path = %path.display(),
                error = %err,
                "pilot_config.load_failed"
            );
            PilotConfig::builtin()
        }
    }
}
