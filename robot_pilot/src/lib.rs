//! Pilot side of the robot teleoperation link.
//!
//! Operator gestures (jump, dodge, run, walk) are expanded into paced streams
//! of primitive commands and sent over UDP to the actor.

pub mod config;
pub mod gesture;
pub mod gesture_text;
pub mod sequencer;

use robot_runtime::{TransportError, UdpCommandSender};

pub use config::{load_pilot_config_from_env, ConfigError, PilotConfig, PILOT_CONFIG_ENV};
pub use gesture::{Gesture, GestureError, GestureTuning, ScheduledStep};
pub use gesture_text::{parse_gesture, parse_gesture_line};
pub use sequencer::{GestureReport, GestureSequencer, Pacer, ThreadPacer};

#[derive(Debug, thiserror::Error)]
pub enum PilotError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Bind the UDP sender described by `config` and wrap it in a sequencer.
pub fn connect(config: &PilotConfig) -> Result<GestureSequencer<UdpCommandSender>, PilotError> {
    config.validate()?;
    let remote = config.server_addr()?;
    let sender = UdpCommandSender::bind(config.local_addr(), remote)?;
    Ok(GestureSequencer::new(
        sender,
        ThreadPacer,
        config.arena(),
        config.tuning(),
        config.start_position(),
    ))
}
