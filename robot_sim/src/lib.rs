//! Actor side of the robot teleoperation link.
//!
//! A receive loop decodes UDP control frames into a [`LatestCommandSlot`];
//! a fixed-cadence tick loop drains that slot once per frame and applies at
//! most one command to the authoritative [`Actor`]. Rendering is left to
//! whoever consumes the [`TickReport`] stream.

pub mod actor;
pub mod config;
pub mod network;
pub mod slot;
pub mod ticker;

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::Sender;
use robot_runtime::{CommandReceiver, TransportError};
use thiserror::Error;
use tracing::{info, warn};

pub use actor::{Actor, ApplyOutcome, Simulation, TickReport};
pub use config::{load_actor_config_from_env, ActorConfig, ConfigError};
pub use network::{spawn_receive_loop, ReceiverStats};
pub use slot::LatestCommandSlot;
pub use ticker::{spawn_tick_loop, FrameClock};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("failed to read local address: {0}")]
    LocalAddr(#[source] std::io::Error),
    #[error("{0} thread panicked")]
    ThreadPanicked(&'static str),
}

/// Final state handed back by [`ActorServer::shutdown`].
#[derive(Debug, Clone, Copy)]
pub struct ShutdownSummary {
    pub actor: Actor,
    pub ticks: u64,
    pub receiver: ReceiverStats,
}

/// Running actor: receive loop and tick loop sharing one slot.
pub struct ActorServer {
    local_addr: SocketAddr,
    slot: Arc<LatestCommandSlot>,
    shutdown: Option<Sender<()>>,
    receive_loop: Option<JoinHandle<ReceiverStats>>,
    tick_loop: Option<JoinHandle<Simulation>>,
}

impl ActorServer {
    /// Bind the control socket and start both loops.
    ///
    /// An invalid config or a bind failure is returned before any thread is
    /// spawned.
    pub fn start(
        config: &ActorConfig,
        reports: Option<Sender<TickReport>>,
    ) -> Result<Self, ServerError> {
        config.validate()?;
        let receiver = CommandReceiver::bind(config.listen_addr)?;
        let local_addr = receiver.local_addr().map_err(ServerError::LocalAddr)?;

        let slot = Arc::new(LatestCommandSlot::new());
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded::<()>(1);
        let simulation = Simulation::new(config.arena, config.spawn_point());

        let receive_loop = spawn_receive_loop(receiver, Arc::clone(&slot), shutdown_rx.clone());
        let tick_loop = spawn_tick_loop(
            simulation,
            Arc::clone(&slot),
            shutdown_rx,
            config.frame_budget(),
            reports,
        );

        info!(
            target: "robot::actor",
            listen = %local_addr,
            fps = config.fps,
            spawn = %config.spawn_point(),
            "actor.ready"
        );

        Ok(Self {
            local_addr,
            slot,
            shutdown: Some(shutdown_tx),
            receive_loop: Some(receive_loop),
            tick_loop: Some(tick_loop),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn slot(&self) -> &Arc<LatestCommandSlot> {
        &self.slot
    }

    /// Stop both loops, join them, and release the socket.
    pub fn shutdown(mut self) -> Result<ShutdownSummary, ServerError> {
        self.shutdown.take();

        let receiver = self
            .receive_loop
            .take()
            .map(JoinHandle::join)
            .transpose()
            .map_err(|_| ServerError::ThreadPanicked("receive loop"))?
            .unwrap_or_default();
        let simulation = self
            .tick_loop
            .take()
            .map(JoinHandle::join)
            .transpose()
            .map_err(|_| ServerError::ThreadPanicked("tick loop"))?
            .ok_or(ServerError::ThreadPanicked("tick loop"))?;

        info!(
            target: "robot::actor",
            datagrams = receiver.datagrams,
            published = receiver.published,
            superseded = receiver.superseded,
            dropped = receiver.dropped,
            "actor.shutdown"
        );

        Ok(ShutdownSummary {
            ticks: simulation.tick(),
            actor: simulation.into_actor(),
            receiver,
        })
    }
}

impl Drop for ActorServer {
    /// Disconnects and joins both loops, so the control socket is closed once
    /// the server is gone even without an explicit [`ActorServer::shutdown`].
    fn drop(&mut self) {
        self.shutdown.take();
        if let Some(handle) = self.receive_loop.take() {
            if handle.join().is_err() {
                warn!(target: "robot::actor", "receive_loop.panicked");
            }
        }
        if let Some(handle) = self.tick_loop.take() {
            if handle.join().is_err() {
                warn!(target: "robot::actor", "tick_loop.panicked");
            }
        }
    }
}
