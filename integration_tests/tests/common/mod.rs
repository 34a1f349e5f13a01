use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use robot_pilot::{GestureSequencer, GestureTuning, ThreadPacer};
use robot_runtime::{Arena, Position, UdpCommandSender};
use robot_sim::{ActorConfig, ActorServer, TickReport};

pub const SPAWN: Position = Position::new(400, 500);

pub fn loopback() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
}

/// Actor on an ephemeral loopback port, ticking fast enough that paced
/// gestures land one command per tick.
pub fn start_actor() -> anyhow::Result<(ActorServer, Receiver<TickReport>)> {
    let config = ActorConfig {
        listen_addr: loopback(),
        fps: 200,
        arena: Arena::default(),
        spawn: Some(SPAWN),
    };
    let (report_tx, report_rx) = crossbeam_channel::unbounded();
    let server = ActorServer::start(&config, Some(report_tx))?;
    Ok((server, report_rx))
}

pub fn pilot_for(
    server: &ActorServer,
    tuning: GestureTuning,
) -> anyhow::Result<GestureSequencer<UdpCommandSender>> {
    let sender = UdpCommandSender::bind(loopback(), server.local_addr())?;
    Ok(GestureSequencer::new(
        sender,
        ThreadPacer,
        Arena::default(),
        tuning,
        SPAWN,
    ))
}

/// Drain tick reports until one satisfies `done` or the timeout expires.
pub fn wait_for(
    reports: &Receiver<TickReport>,
    timeout: Duration,
    mut done: impl FnMut(&TickReport) -> bool,
) -> Option<TickReport> {
    let deadline = Instant::now() + timeout;
    while let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        match reports.recv_timeout(remaining) {
            Ok(report) if done(&report) => return Some(report),
            Ok(_) => continue,
            Err(_) => return None,
        }
    }
    None
}
