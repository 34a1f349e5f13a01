use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use tracing::{debug, info};

use crate::actor::{ApplyOutcome, Simulation, TickReport};
use crate::slot::LatestCommandSlot;

/// Fixed-cadence pacing for the tick loop.
///
/// Each wait sleeps for whatever is left of the current frame. A late frame
/// is not caught up: the schedule restarts from "now" instead of bursting.
#[derive(Debug)]
pub struct FrameClock {
    budget: Duration,
    deadline: Instant,
}

impl FrameClock {
    pub fn new(budget: Duration) -> Self {
        Self {
            budget,
            deadline: Instant::now() + budget,
        }
    }

    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Wait for the end of the frame. Returns `false` once shutdown is requested.
    pub fn wait(&mut self, shutdown: &Receiver<()>) -> bool {
        let now = Instant::now();
        let remaining = self.deadline.saturating_duration_since(now);
        let keep_running = matches!(
            shutdown.recv_timeout(remaining),
            Err(RecvTimeoutError::Timeout)
        );
        self.deadline = self.deadline.max(now) + self.budget;
        keep_running
    }
}

/// Spawn the tick loop. The simulation is handed back when the loop stops.
pub fn spawn_tick_loop(
    mut simulation: Simulation,
    slot: Arc<LatestCommandSlot>,
    shutdown: Receiver<()>,
    budget: Duration,
    reports: Option<Sender<TickReport>>,
) -> JoinHandle<Simulation> {
    thread::spawn(move || {
        let mut clock = FrameClock::new(budget);
        loop {
            let report = simulation.on_tick(&slot);
            log_report(&report);
            if let Some(reports) = &reports {
                // Observers going away must not stop the simulation.
                let _ = reports.send(report);
            }
            if !clock.wait(&shutdown) {
                break;
            }
        }
        info!(
            target: "robot::actor",
            ticks = simulation.tick(),
            position = %simulation.actor().position(),
            "tick_loop.stopped"
        );
        simulation
    })
}

fn log_report(report: &TickReport) {
    match (report.command, report.outcome) {
        (Some(command), Some(ApplyOutcome::Moved)) => debug!(
            target: "robot::actor",
            tick = report.tick,
            %command,
            position = %report.position,
            "command.applied"
        ),
        (Some(command), Some(ApplyOutcome::Blocked)) => info!(
            target: "robot::actor",
            tick = report.tick,
            %command,
            position = %report.position,
            "command.blocked=out_of_bounds"
        ),
        _ => {}
    }
}
