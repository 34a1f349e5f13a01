use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use robot_sim::{load_actor_config_from_env, ActorServer, ApplyOutcome};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless robot actor driven by UDP control frames", long_about = None)]
struct Cli {
    /// Override the address the control socket listens on.
    #[arg(long)]
    listen: Option<SocketAddr>,
    /// Override the simulation tick rate.
    #[arg(long)]
    fps: Option<u32>,
    /// Stop after this many ticks instead of running forever.
    #[arg(long)]
    ticks: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let (mut config, _path) = load_actor_config_from_env();
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }
    if let Some(fps) = cli.fps {
        config.fps = fps;
    }

    let (report_tx, report_rx) = crossbeam_channel::unbounded();
    let server = ActorServer::start(&config, Some(report_tx))
        .with_context(|| format!("starting actor on {}", config.listen_addr))?;

    let idle_timeout = Duration::from_secs(5);
    let mut last_tick = 0u64;
    loop {
        match report_rx.recv_timeout(idle_timeout) {
            Ok(report) => {
                last_tick = report.tick;
                if let (Some(command), Some(ApplyOutcome::Moved)) = (report.command, report.outcome)
                {
                    info!(
                        target: "robot::actor",
                        tick = report.tick,
                        %command,
                        x = report.position.x,
                        y = report.position.y,
                        "actor.moved"
                    );
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => continue,
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }
        if cli.ticks.is_some_and(|limit| last_tick >= limit) {
            break;
        }
    }

    let summary = server.shutdown()?;
    info!(
        target: "robot::actor",
        ticks = summary.ticks,
        position = %summary.actor.position(),
        "actor.exited"
    );
    Ok(())
}
