use std::io::{self, BufRead, Write};

use anyhow::Context;
use clap::Parser;
use tracing::info;

use robot_pilot::{connect, load_pilot_config_from_env, parse_gesture_line};

#[derive(Parser, Debug)]
#[command(author, version, about = "Send gestures to a robot actor over UDP", long_about = None)]
struct Cli {
    /// Override the actor host.
    #[arg(long)]
    server_host: Option<String>,
    /// Override the actor control port.
    #[arg(long)]
    server_port: Option<u16>,
    /// Override the local port the sender binds.
    #[arg(long)]
    local_port: Option<u16>,
    /// Execute a single gesture line (e.g. "dodge left") and exit.
    #[arg(long)]
    gesture: Option<String>,
}

const PROMPT: &str = "gesture (jump [left|right], dodge <dir>, run <dir> <speed>, walk <dir>, up/down/left/right) or q to quit: ";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let mut config = load_pilot_config_from_env();
    if let Some(host) = cli.server_host {
        config.server_host = host;
    }
    if let Some(port) = cli.server_port {
        config.server_port = port;
    }
    if let Some(port) = cli.local_port {
        config.local_port = port;
    }

    let mut sequencer = connect(&config).context("setting up command transport")?;
    info!(
        target: "robot::pilot",
        server_host = %config.server_host,
        server_port = config.server_port,
        local_port = config.local_port,
        "pilot.ready"
    );

    if let Some(line) = cli.gesture {
        let gesture = parse_gesture_line(&line)?;
        sequencer.execute(gesture)?;
        return Ok(());
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();
    loop {
        write!(stdout, "{PROMPT}")?;
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("q") {
            break;
        }

        let mut parts = trimmed.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();
        match sequencer.send_gesture(name, &args) {
            Ok(report) => writeln!(
                stdout,
                "{}: sent {}, skipped {}, estimate {}",
                report.gesture, report.sent, report.skipped, report.estimate
            )?,
            Err(err) => writeln!(stdout, "error: {err}")?,
        }
    }

    info!(target: "robot::pilot", "pilot.closing_socket");
    Ok(())
}
