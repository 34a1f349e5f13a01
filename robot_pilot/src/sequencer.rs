//! Turns gestures into paced streams of primitive commands.
//!
//! Execution is synchronous: a call blocks for the whole schedule, so two
//! gestures never interleave on the wire.

use std::thread;
use std::time::Duration;

use robot_runtime::{Arena, CommandSink, Position};
use tracing::{debug, info, warn};

use crate::gesture::{Gesture, GestureError, GestureTuning};
use crate::gesture_text::parse_gesture;

/// Source of the pauses between scheduled commands.
pub trait Pacer {
    fn pause(&mut self, delay: Duration);
}

/// Sleeps the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&mut self, delay: Duration) {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

/// Outcome of one executed gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureReport {
    pub gesture: Gesture,
    pub sent: usize,
    /// Steps not sent because the estimate said they would leave the arena.
    pub skipped: usize,
    /// Steps the transport failed to send.
    pub failed: usize,
    pub estimate: Position,
}

/// Pilot-side driver owning the transport and a mirrored position estimate.
///
/// The estimate only decides whether a step is worth sending. The actor
/// re-validates every command it applies, and lost datagrams mean the two can
/// drift apart; [`GestureSequencer::resync`] realigns them.
pub struct GestureSequencer<S, P = ThreadPacer> {
    sink: S,
    pacer: P,
    arena: Arena,
    tuning: GestureTuning,
    estimate: Position,
}

impl<S: CommandSink, P: Pacer> GestureSequencer<S, P> {
    pub fn new(sink: S, pacer: P, arena: Arena, tuning: GestureTuning, start: Position) -> Self {
        Self {
            sink,
            pacer,
            arena,
            tuning,
            estimate: start,
        }
    }

    pub fn estimate(&self) -> Position {
        self.estimate
    }

    pub fn resync(&mut self, position: Position) {
        debug!(
            target: "robot::pilot",
            from = %self.estimate,
            to = %position,
            "estimate.resynced"
        );
        self.estimate = position;
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Parse `name` and `args` as a gesture and execute it.
    pub fn send_gesture(&mut self, name: &str, args: &[&str]) -> Result<GestureReport, GestureError> {
        let gesture = parse_gesture(name, args).map_err(|err| {
            warn!(target: "robot::pilot", name, error = %err, "gesture.rejected=parse");
            err
        })?;
        self.execute(gesture)
    }

    /// Run a gesture to completion.
    ///
    /// Argument errors and the jump precondition abort before anything is
    /// sent. Individual steps that would leave the arena are skipped, and
    /// steps the transport fails to send are dropped; neither stops the
    /// remaining schedule.
    pub fn execute(&mut self, gesture: Gesture) -> Result<GestureReport, GestureError> {
        let schedule = gesture
            .plan(self.estimate, &self.arena, &self.tuning)
            .map_err(|err| {
                warn!(
                    target: "robot::pilot",
                    %gesture,
                    estimate = %self.estimate,
                    error = %err,
                    "gesture.refused"
                );
                err
            })?;

        let mut report = GestureReport {
            gesture,
            sent: 0,
            skipped: 0,
            failed: 0,
            estimate: self.estimate,
        };

        for step in schedule {
            match self.arena.try_move(self.estimate, step.command) {
                Some(next) => match self.sink.send(step.command) {
                    Ok(()) => {
                        self.estimate = next;
                        report.sent += 1;
                    }
                    Err(err) => {
                        report.failed += 1;
                        warn!(
                            target: "robot::pilot",
                            %gesture,
                            command = %step.command,
                            error = %err,
                            "step.send_failed"
                        );
                    }
                },
                None => {
                    report.skipped += 1;
                    debug!(
                        target: "robot::pilot",
                        %gesture,
                        command = %step.command,
                        estimate = %self.estimate,
                        "step.skipped=out_of_bounds"
                    );
                }
            }
            self.pacer.pause(step.delay);
        }

        report.estimate = self.estimate;
        info!(
            target: "robot::pilot",
            %gesture,
            sent = report.sent,
            skipped = report.skipped,
            failed = report.failed,
            estimate = %report.estimate,
            "gesture.completed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::net::{IpAddr, Ipv4Addr, SocketAddr};

    use robot_runtime::{encode, Command, TransportError};

    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        frames: Vec<String>,
        /// Zero-based send attempts that fail.
        fail_on: Vec<usize>,
        attempts: usize,
    }

    impl CommandSink for RecordingSink {
        fn send(&mut self, command: Command) -> Result<(), TransportError> {
            let attempt = self.attempts;
            self.attempts += 1;
            if self.fail_on.contains(&attempt) {
                return Err(TransportError::SendFailed {
                    command,
                    remote: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 2024),
                    source: io::Error::new(io::ErrorKind::Other, "network unreachable"),
                });
            }
            self.frames
                .push(String::from_utf8(encode(command)).expect("ascii frame"));
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingPacer {
        pauses: Vec<Duration>,
    }

    impl Pacer for RecordingPacer {
        fn pause(&mut self, delay: Duration) {
            self.pauses.push(delay);
        }
    }

    fn sequencer_at(start: Position) -> GestureSequencer<RecordingSink, RecordingPacer> {
        GestureSequencer::new(
            RecordingSink::default(),
            RecordingPacer::default(),
            Arena::default(),
            GestureTuning::default(),
            start,
        )
    }

    fn count(frames: &[String], frame: &str) -> usize {
        frames.iter().filter(|sent| sent.as_str() == frame).count()
    }

    #[test]
    fn dodge_left_from_spawn_round_trips() {
        let mut sequencer = sequencer_at(Position::new(400, 500));

        let report = sequencer.send_gesture("dodge", &["left"]).unwrap();

        assert_eq!(report.sent, 20);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.estimate, Position::new(400, 500));
        insta::assert_snapshot!(sequencer.sink().frames.join("\n"), @r###"
        controle;left
        controle;left
        controle;left
        controle;left
        controle;left
        controle;left
        controle;left
        controle;left
        controle;left
        controle;left
        controle;right
        controle;right
        controle;right
        controle;right
        controle;right
        controle;right
        controle;right
        controle;right
        controle;right
        controle;right
        "###);
    }

    #[test]
    fn dodge_against_wall_leaves_partial_displacement() {
        let mut sequencer = sequencer_at(Position::new(65, 300));

        let report = sequencer.execute(Gesture::Dodge(Command::Left)).unwrap();

        assert_eq!(report.sent, 14);
        assert_eq!(report.skipped, 6);
        assert_eq!(report.estimate, Position::new(125, 300));
        assert_eq!(sequencer.pacer().pauses.len(), 20);
    }

    #[test]
    fn jump_at_top_margin_sends_nothing() {
        let mut sequencer = sequencer_at(Position::new(400, 35));

        let err = sequencer.send_gesture("jump", &[]).unwrap_err();

        assert!(matches!(err, GestureError::BoundaryRefused { .. }));
        assert!(sequencer.sink().frames.is_empty());
        assert!(sequencer.pacer().pauses.is_empty());
        assert_eq!(sequencer.estimate(), Position::new(400, 35));
    }

    #[test]
    fn jump_from_mid_arena_sends_ascent_and_descent() {
        let mut sequencer = sequencer_at(Position::new(400, 300));

        let report = sequencer.execute(Gesture::Jump(None)).unwrap();

        let frames = &sequencer.sink().frames;
        assert_eq!(frames.len(), 20);
        assert_eq!(count(frames, "controle;up"), 10);
        assert_eq!(count(frames, "controle;down"), 10);
        assert_eq!(report.estimate, Position::new(400, 300));
    }

    #[test]
    fn directional_jump_accumulates_drift() {
        let mut sequencer = sequencer_at(Position::new(400, 300));

        let report = sequencer.send_gesture("jump", &["right"]).unwrap();

        let frames = &sequencer.sink().frames;
        assert_eq!(report.sent, 40);
        assert_eq!(count(frames, "controle;up"), 10);
        assert_eq!(count(frames, "controle;down"), 10);
        assert_eq!(count(frames, "controle;right"), 20);
        assert_eq!(report.estimate, Position::new(600, 300));
    }

    #[test]
    fn jump_near_ceiling_skips_blocked_steps_and_continues() {
        let mut sequencer = sequencer_at(Position::new(400, 85));

        let report = sequencer.execute(Gesture::Jump(None)).unwrap();

        assert_eq!(report.sent, 15);
        assert_eq!(report.skipped, 5);
        assert_eq!(report.estimate, Position::new(400, 135));
    }

    #[test]
    fn invalid_speeds_send_nothing() {
        for speed in ["0", "-1"] {
            let mut sequencer = sequencer_at(Position::new(400, 300));
            let err = sequencer.send_gesture("run", &["right", speed]).unwrap_err();
            assert!(matches!(err, GestureError::InvalidSpeed(_)), "speed {speed}");
            assert!(sequencer.sink().frames.is_empty());
        }
    }

    #[test]
    fn run_paces_by_speed() {
        let mut sequencer = sequencer_at(Position::new(400, 300));

        sequencer.send_gesture("run", &["up", "10"]).unwrap();

        assert_eq!(sequencer.sink().frames.len(), 10);
        assert_eq!(
            sequencer.pacer().pauses,
            vec![Duration::from_millis(100); 10]
        );
        assert_eq!(sequencer.estimate(), Position::new(400, 200));
    }

    #[test]
    fn dodge_rejects_vertical_direction() {
        let mut sequencer = sequencer_at(Position::new(400, 300));
        let err = sequencer.send_gesture("dodge", &["up"]).unwrap_err();
        assert!(matches!(err, GestureError::InvalidDirection { .. }));
        assert!(sequencer.sink().frames.is_empty());
    }

    #[test]
    fn send_failures_are_dropped_and_schedule_continues() {
        let mut sequencer = GestureSequencer::new(
            RecordingSink {
                fail_on: vec![0, 3],
                ..RecordingSink::default()
            },
            RecordingPacer::default(),
            Arena::default(),
            GestureTuning::default(),
            Position::new(400, 300),
        );

        let report = sequencer.execute(Gesture::Walk(Command::Right)).unwrap();

        assert_eq!(report.sent, 8);
        assert_eq!(report.failed, 2);
        assert_eq!(report.estimate, Position::new(480, 300));
        assert_eq!(sequencer.pacer().pauses.len(), 10);
    }

    #[test]
    fn resync_moves_the_estimate() {
        let mut sequencer = sequencer_at(Position::new(400, 300));
        sequencer.resync(Position::new(400, 35));
        assert!(sequencer.send_gesture("jump", &[]).is_err());
    }
}
