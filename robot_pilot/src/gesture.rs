use std::fmt;
use std::time::Duration;

use robot_runtime::{Arena, Command, Position};
use thiserror::Error;

/// High-level movement intent issued by the operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Rise and fall `jump_height` steps, optionally drifting sideways.
    Jump(Option<Command>),
    /// Lateral out-and-back; net zero when nothing is in the way.
    Dodge(Command),
    /// `distance` steps paced at `speed` commands per second.
    Run(Command, f64),
    Walk(Command),
    /// One primitive command, sent immediately.
    Step(Command),
}

impl Gesture {
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Jump(_) => "jump",
            Gesture::Dodge(_) => "dodge",
            Gesture::Run(..) => "run",
            Gesture::Walk(_) => "walk",
            Gesture::Step(_) => "step",
        }
    }

    /// Expand the gesture into its timed command schedule.
    ///
    /// Only argument checks and the jump precondition look at `from`; bounds
    /// for the individual steps are checked later, one step at a time, by the
    /// sequencer.
    pub fn plan(
        &self,
        from: Position,
        arena: &Arena,
        tuning: &GestureTuning,
    ) -> Result<Vec<ScheduledStep>, GestureError> {
        match *self {
            Gesture::Jump(drift) => {
                if let Some(direction) = drift {
                    require_lateral(self.name(), direction)?;
                }
                if arena.at_top(from) {
                    return Err(GestureError::BoundaryRefused {
                        gesture: self.name(),
                        position: from,
                    });
                }
                let mut steps = Vec::new();
                for vertical in [Command::Up, Command::Down] {
                    for _ in 0..tuning.jump_height {
                        steps.push(ScheduledStep::new(vertical, tuning.gesture_tick));
                        if let Some(direction) = drift {
                            steps.push(ScheduledStep::new(direction, tuning.gesture_tick));
                        }
                    }
                }
                Ok(steps)
            }
            Gesture::Dodge(direction) => {
                require_lateral(self.name(), direction)?;
                let out = repeat(direction, tuning.distance, tuning.gesture_tick);
                let back = repeat(direction.opposite(), tuning.distance, tuning.gesture_tick);
                Ok(out.chain(back).collect())
            }
            Gesture::Run(direction, speed) => {
                let pause = pace(speed)?;
                Ok(repeat(direction, tuning.distance, pause).collect())
            }
            Gesture::Walk(direction) => {
                let pause = pace(tuning.walk_speed)?;
                Ok(repeat(direction, tuning.distance, pause).collect())
            }
            Gesture::Step(direction) => Ok(vec![ScheduledStep::new(direction, Duration::ZERO)]),
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gesture::Jump(None) => write!(f, "jump"),
            Gesture::Jump(Some(direction)) => write!(f, "jump {direction}"),
            Gesture::Dodge(direction) => write!(f, "dodge {direction}"),
            Gesture::Run(direction, speed) => write!(f, "run {direction} {speed}"),
            Gesture::Walk(direction) => write!(f, "walk {direction}"),
            Gesture::Step(direction) => write!(f, "{direction}"),
        }
    }
}

/// One command of a gesture and the pause that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledStep {
    pub command: Command,
    pub delay: Duration,
}

impl ScheduledStep {
    pub fn new(command: Command, delay: Duration) -> Self {
        Self { command, delay }
    }
}

/// Gesture shape parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureTuning {
    /// Ascent (and descent) command count of a jump.
    pub jump_height: u32,
    /// Command count of one dodge leg, a run or a walk.
    pub distance: u32,
    /// Commands per second for `walk`.
    pub walk_speed: f64,
    /// Pause after each jump or dodge command.
    pub gesture_tick: Duration,
}

impl Default for GestureTuning {
    fn default() -> Self {
        Self {
            jump_height: 10,
            distance: 10,
            walk_speed: 5.0,
            gesture_tick: Duration::from_millis(50),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GestureError {
    #[error("invalid direction '{direction}' for {gesture}")]
    InvalidDirection {
        gesture: &'static str,
        direction: String,
    },
    #[error("invalid speed '{0}': expected a positive number")]
    InvalidSpeed(String),
    #[error("{gesture} refused at {position}: arena boundary reached")]
    BoundaryRefused {
        gesture: &'static str,
        position: Position,
    },
    #[error("unknown gesture '{0}'")]
    UnknownGesture(String),
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),
    #[error("unexpected argument '{argument}' for {gesture}")]
    UnexpectedArgument {
        gesture: &'static str,
        argument: String,
    },
}

fn require_lateral(gesture: &'static str, direction: Command) -> Result<(), GestureError> {
    if direction.is_lateral() {
        Ok(())
    } else {
        Err(GestureError::InvalidDirection {
            gesture,
            direction: direction.to_string(),
        })
    }
}

fn pace(speed: f64) -> Result<Duration, GestureError> {
    if !(speed.is_finite() && speed > 0.0) {
        return Err(GestureError::InvalidSpeed(speed.to_string()));
    }
    Duration::try_from_secs_f64(speed.recip())
        .map_err(|_| GestureError::InvalidSpeed(speed.to_string()))
}

fn repeat(
    command: Command,
    count: u32,
    delay: Duration,
) -> impl Iterator<Item = ScheduledStep> {
    (0..count).map(move |_| ScheduledStep::new(command, delay))
}
