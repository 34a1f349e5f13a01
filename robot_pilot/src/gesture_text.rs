use robot_runtime::Command;

use crate::gesture::{Gesture, GestureError};

/// Parse an operator line such as `run left 8` or `jump right`.
pub fn parse_gesture_line(input: &str) -> Result<Gesture, GestureError> {
    let mut parts = input.split_whitespace();
    let name = parts
        .next()
        .ok_or(GestureError::MissingArgument("gesture"))?;
    let args: Vec<&str> = parts.collect();
    parse_gesture(name, &args)
}

/// Parse a gesture from its name and positional arguments.
///
/// Only the syntax is checked here; lateral-only directions and speed limits
/// are enforced when the gesture is planned.
pub fn parse_gesture(name: &str, args: &[&str]) -> Result<Gesture, GestureError> {
    let verb = name.trim().to_ascii_lowercase();
    let mut args = args.iter().copied();

    let gesture = match verb.as_str() {
        "jump" => {
            let drift = args
                .next()
                .map(|token| parse_direction("jump", token))
                .transpose()?;
            Ok(Gesture::Jump(drift))
        }
        "dodge" => {
            let token = args
                .next()
                .ok_or(GestureError::MissingArgument("direction"))?;
            Ok(Gesture::Dodge(parse_direction("dodge", token)?))
        }
        "run" => {
            let token = args
                .next()
                .ok_or(GestureError::MissingArgument("direction"))?;
            let direction = parse_direction("run", token)?;
            let speed_str = args.next().ok_or(GestureError::MissingArgument("speed"))?;
            let speed = speed_str
                .parse::<f64>()
                .map_err(|_| GestureError::InvalidSpeed(speed_str.to_string()))?;
            Ok(Gesture::Run(direction, speed))
        }
        "walk" => {
            let token = args
                .next()
                .ok_or(GestureError::MissingArgument("direction"))?;
            Ok(Gesture::Walk(parse_direction("walk", token)?))
        }
        "step" => {
            let token = args
                .next()
                .ok_or(GestureError::MissingArgument("direction"))?;
            Ok(Gesture::Step(parse_direction("step", token)?))
        }
        other => other
            .parse::<Command>()
            .map(Gesture::Step)
            .map_err(|_| GestureError::UnknownGesture(other.to_string())),
    }?;

    let extra: Vec<&str> = args.collect();
    if !extra.is_empty() {
        return Err(GestureError::UnexpectedArgument {
            gesture: gesture.name(),
            argument: extra.join(" "),
        });
    }
    Ok(gesture)
}

fn parse_direction(gesture: &'static str, token: &str) -> Result<Command, GestureError> {
    token
        .parse::<Command>()
        .map_err(|_| GestureError::InvalidDirection {
            gesture,
            direction: token.to_string(),
        })
}
