use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Leading field of every control frame.
pub const CHANNEL_TAG: &str = "controle";

/// Primitive movement command; one atomic step of the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Up,
    Down,
    Left,
    Right,
}

impl Command {
    pub const ALL: [Command; 4] = [Command::Up, Command::Down, Command::Left, Command::Right];

    /// Lowercase direction name used on the wire.
    pub fn name(self) -> &'static str {
        match self {
            Command::Up => "up",
            Command::Down => "down",
            Command::Left => "left",
            Command::Right => "right",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Command::Up => Command::Down,
            Command::Down => Command::Up,
            Command::Left => Command::Right,
            Command::Right => Command::Left,
        }
    }

    pub fn is_lateral(self) -> bool {
        matches!(self, Command::Left | Command::Right)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = DecodeError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Command::Up),
            "down" => Ok(Command::Down),
            "left" => Ok(Command::Left),
            "right" => Ok(Command::Right),
            other => Err(DecodeError::UnknownCommand(other.to_string())),
        }
    }
}

/// Error returned when an incoming frame cannot be turned into a [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
}

/// Encode a command into its wire frame, `controle;<direction>`.
pub fn encode(command: Command) -> Vec<u8> {
    format!("{CHANNEL_TAG};{}", command.name()).into_bytes()
}

/// Decode a wire frame.
///
/// Surrounding whitespace and letter case are ignored, so frames typed by hand
/// (`"  CONTROLE;Left\n"`) decode the same as generated ones.
pub fn decode(bytes: &[u8]) -> Result<Command, DecodeError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| DecodeError::MalformedFrame(format!("not utf-8: {err}")))?;
    let normalized = text.trim().to_ascii_lowercase();

    let mut fields = normalized.split(';');
    let tag = fields.next().unwrap_or_default().trim();
    let Some(direction) = fields.next() else {
        return Err(DecodeError::MalformedFrame(normalized.clone()));
    };
    if tag != CHANNEL_TAG {
        return Err(DecodeError::MalformedFrame(format!(
            "unexpected channel '{tag}'"
        )));
    }

    direction.parse()
}
