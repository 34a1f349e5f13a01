use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::commands::Command;

/// Actor location in arena pixels; `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Bounded region the actor must stay inside, fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Arena {
    pub width: i32,
    pub height: i32,
    pub margin_x: i32,
    pub margin_y: i32,
    /// Distance covered by one primitive command.
    pub step: i32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            margin_x: 25,
            margin_y: 35,
            step: 10,
        }
    }
}

impl Arena {
    /// Reject shapes no actor could move in: a non-positive step or an empty
    /// margin rectangle.
    pub fn check(&self) -> Result<(), ArenaError> {
        if self.step <= 0 {
            return Err(ArenaError::NonPositiveStep(self.step));
        }
        let (Some(max_x), Some(max_y)) = (
            self.width.checked_sub(self.margin_x),
            self.height.checked_sub(self.margin_y),
        ) else {
            return Err(ArenaError::Empty(*self));
        };
        if self.margin_x > max_x || self.margin_y > max_y {
            return Err(ArenaError::Empty(*self));
        }
        Ok(())
    }

    pub fn min_x(&self) -> i32 {
        self.margin_x
    }

    pub fn max_x(&self) -> i32 {
        self.width.saturating_sub(self.margin_x)
    }

    pub fn min_y(&self) -> i32 {
        self.margin_y
    }

    pub fn max_y(&self) -> i32 {
        self.height.saturating_sub(self.margin_y)
    }

    pub fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    /// Displacement produced by one command.
    pub fn delta(&self, command: Command) -> (i32, i32) {
        match command {
            Command::Up => (0, -self.step),
            Command::Down => (0, self.step),
            Command::Left => (-self.step, 0),
            Command::Right => (self.step, 0),
        }
    }

    /// Candidate position after `command`, bounds not checked.
    ///
    /// `None` when the move would overflow the coordinate space.
    pub fn displace(&self, position: Position, command: Command) -> Option<Position> {
        let (dx, dy) = self.delta(command);
        Some(Position::new(
            position.x.checked_add(dx)?,
            position.y.checked_add(dy)?,
        ))
    }

    pub fn contains(&self, position: Position) -> bool {
        (self.min_x()..=self.max_x()).contains(&position.x)
            && (self.min_y()..=self.max_y()).contains(&position.y)
    }

    /// Position after `command` if the move stays inside the arena.
    pub fn try_move(&self, position: Position, command: Command) -> Option<Position> {
        let next = self.displace(position, command)?;
        self.contains(next).then_some(next)
    }

    /// True when the actor can no longer rise.
    pub fn at_top(&self, position: Position) -> bool {
        position.y <= self.min_y()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("arena step must be positive, got {0}")]
    NonPositiveStep(i32),
    #[error("arena {}x{} leaves no room inside margins ({}, {})", .0.width, .0.height, .0.margin_x, .0.margin_y)]
    Empty(Arena),
}

/// Single source of truth for "can this move happen".
///
/// The pilot calls it before sending (as a hint against its mirrored position)
/// and the actor calls it before applying (authoritatively).
pub fn validate(position: Position, command: Command, arena: &Arena) -> bool {
    arena.try_move(position, command).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> Arena {
        Arena::default()
    }

    #[test]
    fn interior_moves_are_accepted() {
        let arena = arena();
        let start = Position::new(400, 300);
        for command in Command::ALL {
            assert!(validate(start, command, &arena), "{command} from {start}");
        }
    }

    #[test]
    fn margins_are_inclusive() {
        let arena = arena();
        assert!(validate(Position::new(35, 300), Command::Left, &arena));
        assert!(!validate(Position::new(25, 300), Command::Left, &arena));
        assert!(validate(Position::new(765, 300), Command::Right, &arena));
        assert!(!validate(Position::new(775, 300), Command::Right, &arena));
        assert!(validate(Position::new(400, 45), Command::Up, &arena));
        assert!(!validate(Position::new(400, 35), Command::Up, &arena));
        assert!(validate(Position::new(400, 555), Command::Down, &arena));
        assert!(!validate(Position::new(400, 565), Command::Down, &arena));
    }

    #[test]
    fn validate_matches_displaced_point_everywhere() {
        let arena = Arena {
            width: 120,
            height: 90,
            margin_x: 10,
            margin_y: 15,
            step: 7,
        };
        for x in (-10..=130).step_by(3) {
            for y in (-10..=100).step_by(3) {
                let position = Position::new(x, y);
                for command in Command::ALL {
                    let next = arena.displace(position, command).unwrap();
                    let inside = next.x >= 10 && next.x <= 110 && next.y >= 15 && next.y <= 75;
                    assert_eq!(validate(position, command, &arena), inside);
                }
            }
        }
    }

    #[test]
    fn top_detection_uses_margin() {
        let arena = arena();
        assert!(arena.at_top(Position::new(400, 35)));
        assert!(arena.at_top(Position::new(400, 20)));
        assert!(!arena.at_top(Position::new(400, 36)));
    }

    #[test]
    fn moves_near_coordinate_limits_are_refused_not_overflowed() {
        let arena = arena();
        assert_eq!(arena.displace(Position::new(i32::MAX, 300), Command::Right), None);
        assert_eq!(arena.displace(Position::new(400, i32::MIN), Command::Up), None);
        assert!(!validate(Position::new(i32::MAX, 300), Command::Right, &arena));
        assert!(!validate(Position::new(400, i32::MIN), Command::Up, &arena));
    }

    #[test]
    fn default_arena_passes_check() {
        assert_eq!(arena().check(), Ok(()));
        let tight = Arena {
            width: 50,
            height: 70,
            ..arena()
        };
        assert_eq!(tight.check(), Ok(()));
        assert!(tight.contains(tight.center()));
    }

    #[test]
    fn check_rejects_zero_and_negative_step() {
        for step in [0, -10] {
            let arena = Arena { step, ..arena() };
            assert_eq!(arena.check(), Err(ArenaError::NonPositiveStep(step)));
        }
    }

    #[test]
    fn check_rejects_margins_wider_than_arena() {
        let narrow = Arena {
            width: 40,
            ..arena()
        };
        assert_eq!(narrow.check(), Err(ArenaError::Empty(narrow)));
        let short = Arena {
            height: 60,
            ..arena()
        };
        assert_eq!(short.check(), Err(ArenaError::Empty(short)));
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let arena: Arena = serde_json::from_str(r#"{ "step": 4 }"#).unwrap();
        assert_eq!(arena.step, 4);
        assert_eq!(arena.width, 800);
        assert_eq!(arena.margin_y, 35);
    }
}
