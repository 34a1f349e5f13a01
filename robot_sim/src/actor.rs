use robot_runtime::{Arena, Command, Position};

use crate::slot::LatestCommandSlot;

/// Authoritative actor state. Only the tick loop mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    position: Position,
    /// Direction of the last applied move, kept for sprite orientation.
    facing: Option<Command>,
}

/// Result of offering a command to the actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Moved,
    Blocked,
}

impl Actor {
    pub fn spawn(position: Position) -> Self {
        Self {
            position,
            facing: None,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn facing(&self) -> Option<Command> {
        self.facing
    }

    pub fn apply(&mut self, command: Command, arena: &Arena) -> ApplyOutcome {
        match arena.try_move(self.position, command) {
            Some(next) => {
                self.position = next;
                self.facing = Some(command);
                ApplyOutcome::Moved
            }
            None => ApplyOutcome::Blocked,
        }
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub tick: u64,
    pub command: Option<Command>,
    pub outcome: Option<ApplyOutcome>,
    pub position: Position,
}

/// Actor plus the arena it lives in and a tick counter.
#[derive(Debug, Clone)]
pub struct Simulation {
    arena: Arena,
    actor: Actor,
    tick: u64,
}

impl Simulation {
    pub fn new(arena: Arena, spawn: Position) -> Self {
        Self {
            arena,
            actor: Actor::spawn(spawn),
            tick: 0,
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn into_actor(self) -> Actor {
        self.actor
    }

    /// Drain the slot and apply at most one command.
    pub fn on_tick(&mut self, slot: &LatestCommandSlot) -> TickReport {
        let command = slot.take();
        let outcome = command.map(|command| self.actor.apply(command, &self.arena));
        self.tick += 1;
        TickReport {
            tick: self.tick,
            command,
            outcome,
            position: self.actor.position(),
        }
    }
}
