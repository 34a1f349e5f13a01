//! Shared runtime contracts for the robot teleoperation link.
//!
//! Both the actor (`robot_sim`) and the pilot (`robot_pilot`) depend on this
//! crate so they agree on the wire format, the arena bounds and the transport
//! endpoints without pulling in either side's loop machinery.

pub mod arena;
pub mod commands;
pub mod transport;

pub use arena::{validate, Arena, ArenaError, Position};
pub use commands::{decode, encode, Command, DecodeError, CHANNEL_TAG};
pub use transport::{CommandReceiver, CommandSink, Datagram, TransportError, UdpCommandSender};
