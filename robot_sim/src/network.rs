use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, TryRecvError};
use robot_runtime::{decode, CommandReceiver, Datagram};
use tracing::{trace, warn};

use crate::slot::LatestCommandSlot;

/// Counters kept by the receive loop, returned when it exits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverStats {
    pub datagrams: u64,
    pub published: u64,
    /// Commands overwritten in the slot before a tick could read them.
    pub superseded: u64,
    /// Frames that failed to decode.
    pub dropped: u64,
    pub io_errors: u64,
}

/// Spawn the receive loop on its own thread.
///
/// The loop polls the non-blocking socket back to back, yielding the thread
/// when nothing is waiting, and exits once `shutdown` is signalled or its
/// sender is dropped. The socket is closed when the loop returns.
pub fn spawn_receive_loop(
    receiver: CommandReceiver,
    slot: Arc<LatestCommandSlot>,
    shutdown: Receiver<()>,
) -> JoinHandle<ReceiverStats> {
    thread::spawn(move || run_receive_loop(receiver, &slot, &shutdown))
}

fn run_receive_loop(
    mut receiver: CommandReceiver,
    slot: &LatestCommandSlot,
    shutdown: &Receiver<()>,
) -> ReceiverStats {
    let mut stats = ReceiverStats::default();
    loop {
        if !matches!(shutdown.try_recv(), Err(TryRecvError::Empty)) {
            break;
        }
        match receiver.poll() {
            Ok(Some(datagram)) => handle_datagram(&datagram, slot, &mut stats),
            Ok(None) => thread::yield_now(),
            Err(err) => {
                stats.io_errors += 1;
                warn!(target: "robot::actor", error = %err, "receive.io_error");
                thread::yield_now();
            }
        }
    }
    stats
}

fn handle_datagram(datagram: &Datagram, slot: &LatestCommandSlot, stats: &mut ReceiverStats) {
    stats.datagrams += 1;
    match decode(&datagram.payload) {
        Ok(command) => {
            trace!(
                target: "robot::actor",
                from = %datagram.from,
                %command,
                "command.received"
            );
            stats.published += 1;
            if slot.publish(command).is_some() {
                stats.superseded += 1;
            }
        }
        Err(err) => {
            stats.dropped += 1;
            warn!(
                target: "robot::actor",
                from = %datagram.from,
                payload = %String::from_utf8_lossy(&datagram.payload),
                error = %err,
                "command.dropped=decode_error"
            );
        }
    }
}
