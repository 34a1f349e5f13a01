//! UDP endpoints for the control channel.
//!
//! Delivery is fire-and-forget in both directions: no acknowledgement, no
//! retry, no ordering beyond what the datagram socket happens to give.

use std::io;
use std::net::{SocketAddr, UdpSocket};

use thiserror::Error;

use crate::commands::{encode, Command};

/// Largest frame the receiver reads in one call.
pub const MAX_DATAGRAM_LEN: usize = 4096;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to bind {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to send '{command}' to {remote}: {source}")]
    SendFailed {
        command: Command,
        remote: SocketAddr,
        #[source]
        source: io::Error,
    },
}

/// Anything a gesture can push primitive commands into.
pub trait CommandSink {
    fn send(&mut self, command: Command) -> Result<(), TransportError>;
}

/// Connectionless sender owned by the pilot.
#[derive(Debug)]
pub struct UdpCommandSender {
    socket: UdpSocket,
    remote: SocketAddr,
}

impl UdpCommandSender {
    pub fn bind(local: SocketAddr, remote: SocketAddr) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(local).map_err(|source| TransportError::BindFailed {
            addr: local,
            source,
        })?;
        Ok(Self { socket, remote })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    pub fn remote(&self) -> SocketAddr {
        self.remote
    }

    /// Send an arbitrary payload; used to probe the receiver with raw frames.
    pub fn send_raw(&self, payload: &[u8]) -> io::Result<usize> {
        self.socket.send_to(payload, self.remote)
    }
}

impl CommandSink for UdpCommandSender {
    fn send(&mut self, command: Command) -> Result<(), TransportError> {
        self.send_raw(&encode(command))
            .map(|_| ())
            .map_err(|source| TransportError::SendFailed {
                command,
                remote: self.remote,
                source,
            })
    }
}

/// One frame as it came off the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub payload: Vec<u8>,
    pub from: SocketAddr,
}

/// Non-blocking receiver owned by the actor's receive loop.
#[derive(Debug)]
pub struct CommandReceiver {
    socket: UdpSocket,
    buffer: Box<[u8; MAX_DATAGRAM_LEN]>,
}

impl CommandReceiver {
    pub fn bind(local: SocketAddr) -> Result<Self, TransportError> {
        let bind_failed = |source| TransportError::BindFailed {
            addr: local,
            source,
        };
        let socket = UdpSocket::bind(local).map_err(bind_failed)?;
        socket.set_nonblocking(true).map_err(bind_failed)?;
        Ok(Self {
            socket,
            buffer: Box::new([0u8; MAX_DATAGRAM_LEN]),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Try to read one datagram without blocking.
    ///
    /// `Ok(None)` means nothing was waiting on the socket.
    pub fn poll(&mut self) -> io::Result<Option<Datagram>> {
        match self.socket.recv_from(self.buffer.as_mut_slice()) {
            Ok((len, from)) => Ok(Some(Datagram {
                payload: self.buffer[..len].to_vec(),
                from,
            })),
            Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(err) => Err(err),
        }
    }
}
