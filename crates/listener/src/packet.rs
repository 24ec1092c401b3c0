//! Raw packets handed to subscribers.

use std::net::SocketAddr;

use paddock_wire::{PacketHeader, PacketKind};

/// An accepted datagram, copied out of the receive buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPacket {
    pub header: PacketHeader,
    pub kind: PacketKind,
    /// Sender of the datagram (the game's host).
    pub source: SocketAddr,
    /// The full datagram, header included.
    pub bytes: Vec<u8>,
}

impl RawPacket {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
