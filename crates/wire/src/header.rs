//! The 24-byte header shared by every F1 22 packet.

use serde::Serialize;

use crate::codec::{ByteReader, ByteWriter, read_at};
use crate::error::DecodeError;

/// `m_packetFormat` value sent by F1 22.
pub const PACKET_FORMAT_2022: u16 = 2022;
/// Size of the F1 22 packet header.
pub const HEADER_SIZE: usize = 24;
/// Grid size; every per-car array has this many entries.
pub const NUM_CARS: usize = 22;
/// Player car index sent when there is no such car (spectating, splitscreen slot unused).
pub const NO_CAR_INDEX: u8 = 255;
/// Largest datagram the game sends is well under this.
pub const MAX_DATAGRAM_BYTES: usize = 2048;

pub const OFF_PACKET_FORMAT: usize = 0;

/// Decoded packet header. Immutable; decoded fresh for every datagram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PacketHeader {
    pub packet_format: u16,
    pub game_major_version: u8,
    pub game_minor_version: u8,
    pub packet_version: u8,
    pub packet_id: u8,
    /// Opaque id of the game session; scopes all other data.
    pub session_uid: u64,
    /// Session timestamp in seconds.
    pub session_time: f32,
    pub frame_identifier: u32,
    pub player_car_index: u8,
    /// 255 when there is no second player.
    pub secondary_player_car_index: u8,
}

impl PacketHeader {
    /// The player car index if it addresses a slot on the grid.
    pub fn player_car(&self) -> Option<u8> {
        (usize::from(self.player_car_index) < NUM_CARS).then_some(self.player_car_index)
    }

    /// Encode back into the 24-byte wire layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(HEADER_SIZE);
        w.put(self.packet_format)
            .put(self.game_major_version)
            .put(self.game_minor_version)
            .put(self.packet_version)
            .put(self.packet_id)
            .put(self.session_uid)
            .put(self.session_time)
            .put(self.frame_identifier)
            .put(self.player_car_index)
            .put(self.secondary_player_car_index);
        w.into_inner()
    }
}

/// Parse the 24-byte packet header.
///
/// # Errors
///
/// Returns [`DecodeError::TooShort`] for buffers under [`HEADER_SIZE`] bytes;
/// nothing is read from such a buffer.
pub fn parse_header(raw: &[u8]) -> Result<PacketHeader, DecodeError> {
    if raw.len() < HEADER_SIZE {
        return Err(DecodeError::too_short("header", HEADER_SIZE, raw.len()));
    }
    let mut r = ByteReader::new(raw);
    Ok(PacketHeader {
        packet_format: r.u16_le()?,          // 0-1
        game_major_version: r.u8()?,         // 2
        game_minor_version: r.u8()?,         // 3
        packet_version: r.u8()?,             // 4
        packet_id: r.u8()?,                  // 5
        session_uid: r.u64_le()?,            // 6-13
        session_time: r.f32_le()?,           // 14-17
        frame_identifier: r.u32_le()?,       // 18-21
        player_car_index: r.u8()?,           // 22
        secondary_player_car_index: r.u8()?, // 23
    })
}

/// Read only `m_packetFormat`.
///
/// # Errors
///
/// Returns [`DecodeError::OutOfBounds`] for buffers under 2 bytes.
pub fn peek_packet_format(raw: &[u8]) -> Result<u16, DecodeError> {
    read_at(raw, OFF_PACKET_FORMAT)
}
