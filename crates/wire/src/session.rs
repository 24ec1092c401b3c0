//! Session packet (ID 1), leading fields only.

use serde::Serialize;

use crate::codec::{ByteReader, ByteWriter};
use crate::error::DecodeError;
use crate::header::HEADER_SIZE;

/// Bytes of the session payload this crate decodes.
pub const SESSION_FIELDS_SIZE: usize = 8;
/// Full F1 22 session packet size (weather forecast, marshal zones, assists...).
pub const SESSION_PACKET_SIZE: usize = 632;

/// Session-level data (from packet ID 1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionData {
    /// 0 = clear, 1 = light cloud, 2 = overcast, 3 = light rain, 4 = heavy rain, 5 = storm.
    pub weather: u8,
    pub track_temperature: i8,
    pub air_temperature: i8,
    pub total_laps: u8,
    /// Track length in metres.
    pub track_length: u16,
    pub session_type: u8,
    /// -1 for unknown.
    pub track_id: i8,
}

impl SessionData {
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(SESSION_FIELDS_SIZE);
        w.put(self.weather)
            .put(self.track_temperature)
            .put(self.air_temperature)
            .put(self.total_laps)
            .put(self.track_length)
            .put(self.session_type)
            .put(self.track_id);
        w.into_inner()
    }
}

/// Parse the leading session fields.
///
/// # Errors
///
/// Returns [`DecodeError::TooShort`] when the buffer ends inside those fields.
pub fn parse_session_data(raw: &[u8]) -> Result<SessionData, DecodeError> {
    let need = HEADER_SIZE + SESSION_FIELDS_SIZE;
    if raw.len() < need {
        return Err(DecodeError::too_short("session packet", need, raw.len()));
    }
    let mut r = ByteReader::at(raw, HEADER_SIZE);
    Ok(SessionData {
        weather: r.u8()?,           // 0
        track_temperature: r.i8()?, // 1
        air_temperature: r.i8()?,   // 2
        total_laps: r.u8()?,        // 3
        track_length: r.u16_le()?,  // 4-5
        session_type: r.u8()?,      // 6
        track_id: r.i8()?,          // 7
    })
}
