//! Participants packet (ID 4).

use serde::Serialize;

use crate::codec::{ByteReader, ByteWriter};
use crate::error::DecodeError;
use crate::header::{HEADER_SIZE, NUM_CARS};

/// `m_numActiveCars` sits before the entry array.
pub const NUM_ACTIVE_CARS_OFFSET: usize = HEADER_SIZE;
pub const PARTICIPANTS_ARRAY_OFFSET: usize = HEADER_SIZE + 1;
/// Size of one ParticipantData entry (56 bytes).
pub const PARTICIPANT_ENTRY_SIZE: usize = 56;
pub const NAME_LEN: usize = 48;
/// Full F1 22 participants packet size.
pub const PARTICIPANTS_PACKET_SIZE: usize =
    PARTICIPANTS_ARRAY_OFFSET + NUM_CARS * PARTICIPANT_ENTRY_SIZE;

pub const OFF_TEAM_ID: usize = 3;
pub const OFF_NAME: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ParticipantEntry {
    pub ai_controlled: u8,
    pub driver_id: u8,
    pub network_id: u8,
    pub team_id: u8,
    pub my_team: u8,
    pub race_number: u8,
    pub nationality: u8,
    /// Driver name up to the first NUL; invalid UTF-8 is replaced.
    pub name: String,
    pub your_telemetry: u8,
}

impl ParticipantEntry {
    /// Encode into the 56-byte entry layout. Names longer than the field are
    /// cut at the byte limit (the last byte stays NUL).
    pub fn encode(&self) -> Vec<u8> {
        let mut name = [0u8; NAME_LEN];
        for (dst, src) in name
            .iter_mut()
            .zip(self.name.as_bytes())
            .take(NAME_LEN - 1)
        {
            *dst = *src;
        }
        let mut w = ByteWriter::with_capacity(PARTICIPANT_ENTRY_SIZE);
        w.put(self.ai_controlled)
            .put(self.driver_id)
            .put(self.network_id)
            .put(self.team_id)
            .put(self.my_team)
            .put(self.race_number)
            .put(self.nationality)
            .bytes(&name)
            .put(self.your_telemetry);
        w.into_inner()
    }
}

fn participant_offset(car_index: usize) -> usize {
    PARTICIPANTS_ARRAY_OFFSET.saturating_add(car_index.saturating_mul(PARTICIPANT_ENTRY_SIZE))
}

fn decode_name(raw: &[u8; NAME_LEN]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
    String::from_utf8_lossy(raw.get(..end).unwrap_or_default()).into_owned()
}

/// Read `m_numActiveCars`.
///
/// # Errors
///
/// Returns [`DecodeError::OutOfBounds`] for a header-only buffer.
pub fn parse_num_active_cars(raw: &[u8]) -> Result<u8, DecodeError> {
    crate::codec::read_at(raw, NUM_ACTIVE_CARS_OFFSET)
}

/// Parse the participant entry for `car_index`.
///
/// The entry is bounds-checked as a whole before any field is read.
///
/// # Errors
///
/// Returns [`DecodeError::CarIndexOutOfRange`] for indices past the grid and
/// [`DecodeError::TooShort`] when the entry does not fit in the buffer.
pub fn parse_participant(raw: &[u8], car_index: usize) -> Result<ParticipantEntry, DecodeError> {
    if car_index >= NUM_CARS {
        return Err(DecodeError::CarIndexOutOfRange {
            index: car_index,
            max: NUM_CARS - 1,
        });
    }
    let offset = participant_offset(car_index);
    let need = offset.saturating_add(PARTICIPANT_ENTRY_SIZE);
    if raw.len() < need {
        return Err(DecodeError::too_short("participant entry", need, raw.len()));
    }

    let mut r = ByteReader::at(raw, offset);
    Ok(ParticipantEntry {
        ai_controlled: r.u8()?,
        driver_id: r.u8()?,
        network_id: r.u8()?,
        team_id: r.u8()?,
        my_team: r.u8()?,
        race_number: r.u8()?,
        nationality: r.u8()?,
        name: decode_name(&r.u8_array::<NAME_LEN>()?),
        your_telemetry: r.u8()?,
    })
}
