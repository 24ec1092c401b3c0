//! Session History packet (ID 11).
//!
//! Sent for one car at a time, cycling through the grid. Carries the
//! authoritative times of every lap that car has completed.
//!
//! Payload layout:
//!
//! | Offset | Size      | Field                                  |
//! |--------|-----------|----------------------------------------|
//! | 24     | 1         | car index                              |
//! | 25     | 1         | number of laps (including current)     |
//! | 26     | 1         | number of tyre stints                  |
//! | 27..31 | 4 × u8    | best lap / s1 / s2 / s3 lap numbers    |
//! | 31     | 100 × 11  | lap history entries                    |
//! | 1131   | 8 × 3     | tyre stint history (not decoded)       |

use serde::Serialize;

use crate::codec::{ByteReader, ByteWriter};
use crate::error::DecodeError;
use crate::header::HEADER_SIZE;

pub const HISTORY_LEAD_IN_SIZE: usize = 7;
pub const HISTORY_ENTRIES_OFFSET: usize = HEADER_SIZE + HISTORY_LEAD_IN_SIZE;
/// Size of one LapHistoryData entry.
pub const LAP_HISTORY_ENTRY_SIZE: usize = 11;
pub const MAX_HISTORY_LAPS: usize = 100;
pub const MAX_TYRE_STINTS: usize = 8;
pub const TYRE_STINT_ENTRY_SIZE: usize = 3;
/// Full F1 22 session history packet size.
pub const SESSION_HISTORY_PACKET_SIZE: usize = HISTORY_ENTRIES_OFFSET
    + MAX_HISTORY_LAPS * LAP_HISTORY_ENTRY_SIZE
    + MAX_TYRE_STINTS * TYRE_STINT_ENTRY_SIZE;

pub const LAP_VALID_BIT: u8 = 0x01;
pub const SECTOR1_VALID_BIT: u8 = 0x02;
pub const SECTOR2_VALID_BIT: u8 = 0x04;
pub const SECTOR3_VALID_BIT: u8 = 0x08;

/// One completed (or in-progress) lap from the history packet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LapHistoryEntry {
    pub lap_time_ms: u32,
    pub sector1_time_ms: u16,
    pub sector2_time_ms: u16,
    pub sector3_time_ms: u16,
    pub valid_flags: u8,
}

impl LapHistoryEntry {
    pub fn is_lap_valid(&self) -> bool {
        self.valid_flags & LAP_VALID_BIT != 0
    }

    pub fn is_sector3_valid(&self) -> bool {
        self.valid_flags & SECTOR3_VALID_BIT != 0
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(LAP_HISTORY_ENTRY_SIZE);
        w.put(self.lap_time_ms)
            .put(self.sector1_time_ms)
            .put(self.sector2_time_ms)
            .put(self.sector3_time_ms)
            .put(self.valid_flags);
        w.into_inner()
    }
}

/// Decoded session history for one car.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SessionHistory {
    pub car_idx: u8,
    pub num_laps: u8,
    pub num_tyre_stints: u8,
    pub best_lap_time_lap_num: u8,
    pub best_sector1_lap_num: u8,
    pub best_sector2_lap_num: u8,
    pub best_sector3_lap_num: u8,
    /// Exactly `num_laps` entries, lap 1 first.
    pub laps: Vec<LapHistoryEntry>,
}

impl SessionHistory {
    /// Entry for 1-based lap number `lap_num`.
    pub fn lap(&self, lap_num: u8) -> Option<&LapHistoryEntry> {
        usize::from(lap_num)
            .checked_sub(1)
            .and_then(|i| self.laps.get(i))
    }
}

/// Parse the lead-in and the first `num_laps` entries.
///
/// # Errors
///
/// Returns [`DecodeError::TooShort`] when the lead-in or any of the announced
/// entries does not fit in the buffer.
pub fn parse_session_history(raw: &[u8]) -> Result<SessionHistory, DecodeError> {
    if raw.len() < HISTORY_ENTRIES_OFFSET {
        return Err(DecodeError::too_short(
            "session history lead-in",
            HISTORY_ENTRIES_OFFSET,
            raw.len(),
        ));
    }
    let mut r = ByteReader::at(raw, HEADER_SIZE);
    let car_idx = r.u8()?;
    let num_laps = r.u8()?;
    let num_tyre_stints = r.u8()?;
    let best_lap_time_lap_num = r.u8()?;
    let best_sector1_lap_num = r.u8()?;
    let best_sector2_lap_num = r.u8()?;
    let best_sector3_lap_num = r.u8()?;

    let need = HISTORY_ENTRIES_OFFSET
        .saturating_add(usize::from(num_laps).saturating_mul(LAP_HISTORY_ENTRY_SIZE));
    if raw.len() < need {
        return Err(DecodeError::too_short(
            "session history entries",
            need,
            raw.len(),
        ));
    }

    let mut laps = Vec::with_capacity(usize::from(num_laps));
    for _ in 0..num_laps {
        laps.push(LapHistoryEntry {
            lap_time_ms: r.u32_le()?,
            sector1_time_ms: r.u16_le()?,
            sector2_time_ms: r.u16_le()?,
            sector3_time_ms: r.u16_le()?,
            valid_flags: r.u8()?,
        });
    }

    Ok(SessionHistory {
        car_idx,
        num_laps,
        num_tyre_stints,
        best_lap_time_lap_num,
        best_sector1_lap_num,
        best_sector2_lap_num,
        best_sector3_lap_num,
        laps,
    })
}
