//! Lap Data packet (ID 2).
//!
//! The payload is 22 fixed-size `LapData` entries followed by two trailing
//! bytes (time-trial PB and rival car indices). Only the player's entry is
//! decoded.
//!
//! Entry layout (43 bytes):
//!
//! | Offset | Type | Field                          |
//! |--------|------|--------------------------------|
//! | 0      | u32  | last lap time (ms)             |
//! | 4      | u32  | current lap time (ms)          |
//! | 8      | u16  | sector 1 time (ms)             |
//! | 10     | u16  | sector 2 time (ms)             |
//! | 12     | f32  | lap distance (m)               |
//! | 16     | f32  | total distance (m)             |
//! | 20     | f32  | safety car delta (s)           |
//! | 24..38 | u8   | 14 single-byte status fields   |
//! | 38     | u16  | pit lane time in lane (ms)     |
//! | 40     | u16  | pit stop timer (ms)            |
//! | 42     | u8   | pit stop should serve penalty  |

use serde::Serialize;

use crate::codec::{ByteReader, ByteWriter};
use crate::error::DecodeError;
use crate::header::{HEADER_SIZE, NUM_CARS};

/// Size of one LapData entry (43 bytes).
pub const LAP_DATA_ENTRY_SIZE: usize = 43;
/// Full F1 22 lap data packet: header, 22 entries, two trailing car indices.
pub const LAP_DATA_PACKET_SIZE: usize = HEADER_SIZE + NUM_CARS * LAP_DATA_ENTRY_SIZE + 2;

pub const OFF_LAST_LAP_TIME: usize = 0;
pub const OFF_CURRENT_LAP_NUM: usize = 25;
pub const OFF_SECTOR: usize = 28;
pub const OFF_CURRENT_LAP_INVALID: usize = 29;

/// Lap data for a single car.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LapDataEntry {
    pub last_lap_time_ms: u32,
    pub current_lap_time_ms: u32,
    pub sector1_time_ms: u16,
    pub sector2_time_ms: u16,
    pub lap_distance: f32,
    pub total_distance: f32,
    pub safety_car_delta: f32,
    pub car_position: u8,
    pub current_lap_num: u8,
    /// 0 = none, 1 = pitting, 2 = in pit area.
    pub pit_status: u8,
    pub num_pit_stops: u8,
    /// 0 = sector 1, 1 = sector 2, 2 = sector 3.
    pub sector: u8,
    /// 0 = valid, 1 = invalid.
    pub current_lap_invalid: u8,
    pub penalties: u8,
    pub warnings: u8,
    pub num_unserved_drive_through_pens: u8,
    pub num_unserved_stop_go_pens: u8,
    pub grid_position: u8,
    pub driver_status: u8,
    pub result_status: u8,
    pub pit_lane_timer_active: u8,
    pub pit_lane_time_in_lane_ms: u16,
    pub pit_stop_timer_ms: u16,
    pub pit_stop_should_serve_pen: u8,
}

impl LapDataEntry {
    pub fn is_current_lap_invalid(&self) -> bool {
        self.current_lap_invalid != 0
    }

    /// Encode into the 43-byte entry layout.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(LAP_DATA_ENTRY_SIZE);
        w.put(self.last_lap_time_ms)
            .put(self.current_lap_time_ms)
            .put(self.sector1_time_ms)
            .put(self.sector2_time_ms)
            .put(self.lap_distance)
            .put(self.total_distance)
            .put(self.safety_car_delta)
            .put(self.car_position)
            .put(self.current_lap_num)
            .put(self.pit_status)
            .put(self.num_pit_stops)
            .put(self.sector)
            .put(self.current_lap_invalid)
            .put(self.penalties)
            .put(self.warnings)
            .put(self.num_unserved_drive_through_pens)
            .put(self.num_unserved_stop_go_pens)
            .put(self.grid_position)
            .put(self.driver_status)
            .put(self.result_status)
            .put(self.pit_lane_timer_active)
            .put(self.pit_lane_time_in_lane_ms)
            .put(self.pit_stop_timer_ms)
            .put(self.pit_stop_should_serve_pen);
        w.into_inner()
    }
}

/// Byte offset of car `car_index`'s entry.
pub fn lap_data_offset(car_index: usize) -> usize {
    HEADER_SIZE.saturating_add(car_index.saturating_mul(LAP_DATA_ENTRY_SIZE))
}

/// Parse the lap data entry for `car_index`.
///
/// Only the addressed entry has to fit; the rest of the packet is not
/// inspected.
///
/// # Errors
///
/// Returns [`DecodeError::CarIndexOutOfRange`] for indices past the grid and
/// [`DecodeError::TooShort`] when the entry does not fit in the buffer.
pub fn parse_lap_data(raw: &[u8], car_index: usize) -> Result<LapDataEntry, DecodeError> {
    if car_index >= NUM_CARS {
        return Err(DecodeError::CarIndexOutOfRange {
            index: car_index,
            max: NUM_CARS - 1,
        });
    }
    let offset = lap_data_offset(car_index);
    let need = offset.saturating_add(LAP_DATA_ENTRY_SIZE);
    if raw.len() < need {
        return Err(DecodeError::too_short("lap data entry", need, raw.len()));
    }

    let mut r = ByteReader::at(raw, offset);
    Ok(LapDataEntry {
        last_lap_time_ms: r.u32_le()?,               // 0-3
        current_lap_time_ms: r.u32_le()?,            // 4-7
        sector1_time_ms: r.u16_le()?,                // 8-9
        sector2_time_ms: r.u16_le()?,                // 10-11
        lap_distance: r.f32_le()?,                   // 12-15
        total_distance: r.f32_le()?,                 // 16-19
        safety_car_delta: r.f32_le()?,               // 20-23
        car_position: r.u8()?,                       // 24
        current_lap_num: r.u8()?,                    // 25
        pit_status: r.u8()?,                         // 26
        num_pit_stops: r.u8()?,                      // 27
        sector: r.u8()?,                             // 28
        current_lap_invalid: r.u8()?,                // 29
        penalties: r.u8()?,                          // 30
        warnings: r.u8()?,                           // 31
        num_unserved_drive_through_pens: r.u8()?,    // 32
        num_unserved_stop_go_pens: r.u8()?,          // 33
        grid_position: r.u8()?,                      // 34
        driver_status: r.u8()?,                      // 35
        result_status: r.u8()?,                      // 36
        pit_lane_timer_active: r.u8()?,              // 37
        pit_lane_time_in_lane_ms: r.u16_le()?,       // 38-39
        pit_stop_timer_ms: r.u16_le()?,              // 40-41
        pit_stop_should_serve_pen: r.u8()?,          // 42
    })
}
