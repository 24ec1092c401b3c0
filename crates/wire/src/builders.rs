//! Complete F1 22 datagrams for tests, fixtures and offline replay.
//!
//! Every builder lays out the full packet the game sends: all per-car arrays
//! are present, with the supplied entry in `player_index`'s slot and the
//! other slots zeroed.

use crate::codec::ByteWriter;
use crate::event::{EVENT_PACKET_SIZE, EventDetails};
use crate::header::{NO_CAR_INDEX, NUM_CARS, PACKET_FORMAT_2022, PacketHeader};
use crate::history::{LapHistoryEntry, SESSION_HISTORY_PACKET_SIZE};
use crate::lap_data::{LAP_DATA_ENTRY_SIZE, LAP_DATA_PACKET_SIZE, LapDataEntry};
use crate::participants::{PARTICIPANT_ENTRY_SIZE, PARTICIPANTS_PACKET_SIZE, ParticipantEntry};
use crate::session::{SESSION_PACKET_SIZE, SessionData};

pub const PACKET_ID_SESSION: u8 = 1;
pub const PACKET_ID_LAP_DATA: u8 = 2;
pub const PACKET_ID_EVENT: u8 = 3;
pub const PACKET_ID_PARTICIPANTS: u8 = 4;
pub const PACKET_ID_SESSION_HISTORY: u8 = 11;

/// Active cars reported by [`build_participants_packet`].
const FIXTURE_ACTIVE_CARS: u8 = 20;

/// Header as F1 22 v1.18 would send it, with no second player.
pub fn fixture_header(
    packet_format: u16,
    packet_id: u8,
    session_uid: u64,
    session_time: f32,
    player_index: u8,
) -> PacketHeader {
    PacketHeader {
        packet_format,
        game_major_version: 1,
        game_minor_version: 18,
        packet_version: 1,
        packet_id,
        session_uid,
        session_time,
        frame_identifier: 0,
        player_car_index: player_index,
        secondary_player_car_index: NO_CAR_INDEX,
    }
}

/// Encoded 24-byte header (see [`fixture_header`]).
pub fn build_header(
    packet_format: u16,
    packet_id: u8,
    session_uid: u64,
    session_time: f32,
    player_index: u8,
) -> Vec<u8> {
    fixture_header(
        packet_format,
        packet_id,
        session_uid,
        session_time,
        player_index,
    )
    .encode()
}

fn start_packet(
    packet_id: u8,
    session_uid: u64,
    session_time: f32,
    player_index: u8,
    size: usize,
) -> ByteWriter {
    let mut w = ByteWriter::with_capacity(size);
    w.bytes(&build_header(
        PACKET_FORMAT_2022,
        packet_id,
        session_uid,
        session_time,
        player_index,
    ));
    w
}

/// Append 22 entries of `entry_size` bytes, `entry` in the player's slot.
fn put_car_array(w: &mut ByteWriter, player_index: u8, entry: &[u8], entry_size: usize) {
    for idx in 0..NUM_CARS {
        let slot_end = w.len().saturating_add(entry_size);
        if idx == usize::from(player_index) {
            w.bytes(entry);
        }
        w.pad_to(slot_end);
    }
}

pub fn build_session_packet(session_uid: u64, player_index: u8, data: &SessionData) -> Vec<u8> {
    let mut w = start_packet(
        PACKET_ID_SESSION,
        session_uid,
        0.0,
        player_index,
        SESSION_PACKET_SIZE,
    );
    w.bytes(&data.encode()).pad_to(SESSION_PACKET_SIZE);
    w.into_inner()
}

pub fn build_lap_data_packet(
    session_uid: u64,
    session_time: f32,
    player_index: u8,
    entry: &LapDataEntry,
) -> Vec<u8> {
    let mut w = start_packet(
        PACKET_ID_LAP_DATA,
        session_uid,
        session_time,
        player_index,
        LAP_DATA_PACKET_SIZE,
    );
    put_car_array(&mut w, player_index, &entry.encode(), LAP_DATA_ENTRY_SIZE);
    // m_timeTrialPBCarIdx, m_timeTrialRivalCarIdx
    w.put(NO_CAR_INDEX).put(NO_CAR_INDEX);
    w.into_inner()
}

/// Event packet carrying `details`, padded to the full union size.
pub fn build_event_packet(session_uid: u64, player_index: u8, details: &EventDetails) -> Vec<u8> {
    build_event_packet_at(session_uid, 0.0, player_index, details)
}

pub fn build_event_packet_at(
    session_uid: u64,
    session_time: f32,
    player_index: u8,
    details: &EventDetails,
) -> Vec<u8> {
    let mut w = start_packet(
        PACKET_ID_EVENT,
        session_uid,
        session_time,
        player_index,
        EVENT_PACKET_SIZE,
    );
    w.bytes(&details.code().0)
        .bytes(&details.encode())
        .pad_to(EVENT_PACKET_SIZE);
    w.into_inner()
}

/// `FTLP` event for `vehicle_idx` with a lap time in seconds.
pub fn build_fastest_lap_event(
    session_uid: u64,
    player_index: u8,
    vehicle_idx: u8,
    lap_time_secs: f32,
) -> Vec<u8> {
    build_event_packet(
        session_uid,
        player_index,
        &EventDetails::FastestLap {
            vehicle_idx,
            lap_time: lap_time_secs,
        },
    )
}

pub fn build_participants_packet(
    session_uid: u64,
    player_index: u8,
    entry: &ParticipantEntry,
) -> Vec<u8> {
    let mut w = start_packet(
        PACKET_ID_PARTICIPANTS,
        session_uid,
        0.0,
        player_index,
        PARTICIPANTS_PACKET_SIZE,
    );
    w.put(FIXTURE_ACTIVE_CARS);
    put_car_array(&mut w, player_index, &entry.encode(), PARTICIPANT_ENTRY_SIZE);
    w.into_inner()
}

/// Session history for `car_idx` with `laps` (lap 1 first), sent to the
/// player at `player_index`. Entries past the 100-lap array are dropped.
pub fn build_session_history_packet(
    session_uid: u64,
    player_index: u8,
    car_idx: u8,
    laps: &[LapHistoryEntry],
) -> Vec<u8> {
    let num_laps = u8::try_from(laps.len().min(100)).unwrap_or(100);
    let mut w = start_packet(
        PACKET_ID_SESSION_HISTORY,
        session_uid,
        0.0,
        player_index,
        SESSION_HISTORY_PACKET_SIZE,
    );
    // car idx, num laps, num tyre stints, best lap / s1 / s2 / s3 lap nums
    w.put(car_idx).put(num_laps).put(1u8).put(0u8).put(0u8).put(0u8).put(0u8);
    for lap in laps.iter().take(usize::from(num_laps)) {
        w.bytes(&lap.encode());
    }
    w.pad_to(SESSION_HISTORY_PACKET_SIZE);
    w.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lap_data::parse_lap_data;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn builders_emit_full_packet_sizes() {
        let entry = LapDataEntry::default();
        assert_eq!(build_lap_data_packet(1, 0.0, 0, &entry).len(), LAP_DATA_PACKET_SIZE);
        assert_eq!(
            build_session_packet(1, 0, &SessionData::default()).len(),
            SESSION_PACKET_SIZE
        );
        assert_eq!(
            build_participants_packet(1, 0, &ParticipantEntry::default()).len(),
            PARTICIPANTS_PACKET_SIZE
        );
        assert_eq!(
            build_session_history_packet(1, 0, 0, &[]).len(),
            SESSION_HISTORY_PACKET_SIZE
        );
        assert_eq!(
            build_fastest_lap_event(1, 0, 0, 80.0).len(),
            EVENT_PACKET_SIZE
        );
    }

    #[test]
    fn lap_data_packet_size_is_972() {
        assert_eq!(LAP_DATA_PACKET_SIZE, 972);
    }

    #[test]
    fn other_slots_stay_zeroed() -> TestResult {
        let entry = LapDataEntry {
            current_lap_num: 9,
            ..LapDataEntry::default()
        };
        let raw = build_lap_data_packet(1, 0.0, 10, &entry);
        assert_eq!(parse_lap_data(&raw, 10)?.current_lap_num, 9);
        assert_eq!(parse_lap_data(&raw, 9)?, LapDataEntry::default());
        assert_eq!(parse_lap_data(&raw, 11)?, LapDataEntry::default());
        Ok(())
    }

    #[test]
    fn player_index_off_grid_leaves_array_empty() -> TestResult {
        let entry = LapDataEntry {
            current_lap_num: 9,
            ..LapDataEntry::default()
        };
        let raw = build_lap_data_packet(1, 0.0, NO_CAR_INDEX, &entry);
        assert_eq!(raw.len(), LAP_DATA_PACKET_SIZE);
        for idx in 0..NUM_CARS {
            assert_eq!(parse_lap_data(&raw, idx)?, LapDataEntry::default());
        }
        Ok(())
    }
}
