//! `paddockctl decode`: print one datagram's header and payload.

use anyhow::{Context, Result};
use colored::*;
use paddock_wire::catalog::{session_type_label, track_name, weather_label};
use paddock_wire::{
    EventPacket, LapDataEntry, PACKET_FORMAT_2022, PacketHeader, PacketKind, ParticipantEntry,
    SessionData, SessionHistory, classify, parse_event, parse_lap_data, parse_num_active_cars,
    parse_participant, parse_session_data, parse_session_history,
};
use serde::Serialize;

use crate::commands::DecodeArgs;
use crate::error::CliError;
use crate::output;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    Session {
        data: SessionData,
        track: &'static str,
        session_type: &'static str,
        weather: &'static str,
    },
    LapData {
        car: u8,
        entry: LapDataEntry,
    },
    Event(EventPacket),
    Participants {
        num_active_cars: u8,
        car: u8,
        entry: ParticipantEntry,
    },
    SessionHistory(SessionHistory),
    /// Classified but not a packet type this tool decodes.
    NotDecoded,
}

#[derive(Debug, Serialize)]
pub struct Decoded {
    pub header: PacketHeader,
    pub kind: PacketKind,
    pub len: usize,
    pub payload: Payload,
}

/// Decode a complete F1 22 datagram.
///
/// `car` selects the entry of per-car packets; it defaults to the header's
/// player car.
pub fn decode_datagram(raw: &[u8], car: Option<u8>) -> Result<Decoded, CliError> {
    let classified = classify(raw, PACKET_FORMAT_2022)?;
    let header = classified.header;
    let car_index = || {
        car.or_else(|| header.player_car()).ok_or_else(|| {
            CliError::InvalidConfiguration(
                "header has no player car; pass --car to pick one".to_string(),
            )
        })
    };

    let payload = match classified.kind {
        PacketKind::Session => {
            let data = parse_session_data(raw)?;
            Payload::Session {
                track: track_name(data.track_id),
                session_type: session_type_label(data.session_type),
                weather: weather_label(data.weather),
                data,
            }
        }
        PacketKind::LapData => {
            let car = car_index()?;
            Payload::LapData {
                car,
                entry: parse_lap_data(raw, usize::from(car))?,
            }
        }
        PacketKind::Event => Payload::Event(parse_event(raw)?),
        PacketKind::Participants => {
            let car = car_index()?;
            Payload::Participants {
                num_active_cars: parse_num_active_cars(raw)?,
                car,
                entry: parse_participant(raw, usize::from(car))?,
            }
        }
        PacketKind::SessionHistory => Payload::SessionHistory(parse_session_history(raw)?),
        _ => Payload::NotDecoded,
    };

    Ok(Decoded {
        header,
        kind: classified.kind,
        len: raw.len(),
        payload,
    })
}

pub fn execute(args: &DecodeArgs, json: bool) -> Result<()> {
    let raw = std::fs::read(&args.file)
        .with_context(|| format!("failed to read datagram '{}'", args.file.display()))?;
    if raw.is_empty() {
        return Err(CliError::NoInput(format!("'{}' is empty", args.file.display())).into());
    }
    let decoded = decode_datagram(&raw, args.car)?;

    if json {
        output::print_json_line(&decoded);
        return Ok(());
    }

    let h = &decoded.header;
    println!(
        "{} {:?} ({} bytes)",
        "Packet".bold(),
        decoded.kind,
        decoded.len
    );
    println!(
        "  format {} v{}.{} packet v{}",
        h.packet_format, h.game_major_version, h.game_minor_version, h.packet_version
    );
    println!(
        "  session {:#018x} at {:.3}s, frame {}",
        h.session_uid, h.session_time, h.frame_identifier
    );
    println!(
        "  player car {}, secondary {}",
        h.player_car_index, h.secondary_player_car_index
    );
    println!("{:#?}", decoded.payload);
    Ok(())
}
