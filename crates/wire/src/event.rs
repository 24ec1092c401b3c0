//! Event packet (ID 3).
//!
//! A 4-byte ASCII code at the start of the payload selects the layout of the
//! details union that follows it.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::codec::{ByteReader, ByteWriter};
use crate::error::DecodeError;
use crate::header::HEADER_SIZE;

pub const EVENT_CODE_OFFSET: usize = HEADER_SIZE;
pub const EVENT_DETAILS_OFFSET: usize = HEADER_SIZE + 4;
/// Full F1 22 event packet size (header, code, 12-byte details union).
pub const EVENT_PACKET_SIZE: usize = 40;

/// Four-character event code.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventCode(pub [u8; 4]);

impl EventCode {
    pub const SESSION_STARTED: Self = Self(*b"SSTA");
    pub const SESSION_ENDED: Self = Self(*b"SEND");
    pub const FASTEST_LAP: Self = Self(*b"FTLP");
    pub const RETIREMENT: Self = Self(*b"RTMT");
    pub const DRS_ENABLED: Self = Self(*b"DRSE");
    pub const DRS_DISABLED: Self = Self(*b"DRSD");
    pub const TEAM_MATE_IN_PITS: Self = Self(*b"TMPT");
    pub const CHEQUERED_FLAG: Self = Self(*b"CHQF");
    pub const RACE_WINNER: Self = Self(*b"RCWN");
    pub const PENALTY: Self = Self(*b"PENA");
    pub const SPEED_TRAP: Self = Self(*b"SPTP");
    pub const START_LIGHTS: Self = Self(*b"STLG");
    pub const LIGHTS_OUT: Self = Self(*b"LGOT");
    pub const DRIVE_THROUGH_SERVED: Self = Self(*b"DTSV");
    pub const STOP_GO_SERVED: Self = Self(*b"SGSV");
    pub const FLASHBACK: Self = Self(*b"FLBK");
    pub const BUTTONS: Self = Self(*b"BUTN");
}

impl fmt::Display for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", char::from(b))?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for EventCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventCode({self})")
    }
}

impl Serialize for EventCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Typed event details.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum EventDetails {
    SessionStarted,
    SessionEnded,
    /// Lap time in seconds.
    FastestLap { vehicle_idx: u8, lap_time: f32 },
    Retirement { vehicle_idx: u8 },
    DrsEnabled,
    DrsDisabled,
    TeamMateInPits { vehicle_idx: u8 },
    ChequeredFlag,
    RaceWinner { vehicle_idx: u8 },
    Penalty {
        penalty_type: u8,
        infringement_type: u8,
        vehicle_idx: u8,
        other_vehicle_idx: u8,
        time: u8,
        lap_num: u8,
        places_gained: u8,
    },
    SpeedTrap {
        vehicle_idx: u8,
        speed: f32,
        is_overall_fastest_in_session: u8,
        is_driver_fastest_in_session: u8,
        fastest_vehicle_idx_in_session: u8,
        fastest_speed_in_session: f32,
    },
    StartLights { num_lights: u8 },
    LightsOut,
    DriveThroughServed { vehicle_idx: u8 },
    StopGoServed { vehicle_idx: u8 },
    Flashback {
        frame_identifier: u32,
        session_time: f32,
    },
    Buttons { button_status: u32 },
    /// A code this crate does not know; details are not decoded.
    Other(EventCode),
}

impl EventDetails {
    /// The car the event is about, for the event types that name one.
    pub fn vehicle_idx(&self) -> Option<u8> {
        match *self {
            Self::FastestLap { vehicle_idx, .. }
            | Self::Retirement { vehicle_idx }
            | Self::TeamMateInPits { vehicle_idx }
            | Self::RaceWinner { vehicle_idx }
            | Self::Penalty { vehicle_idx, .. }
            | Self::SpeedTrap { vehicle_idx, .. }
            | Self::DriveThroughServed { vehicle_idx }
            | Self::StopGoServed { vehicle_idx } => Some(vehicle_idx),
            _ => None,
        }
    }

    /// Encode the details union (without the code), unpadded.
    pub fn encode(&self) -> Vec<u8> {
        let mut w = ByteWriter::with_capacity(12);
        match *self {
            Self::FastestLap {
                vehicle_idx,
                lap_time,
            } => {
                w.put(vehicle_idx).put(lap_time);
            }
            Self::Retirement { vehicle_idx }
            | Self::TeamMateInPits { vehicle_idx }
            | Self::RaceWinner { vehicle_idx }
            | Self::DriveThroughServed { vehicle_idx }
            | Self::StopGoServed { vehicle_idx } => {
                w.put(vehicle_idx);
            }
            Self::Penalty {
                penalty_type,
                infringement_type,
                vehicle_idx,
                other_vehicle_idx,
                time,
                lap_num,
                places_gained,
            } => {
                w.put(penalty_type)
                    .put(infringement_type)
                    .put(vehicle_idx)
                    .put(other_vehicle_idx)
                    .put(time)
                    .put(lap_num)
                    .put(places_gained);
            }
            Self::SpeedTrap {
                vehicle_idx,
                speed,
                is_overall_fastest_in_session,
                is_driver_fastest_in_session,
                fastest_vehicle_idx_in_session,
                fastest_speed_in_session,
            } => {
                w.put(vehicle_idx)
                    .put(speed)
                    .put(is_overall_fastest_in_session)
                    .put(is_driver_fastest_in_session)
                    .put(fastest_vehicle_idx_in_session)
                    .put(fastest_speed_in_session);
            }
            Self::StartLights { num_lights } => {
                w.put(num_lights);
            }
            Self::Flashback {
                frame_identifier,
                session_time,
            } => {
                w.put(frame_identifier).put(session_time);
            }
            Self::Buttons { button_status } => {
                w.put(button_status);
            }
            Self::SessionStarted
            | Self::SessionEnded
            | Self::DrsEnabled
            | Self::DrsDisabled
            | Self::ChequeredFlag
            | Self::LightsOut
            | Self::Other(_) => {}
        }
        w.into_inner()
    }

    /// The code that selects this layout.
    pub fn code(&self) -> EventCode {
        match self {
            Self::SessionStarted => EventCode::SESSION_STARTED,
            Self::SessionEnded => EventCode::SESSION_ENDED,
            Self::FastestLap { .. } => EventCode::FASTEST_LAP,
            Self::Retirement { .. } => EventCode::RETIREMENT,
            Self::DrsEnabled => EventCode::DRS_ENABLED,
            Self::DrsDisabled => EventCode::DRS_DISABLED,
            Self::TeamMateInPits { .. } => EventCode::TEAM_MATE_IN_PITS,
            Self::ChequeredFlag => EventCode::CHEQUERED_FLAG,
            Self::RaceWinner { .. } => EventCode::RACE_WINNER,
            Self::Penalty { .. } => EventCode::PENALTY,
            Self::SpeedTrap { .. } => EventCode::SPEED_TRAP,
            Self::StartLights { .. } => EventCode::START_LIGHTS,
            Self::LightsOut => EventCode::LIGHTS_OUT,
            Self::DriveThroughServed { .. } => EventCode::DRIVE_THROUGH_SERVED,
            Self::StopGoServed { .. } => EventCode::STOP_GO_SERVED,
            Self::Flashback { .. } => EventCode::FLASHBACK,
            Self::Buttons { .. } => EventCode::BUTTONS,
            Self::Other(code) => *code,
        }
    }
}

/// Decoded event packet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EventPacket {
    pub code: EventCode,
    pub details: EventDetails,
}

/// Parse an event packet.
///
/// # Errors
///
/// Returns a [`DecodeError`] when the code, or the details its layout needs,
/// run past the end of the buffer.
pub fn parse_event(raw: &[u8]) -> Result<EventPacket, DecodeError> {
    let code = EventCode(ByteReader::at(raw, EVENT_CODE_OFFSET).u8_array::<4>()?);
    let mut r = ByteReader::at(raw, EVENT_DETAILS_OFFSET);

    let details = match code {
        EventCode::SESSION_STARTED => EventDetails::SessionStarted,
        EventCode::SESSION_ENDED => EventDetails::SessionEnded,
        EventCode::FASTEST_LAP => EventDetails::FastestLap {
            vehicle_idx: r.u8()?,
            lap_time: r.f32_le()?,
        },
        EventCode::RETIREMENT => EventDetails::Retirement {
            vehicle_idx: r.u8()?,
        },
        EventCode::DRS_ENABLED => EventDetails::DrsEnabled,
        EventCode::DRS_DISABLED => EventDetails::DrsDisabled,
        EventCode::TEAM_MATE_IN_PITS => EventDetails::TeamMateInPits {
            vehicle_idx: r.u8()?,
        },
        EventCode::CHEQUERED_FLAG => EventDetails::ChequeredFlag,
        EventCode::RACE_WINNER => EventDetails::RaceWinner {
            vehicle_idx: r.u8()?,
        },
        EventCode::PENALTY => EventDetails::Penalty {
            penalty_type: r.u8()?,
            infringement_type: r.u8()?,
            vehicle_idx: r.u8()?,
            other_vehicle_idx: r.u8()?,
            time: r.u8()?,
            lap_num: r.u8()?,
            places_gained: r.u8()?,
        },
        EventCode::SPEED_TRAP => EventDetails::SpeedTrap {
            vehicle_idx: r.u8()?,
            speed: r.f32_le()?,
            is_overall_fastest_in_session: r.u8()?,
            is_driver_fastest_in_session: r.u8()?,
            fastest_vehicle_idx_in_session: r.u8()?,
            fastest_speed_in_session: r.f32_le()?,
        },
        EventCode::START_LIGHTS => EventDetails::StartLights {
            num_lights: r.u8()?,
        },
        EventCode::LIGHTS_OUT => EventDetails::LightsOut,
        EventCode::DRIVE_THROUGH_SERVED => EventDetails::DriveThroughServed {
            vehicle_idx: r.u8()?,
        },
        EventCode::STOP_GO_SERVED => EventDetails::StopGoServed {
            vehicle_idx: r.u8()?,
        },
        EventCode::FLASHBACK => EventDetails::Flashback {
            frame_identifier: r.u32_le()?,
            session_time: r.f32_le()?,
        },
        EventCode::BUTTONS => EventDetails::Buttons {
            button_status: r.u32_le()?,
        },
        other => EventDetails::Other(other),
    };

    Ok(EventPacket { code, details })
}
