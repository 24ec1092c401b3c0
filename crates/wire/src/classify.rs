//! Header-only packet classification.

use serde::Serialize;
use thiserror::Error;

use crate::header::{HEADER_SIZE, PacketHeader, parse_header, peek_packet_format};

/// Packet type, from `m_packetId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PacketKind {
    Motion,
    Session,
    LapData,
    Event,
    Participants,
    CarSetups,
    CarTelemetry,
    CarStatus,
    FinalClassification,
    LobbyInfo,
    CarDamage,
    SessionHistory,
    Unknown(u8),
}

impl PacketKind {
    pub fn from_id(id: u8) -> Self {
        match id {
            0 => Self::Motion,
            1 => Self::Session,
            2 => Self::LapData,
            3 => Self::Event,
            4 => Self::Participants,
            5 => Self::CarSetups,
            6 => Self::CarTelemetry,
            7 => Self::CarStatus,
            8 => Self::FinalClassification,
            9 => Self::LobbyInfo,
            10 => Self::CarDamage,
            11 => Self::SessionHistory,
            other => Self::Unknown(other),
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Self::Motion => 0,
            Self::Session => 1,
            Self::LapData => 2,
            Self::Event => 3,
            Self::Participants => 4,
            Self::CarSetups => 5,
            Self::CarTelemetry => 6,
            Self::CarStatus => 7,
            Self::FinalClassification => 8,
            Self::LobbyInfo => 9,
            Self::CarDamage => 10,
            Self::SessionHistory => 11,
            Self::Unknown(id) => id,
        }
    }

    /// Packet types the lap tracker consumes.
    pub fn is_tracked(self) -> bool {
        matches!(
            self,
            Self::Session
                | Self::LapData
                | Self::Event
                | Self::Participants
                | Self::SessionHistory
        )
    }
}

/// Why a datagram never reached the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("datagram too short for header: {len} bytes (need {HEADER_SIZE})")]
    TooShort { len: usize },

    #[error("foreign packet format {found} (expected {expected})")]
    ForeignFormat { found: u16, expected: u16 },
}

/// A datagram whose header has been accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classified {
    pub header: PacketHeader,
    pub kind: PacketKind,
}

/// Inspect the header of `raw`.
///
/// Buffers shorter than the header are rejected before any field is read.
/// The format is checked before the rest of the header is decoded.
///
/// # Errors
///
/// Returns a [`Rejection`] for short buffers and foreign packet formats.
pub fn classify(raw: &[u8], expected_format: u16) -> Result<Classified, Rejection> {
    if raw.len() < HEADER_SIZE {
        return Err(Rejection::TooShort { len: raw.len() });
    }
    let found =
        peek_packet_format(raw).map_err(|_decode| Rejection::TooShort { len: raw.len() })?;
    if found != expected_format {
        return Err(Rejection::ForeignFormat {
            found,
            expected: expected_format,
        });
    }
    let header = parse_header(raw).map_err(|_decode| Rejection::TooShort { len: raw.len() })?;
    Ok(Classified {
        kind: PacketKind::from_id(header.packet_id),
        header,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::build_header;
    use crate::header::PACKET_FORMAT_2022;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn classify_maps_tracked_ids() -> TestResult {
        for (id, kind) in [
            (1, PacketKind::Session),
            (2, PacketKind::LapData),
            (3, PacketKind::Event),
            (4, PacketKind::Participants),
            (11, PacketKind::SessionHistory),
        ] {
            let raw = build_header(PACKET_FORMAT_2022, id, 1, 0.0, 0);
            let classified = classify(&raw, PACKET_FORMAT_2022)?;
            assert_eq!(classified.kind, kind);
            assert!(kind.is_tracked());
            assert_eq!(kind.id(), id);
        }
        Ok(())
    }

    #[test]
    fn classify_keeps_unknown_ids() -> TestResult {
        let raw = build_header(PACKET_FORMAT_2022, 42, 1, 0.0, 0);
        let classified = classify(&raw, PACKET_FORMAT_2022)?;
        assert_eq!(classified.kind, PacketKind::Unknown(42));
        assert!(!classified.kind.is_tracked());
        Ok(())
    }

    #[test]
    fn classify_rejects_foreign_format() {
        let raw = build_header(2023, 1, 1, 0.0, 0);
        assert_eq!(
            classify(&raw, PACKET_FORMAT_2022),
            Err(Rejection::ForeignFormat {
                found: 2023,
                expected: 2022
            })
        );
    }

    #[test]
    fn classify_rejects_every_length_below_header() {
        let raw = build_header(PACKET_FORMAT_2022, 2, 1, 0.0, 0);
        for len in 0..HEADER_SIZE {
            assert_eq!(
                classify(raw.get(..len).unwrap_or_default(), PACKET_FORMAT_2022),
                Err(Rejection::TooShort { len })
            );
        }
    }

    #[test]
    fn car_telemetry_is_not_tracked() {
        assert!(!PacketKind::CarTelemetry.is_tracked());
        assert!(!PacketKind::Motion.is_tracked());
    }
}
