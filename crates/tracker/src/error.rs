//! Tracker error types.

use paddock_wire::{DecodeError, PacketKind, Rejection};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    #[error("invalid tracker config `{field}`: {message}")]
    InvalidConfig { field: &'static str, message: String },
}

/// Why a datagram was not applied. Tracker state is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DropReason {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("failed to decode {kind:?} packet: {source}")]
    Decode {
        kind: PacketKind,
        #[source]
        source: DecodeError,
    },

    #[error("player car index not known yet")]
    NoPlayerCar,

    #[error("no session packet seen yet")]
    NoSession,

    #[error("packet for session {found:#x} while tracking {current:#x}")]
    SessionMismatch { current: u64, found: u64 },

    #[error("session history for car {car_idx}, player is car {player}")]
    ForeignCar { car_idx: u8, player: u8 },

    #[error("lap data at {session_time}s is out of order (guard at {last_applied}s)")]
    OutOfOrder { session_time: f32, last_applied: f32 },

    #[error("packet kind {0:?} is not tracked")]
    Untracked(PacketKind),
}

impl DropReason {
    /// Drops that happen on every healthy stream: other seasons on the same
    /// port, untracked packet kinds, other cars' history.
    pub fn is_noise(&self) -> bool {
        matches!(
            self,
            Self::Rejected(Rejection::ForeignFormat { .. })
                | Self::Untracked(_)
                | Self::ForeignCar { .. }
        )
    }

    pub(crate) fn decode(kind: PacketKind) -> impl FnOnce(DecodeError) -> Self {
        move |source| Self::Decode { kind, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_classification() {
        assert!(DropReason::Untracked(PacketKind::Motion).is_noise());
        assert!(DropReason::ForeignCar { car_idx: 1, player: 0 }.is_noise());
        assert!(
            DropReason::Rejected(Rejection::ForeignFormat {
                found: 2023,
                expected: 2022
            })
            .is_noise()
        );
        assert!(!DropReason::Rejected(Rejection::TooShort { len: 3 }).is_noise());
        assert!(!DropReason::NoSession.is_noise());
    }

    #[test]
    fn decode_error_is_kept_as_source() {
        use std::error::Error as _;
        let reason = DropReason::decode(PacketKind::LapData)(DecodeError::TooShort {
            what: "lap data entry",
            need: 67,
            got: 24,
        });
        assert!(reason.source().is_some());
        assert!(reason.to_string().contains("LapData"));
    }
}
