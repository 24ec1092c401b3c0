//! Events emitted by [`crate::Tracker`].

use serde::Serialize;

use crate::ledger::LapRecord;
use crate::session::{SessionContext, SessionId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TrackerEvent {
    /// A new session id was minted; all lap state was cleared.
    SessionStarted { session: SessionContext },
    /// A lap is known to be complete and waits for its history entry.
    LapPending { session_id: SessionId, lap_num: u8 },
    /// Provisional lap record from live data.
    LapCompleted { record: LapRecord },
    /// Authoritative lap record from the session history packet.
    LapFinalized {
        record: LapRecord,
        supersedes: Option<LapRecord>,
    },
    /// Laps that never got a history entry.
    StalePendingLaps { session_id: SessionId, laps: Vec<u8> },
}

impl TrackerEvent {
    /// The lap record carried by this event, if any.
    pub fn lap_record(&self) -> Option<&LapRecord> {
        match self {
            Self::LapCompleted { record } | Self::LapFinalized { record, .. } => Some(record),
            _ => None,
        }
    }
}
