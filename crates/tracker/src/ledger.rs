//! Lap reconciliation.
//!
//! Each lap of the current session has one slot that only ever moves
//! forward:
//!
//! ```text
//! (none) ──▶ Pending ──▶ Provisional ──▶ Final
//!    │          └──────────────────────────▲
//!    └──────────────▶ Provisional          │
//! ```
//!
//! Live signals (lap-data advance, fastest-lap event) produce a Provisional
//! record. The session history packet produces the Final one. A Final slot
//! never changes again.

use std::collections::BTreeMap;

use paddock_wire::LapHistoryEntry;
use serde::Serialize;

use crate::session::{LapContext, SessionId};

/// Where a lap record's times came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LapSource {
    /// Lap-data splits or a fastest-lap event. May be corrected later.
    Live,
    /// The session history packet.
    History,
}

/// Lap and sector times in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LapTimes {
    pub total_ms: u32,
    pub sector1_ms: u32,
    pub sector2_ms: u32,
    pub sector3_ms: u32,
}

fn ms_to_secs(ms: u32) -> f64 {
    f64::from(ms) / 1000.0
}

impl LapTimes {
    /// Times with sector 3 resolved from the total.
    pub fn from_splits(total_ms: u32, sector1_ms: u32, sector2_ms: u32) -> Self {
        Self {
            total_ms,
            sector1_ms,
            sector2_ms,
            sector3_ms: resolve_sector3(total_ms, sector1_ms, sector2_ms, None),
        }
    }

    pub fn from_history(entry: &LapHistoryEntry) -> Self {
        let direct = entry
            .is_sector3_valid()
            .then_some(u32::from(entry.sector3_time_ms));
        let sector1_ms = u32::from(entry.sector1_time_ms);
        let sector2_ms = u32::from(entry.sector2_time_ms);
        Self {
            total_ms: entry.lap_time_ms,
            sector1_ms,
            sector2_ms,
            sector3_ms: resolve_sector3(entry.lap_time_ms, sector1_ms, sector2_ms, direct),
        }
    }

    pub fn total_secs(&self) -> f64 {
        ms_to_secs(self.total_ms)
    }

    pub fn sector1_secs(&self) -> f64 {
        ms_to_secs(self.sector1_ms)
    }

    pub fn sector2_secs(&self) -> f64 {
        ms_to_secs(self.sector2_ms)
    }

    pub fn sector3_secs(&self) -> f64 {
        ms_to_secs(self.sector3_ms)
    }
}

/// Sector 3 time in milliseconds.
///
/// `total - s1 - s2` wins whenever it is not negative. Otherwise the game's
/// own sector-3 value is used if present (`direct`, only when its valid bit
/// was set) and positive, else 0.
pub fn resolve_sector3(
    total_ms: u32,
    sector1_ms: u32,
    sector2_ms: u32,
    direct: Option<u32>,
) -> u32 {
    total_ms
        .checked_sub(sector1_ms)
        .and_then(|rest| rest.checked_sub(sector2_ms))
        .or_else(|| direct.filter(|&s3| s3 > 0))
        .unwrap_or(0)
}

/// A completed lap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LapRecord {
    pub session_id: SessionId,
    pub lap_num: u8,
    pub times: LapTimes,
    pub valid: bool,
    pub source: LapSource,
    pub context: LapContext,
}

impl LapRecord {
    pub fn is_final(&self) -> bool {
        self.source == LapSource::History
    }
}

/// A lap known to be complete that the history packet has not confirmed yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingLap {
    pub session_id: SessionId,
    pub lap_num: u8,
    pub context: LapContext,
    /// A Live record was already emitted for this lap.
    pub provisional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LapSlot {
    Pending(LapContext),
    Provisional(LapRecord),
    Final(LapRecord),
}

impl LapSlot {
    fn context(&self) -> LapContext {
        match self {
            Self::Pending(context) => *context,
            Self::Provisional(record) | Self::Final(record) => record.context,
        }
    }

    pub fn record(&self) -> Option<&LapRecord> {
        match self {
            Self::Pending(_) => None,
            Self::Provisional(record) | Self::Final(record) => Some(record),
        }
    }
}

/// Outcome of a successful [`LapLedger::finalize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Finalized {
    pub record: LapRecord,
    /// The Live record this one corrects, if any.
    pub supersedes: Option<LapRecord>,
}

/// Lap slots of one session, keyed by lap number.
#[derive(Debug, Clone)]
pub struct LapLedger {
    session_id: SessionId,
    slots: BTreeMap<u8, LapSlot>,
}

impl LapLedger {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            slots: BTreeMap::new(),
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    fn slot(&self, lap_num: u8) -> Option<&LapSlot> {
        self.slots.get(&lap_num)
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Insert a Pending slot. Returns `false` when the lap already has one.
    pub fn mark_pending(&mut self, lap_num: u8, context: LapContext) -> bool {
        if self.slots.contains_key(&lap_num) {
            return false;
        }
        self.slots.insert(lap_num, LapSlot::Pending(context));
        true
    }

    /// Store a Live record for `lap_num`. Only empty and Pending slots accept
    /// one; the slot's captured context is kept.
    pub fn record_live(
        &mut self,
        lap_num: u8,
        times: LapTimes,
        valid: bool,
        context: LapContext,
    ) -> Option<LapRecord> {
        let context = match self.slot(lap_num) {
            None => context,
            Some(LapSlot::Pending(captured)) => *captured,
            Some(LapSlot::Provisional(_) | LapSlot::Final(_)) => return None,
        };
        let record = LapRecord {
            session_id: self.session_id,
            lap_num,
            times,
            valid,
            source: LapSource::Live,
            context,
        };
        self.slots.insert(lap_num, LapSlot::Provisional(record.clone()));
        Some(record)
    }

    /// Turn an existing non-final slot into a Final History record.
    ///
    /// Returns `None` for laps with no slot and laps already final, so a
    /// repeated history packet produces nothing.
    pub fn finalize(&mut self, lap_num: u8, entry: &LapHistoryEntry) -> Option<Finalized> {
        let slot = self.slot(lap_num)?;
        if matches!(slot, LapSlot::Final(_)) {
            return None;
        }
        let record = LapRecord {
            session_id: self.session_id,
            lap_num,
            times: LapTimes::from_history(entry),
            valid: entry.is_lap_valid(),
            source: LapSource::History,
            context: slot.context(),
        };
        let previous = self.slots.insert(lap_num, LapSlot::Final(record.clone()));
        let supersedes = match previous {
            Some(LapSlot::Provisional(live)) => Some(live),
            _ => None,
        };
        Some(Finalized { record, supersedes })
    }

    /// Lap numbers still waiting for history, ascending.
    pub fn open_laps(&self) -> Vec<u8> {
        self.slots
            .iter()
            .filter(|(_, slot)| !matches!(slot, LapSlot::Final(_)))
            .map(|(&lap_num, _)| lap_num)
            .collect()
    }

    pub fn pending(&self) -> Vec<PendingLap> {
        self.slots
            .iter()
            .filter(|(_, slot)| !matches!(slot, LapSlot::Final(_)))
            .map(|(&lap_num, slot)| PendingLap {
                session_id: self.session_id,
                lap_num,
                context: slot.context(),
                provisional: matches!(slot, LapSlot::Provisional(_)),
            })
            .collect()
    }

    /// Latest record per lap, ascending lap number. Pending slots have none.
    pub fn records(&self) -> impl Iterator<Item = &LapRecord> {
        self.slots.values().filter_map(LapSlot::record)
    }
}
