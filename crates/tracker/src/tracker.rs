//! The stateful core: one [`Tracker`] per telemetry stream.

use paddock_wire::{
    Classified, EventDetails, HEADER_SIZE, PacketHeader, PacketKind, Rejection, classify,
    parse_event, parse_lap_data, parse_participant, parse_session_data, parse_session_history,
    read_at,
};
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::config::TrackerConfig;
use crate::error::DropReason;
use crate::event::TrackerEvent;
use crate::ledger::{LapLedger, LapRecord, LapTimes, PendingLap};
use crate::progress::{Advance, ClosedLap, LapProgress};
use crate::session::{DriverInfo, LapContext, SessionContext, SessionId, SessionKey};
use crate::summary::SessionSummary;

/// Longest lap time a fastest-lap event is trusted with (one hour).
const MAX_EVENT_LAP_SECS: f32 = 3_600.0;

/// Result of feeding one datagram to the tracker.
#[derive(Debug, Clone, PartialEq)]
pub enum Ingest {
    /// The packet was applied. May carry no events.
    Applied(Vec<TrackerEvent>),
    /// The packet was ignored; tracker state is unchanged.
    Dropped(DropReason),
}

impl Ingest {
    pub fn events(&self) -> &[TrackerEvent] {
        match self {
            Self::Applied(events) => events,
            Self::Dropped(_) => &[],
        }
    }

    pub fn into_events(self) -> Vec<TrackerEvent> {
        match self {
            Self::Applied(events) => events,
            Self::Dropped(_) => Vec::new(),
        }
    }
}

/// Running packet counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TrackerStats {
    pub received: u64,
    pub applied: u64,
    pub rejected: u64,
    pub decode_errors: u64,
    pub out_of_order: u64,
    pub ignored: u64,
    pub laps_finalized: u64,
}

/// Owned copy of the tracker's observable state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackerSnapshot {
    pub session: Option<SessionContext>,
    pub player_car: Option<u8>,
    pub progress: LapProgress,
    pub pending: Vec<PendingLap>,
    pub laps: Vec<LapRecord>,
    pub summary: SessionSummary,
    pub stats: TrackerStats,
}

/// Session and lap state for one F1 22 telemetry stream.
#[derive(Debug)]
pub struct Tracker {
    config: TrackerConfig,
    player_car: Option<u8>,
    session: Option<SessionContext>,
    /// Kept across sessions; the participants packet is not resent on every
    /// session change.
    driver: Option<DriverInfo>,
    progress: LapProgress,
    ledger: Option<LapLedger>,
    stats: TrackerStats,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl Tracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            player_car: None,
            session: None,
            driver: None,
            progress: LapProgress::default(),
            ledger: None,
            stats: TrackerStats::default(),
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Classify and apply one raw datagram.
    pub fn ingest(&mut self, raw: &[u8]) -> Ingest {
        match classify(raw, self.config.packet_format) {
            Ok(classified) => self.apply(&classified, raw),
            Err(rejection) => self.reject(rejection, raw.len()),
        }
    }

    /// Count a datagram the classifier turned away.
    pub fn reject(&mut self, rejection: Rejection, len: usize) -> Ingest {
        self.stats.received = self.stats.received.saturating_add(1);
        self.stats.rejected = self.stats.rejected.saturating_add(1);
        trace!(reason = %rejection, len, "datagram rejected");
        Ingest::Dropped(DropReason::Rejected(rejection))
    }

    /// Apply an already classified datagram.
    pub fn apply(&mut self, classified: &Classified, raw: &[u8]) -> Ingest {
        self.stats.received = self.stats.received.saturating_add(1);
        let header = &classified.header;
        if let Some(player) = header.player_car() {
            self.player_car = Some(player);
        }

        let result = match classified.kind {
            PacketKind::Session => self.on_session(header, raw),
            PacketKind::Participants => self.on_participants(header, raw),
            PacketKind::LapData => self.on_lap_data(header, raw),
            PacketKind::SessionHistory => self.on_session_history(header, raw),
            PacketKind::Event => self.on_event(header, raw),
            other => Err(DropReason::Untracked(other)),
        };

        match result {
            Ok(events) => {
                self.stats.applied = self.stats.applied.saturating_add(1);
                Ingest::Applied(events)
            }
            Err(reason) => {
                self.count_drop(&reason);
                if reason.is_noise() {
                    trace!(kind = ?classified.kind, %reason, "packet dropped");
                } else {
                    debug!(kind = ?classified.kind, %reason, "packet dropped");
                }
                Ingest::Dropped(reason)
            }
        }
    }

    fn count_drop(&mut self, reason: &DropReason) {
        let counter = match reason {
            DropReason::Rejected(_) => &mut self.stats.rejected,
            DropReason::Decode { .. } => &mut self.stats.decode_errors,
            DropReason::OutOfOrder { .. } => &mut self.stats.out_of_order,
            DropReason::NoPlayerCar
            | DropReason::NoSession
            | DropReason::SessionMismatch { .. }
            | DropReason::ForeignCar { .. }
            | DropReason::Untracked(_) => &mut self.stats.ignored,
        };
        *counter = counter.saturating_add(1);
    }

    fn require_player(&self) -> Result<u8, DropReason> {
        self.player_car.ok_or(DropReason::NoPlayerCar)
    }

    /// The current session, provided `header` belongs to it.
    fn require_session(&self, header: &PacketHeader) -> Result<&SessionContext, DropReason> {
        let session = self.session.as_ref().ok_or(DropReason::NoSession)?;
        if session.session_uid != header.session_uid {
            return Err(DropReason::SessionMismatch {
                current: session.session_uid,
                found: header.session_uid,
            });
        }
        Ok(session)
    }

    fn on_session(
        &mut self,
        header: &PacketHeader,
        raw: &[u8],
    ) -> Result<Vec<TrackerEvent>, DropReason> {
        let data = parse_session_data(raw).map_err(DropReason::decode(PacketKind::Session))?;

        let key = SessionKey {
            session_uid: header.session_uid,
            session_type: data.session_type,
        };
        let existing = self.session.as_ref().filter(|ctx| ctx.key() == key);
        let (id, started) = match existing {
            Some(ctx) => (ctx.id, false),
            None => (SessionId::new(), true),
        };

        let context = SessionContext::new(
            id,
            header.session_uid,
            &data,
            self.player_car,
            self.driver.clone(),
        );
        let mut events = Vec::new();
        if started {
            info!(
                session_id = %id,
                session_uid = header.session_uid,
                session_type = context.session_type_label,
                track = context.track_name,
                weather = context.weather_label,
                "New session detected"
            );
            self.progress = LapProgress::default();
            self.ledger = Some(LapLedger::new(id));
            events.push(TrackerEvent::SessionStarted {
                session: context.clone(),
            });
        }
        self.session = Some(context);
        Ok(events)
    }

    fn on_participants(
        &mut self,
        header: &PacketHeader,
        raw: &[u8],
    ) -> Result<Vec<TrackerEvent>, DropReason> {
        let player = self.require_player()?;
        let session = self.require_session(header)?;
        let entry = parse_participant(raw, usize::from(player))
            .map_err(DropReason::decode(PacketKind::Participants))?;

        let driver = DriverInfo::from_participant(&entry);
        if session.driver.as_ref() != Some(&driver) {
            debug!(
                team = driver.team_name,
                driver = %driver.driver_name,
                race_number = driver.race_number,
                "Player participant updated"
            );
            self.session = Some(session.with_driver(driver.clone()));
        }
        self.driver = Some(driver);
        Ok(Vec::new())
    }

    fn on_lap_data(
        &mut self,
        header: &PacketHeader,
        raw: &[u8],
    ) -> Result<Vec<TrackerEvent>, DropReason> {
        let player = self.require_player()?;
        let session = self.require_session(header)?;
        let lap_context = session.lap_context();
        let entry = parse_lap_data(raw, usize::from(player))
            .map_err(DropReason::decode(PacketKind::LapData))?;

        if self.progress.is_stale(header.session_time) {
            return Err(DropReason::OutOfOrder {
                session_time: header.session_time,
                last_applied: self
                    .progress
                    .flashback_to
                    .or(self.progress.last_session_time)
                    .unwrap_or_default(),
            });
        }
        let Some(ledger) = self.ledger.as_mut() else {
            return Err(DropReason::NoSession);
        };

        let advance = self.progress.apply(&entry, header.session_time);
        let mut events = Vec::new();

        if entry.last_lap_time_ms > 0 && entry.current_lap_num > 1 {
            let completed = entry.current_lap_num.saturating_sub(1);
            if ledger.mark_pending(completed, lap_context) {
                debug!(
                    lap = completed,
                    last_lap_ms = entry.last_lap_time_ms,
                    "Lap pending history"
                );
                events.push(TrackerEvent::LapPending {
                    session_id: ledger.session_id(),
                    lap_num: completed,
                });
            }
        }

        let closed = match advance {
            Advance::Closed(closed) if self.config.provisional_laps => Some(closed),
            _ => None,
        };
        if let Some(record) = closed.and_then(|closed| {
            record_closed_lap(ledger, &closed, entry.last_lap_time_ms, lap_context)
        }) {
            events.push(TrackerEvent::LapCompleted { record });
        }

        Ok(events)
    }

    fn on_session_history(
        &mut self,
        header: &PacketHeader,
        raw: &[u8],
    ) -> Result<Vec<TrackerEvent>, DropReason> {
        let player = self.require_player()?;
        self.require_session(header)?;
        // Peek the car index so the 21 other cars' packets cost one read.
        let car_idx: u8 =
            read_at(raw, HEADER_SIZE).map_err(DropReason::decode(PacketKind::SessionHistory))?;
        if car_idx != player {
            return Err(DropReason::ForeignCar { car_idx, player });
        }
        let history =
            parse_session_history(raw).map_err(DropReason::decode(PacketKind::SessionHistory))?;
        let Some(ledger) = self.ledger.as_mut() else {
            return Err(DropReason::NoSession);
        };

        let mut events = Vec::new();
        for lap_num in ledger.open_laps() {
            if lap_num == 0 || lap_num > history.num_laps {
                continue;
            }
            let Some(entry) = history.lap(lap_num) else {
                continue;
            };
            // The in-progress lap is listed with a zero time.
            if entry.lap_time_ms == 0 {
                continue;
            }
            if let Some(finalized) = ledger.finalize(lap_num, entry) {
                let t = finalized.record.times;
                info!(
                    session_id = %finalized.record.session_id,
                    lap = lap_num,
                    lap_time_s = t.total_secs(),
                    s1_s = t.sector1_secs(),
                    s2_s = t.sector2_secs(),
                    s3_s = t.sector3_secs(),
                    valid = finalized.record.valid,
                    corrected = finalized.supersedes.is_some(),
                    "Lap finalized"
                );
                self.stats.laps_finalized = self.stats.laps_finalized.saturating_add(1);
                events.push(TrackerEvent::LapFinalized {
                    record: finalized.record,
                    supersedes: finalized.supersedes,
                });
            }
        }
        Ok(events)
    }

    fn on_event(
        &mut self,
        header: &PacketHeader,
        raw: &[u8],
    ) -> Result<Vec<TrackerEvent>, DropReason> {
        let event = parse_event(raw).map_err(DropReason::decode(PacketKind::Event))?;
        match event.details {
            EventDetails::SessionStarted => {
                info!(session_uid = header.session_uid, "Session started");
                Ok(Vec::new())
            }
            EventDetails::SessionEnded => {
                info!(session_uid = header.session_uid, "Session ended");
                Ok(self.report_open_laps())
            }
            EventDetails::Flashback {
                frame_identifier,
                session_time,
            } => {
                info!(frame_identifier, session_time, "Flashback, lap progress reset");
                self.progress.rewind(Some(session_time));
                Ok(Vec::new())
            }
            EventDetails::FastestLap {
                vehicle_idx,
                lap_time,
            } if Some(vehicle_idx) == self.player_car => {
                if self.require_session(header).is_err() {
                    return Ok(Vec::new());
                }
                Ok(self.on_fastest_lap(lap_time).into_iter().collect())
            }
            other => {
                trace!(code = %event.code, details = ?other, "event ignored");
                Ok(Vec::new())
            }
        }
    }

    /// Live record from a fastest-lap event for the player.
    fn on_fastest_lap(&mut self, lap_time_secs: f32) -> Option<TrackerEvent> {
        if !self.config.provisional_laps {
            return None;
        }
        let total_ms = event_lap_time_ms(lap_time_secs)?;
        let lap_context = self.session.as_ref()?.lap_context();

        // The event can beat the lap-data packet that starts the next lap.
        let progress = &self.progress;
        let in_last_sector =
            progress.lap_num > 0 && progress.sector == 2 && progress.splits.both().is_some();
        let target = if in_last_sector {
            ClosedLap {
                lap_num: progress.lap_num,
                splits: progress.splits,
                invalid: progress.invalid,
            }
        } else {
            progress.closed?
        };

        let ledger = self.ledger.as_mut()?;
        let record = record_closed_lap(ledger, &target, total_ms, lap_context)?;
        Some(TrackerEvent::LapCompleted { record })
    }

    /// Every lap still without history, reported once at session end.
    fn report_open_laps(&self) -> Vec<TrackerEvent> {
        let Some(ledger) = self.ledger.as_ref() else {
            return Vec::new();
        };
        let laps = ledger.open_laps();
        if laps.is_empty() {
            return Vec::new();
        }
        warn!(session_id = %ledger.session_id(), ?laps, "Session ended with unreconciled laps");
        vec![TrackerEvent::StalePendingLaps {
            session_id: ledger.session_id(),
            laps,
        }]
    }

    pub fn player_car(&self) -> Option<u8> {
        self.player_car
    }

    pub fn session(&self) -> Option<&SessionContext> {
        self.session.as_ref()
    }

    pub fn progress(&self) -> &LapProgress {
        &self.progress
    }

    pub fn stats(&self) -> TrackerStats {
        self.stats
    }

    /// Laps waiting for their history entry, ascending.
    pub fn pending_laps(&self) -> Vec<PendingLap> {
        self.ledger
            .as_ref()
            .map(LapLedger::pending)
            .unwrap_or_default()
    }

    /// Pending laps more than `stale_after_laps` laps behind the current lap.
    pub fn stale_pending_laps(&self) -> Vec<PendingLap> {
        let current = self.progress.lap_num;
        let threshold = self.config.stale_after_laps;
        self.pending_laps()
            .into_iter()
            .filter(|lap| current > lap.lap_num.saturating_add(threshold))
            .collect()
    }

    /// Latest record per lap of the current session, ascending.
    pub fn laps(&self) -> Vec<LapRecord> {
        self.ledger
            .as_ref()
            .map(|ledger| ledger.records().cloned().collect())
            .unwrap_or_default()
    }

    pub fn summary(&self) -> SessionSummary {
        let session_id = self.session.as_ref().map(|s| s.id);
        match self.ledger.as_ref() {
            Some(ledger) => SessionSummary::from_records(session_id, ledger.records()),
            None => SessionSummary::from_records(session_id, []),
        }
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            session: self.session.clone(),
            player_car: self.player_car,
            progress: self.progress,
            pending: self.pending_laps(),
            laps: self.laps(),
            summary: self.summary(),
            stats: self.stats,
        }
    }
}

/// Store a Live record for a closed lap when both splits and the lap time
/// are known.
fn record_closed_lap(
    ledger: &mut LapLedger,
    closed: &ClosedLap,
    total_ms: u32,
    lap_context: LapContext,
) -> Option<LapRecord> {
    if total_ms == 0 {
        return None;
    }
    let (s1, s2) = closed.splits.both()?;
    let times = LapTimes::from_splits(total_ms, s1, s2);
    let record = ledger.record_live(closed.lap_num, times, !closed.invalid, lap_context)?;
    info!(
        session_id = %record.session_id,
        lap = record.lap_num,
        lap_time_s = times.total_secs(),
        valid = record.valid,
        "Lap completed (provisional)"
    );
    Some(record)
}

/// Fastest-lap events carry seconds; convert to whole milliseconds.
fn event_lap_time_ms(secs: f32) -> Option<u32> {
    if !secs.is_finite() || secs <= 0.0 || secs > MAX_EVENT_LAP_SECS {
        return None;
    }
    Some((f64::from(secs) * 1000.0).round() as u32)
}
