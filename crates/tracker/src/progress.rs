//! Live progress through the current lap.
//!
//! Lap-data packets arrive many times per second. [`LapProgress`] folds them
//! into sector splits and a sticky invalid flag, and notices when the lap
//! number moves on.

use paddock_wire::LapDataEntry;
use serde::Serialize;

/// Lap data up to this far past a flashback target still counts as
/// post-flashback. One packet interval at the slowest send rate, with margin.
pub const FLASHBACK_SLACK_SECS: f32 = 0.25;

/// Sector splits recorded while the lap was driven.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SectorSplits {
    pub sector1_ms: Option<u32>,
    pub sector2_ms: Option<u32>,
}

impl SectorSplits {
    pub fn both(&self) -> Option<(u32, u32)> {
        self.sector1_ms.zip(self.sector2_ms)
    }
}

/// The lap that was running when the lap number last advanced by one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClosedLap {
    pub lap_num: u8,
    pub splits: SectorSplits,
    pub invalid: bool,
}

/// What a lap-data entry did to the progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Still on the same lap.
    Same,
    /// First lap seen, or the lap number jumped; nothing was closed.
    Restarted { lap_num: u8 },
    /// The lap number moved on by exactly one.
    Closed(ClosedLap),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LapProgress {
    /// 0 until the first lap-data packet.
    pub lap_num: u8,
    pub current_lap_time_ms: u32,
    /// 0, 1 or 2.
    pub sector: u8,
    pub splits: SectorSplits,
    /// Sticky: set once the game flags the lap, cleared on the next lap.
    pub invalid: bool,
    /// Session time of the last applied lap-data packet.
    pub last_session_time: Option<f32>,
    /// Session time a flashback rewound to. Until lap data from at or before
    /// it arrives, newer lap data was sent before the flashback.
    pub flashback_to: Option<f32>,
    pub closed: Option<ClosedLap>,
}

impl LapProgress {
    /// True when `session_time` is older than the last applied packet, or
    /// after a flashback, newer than the flashback target.
    pub fn is_stale(&self, session_time: f32) -> bool {
        if let Some(target) = self.flashback_to {
            return session_time > target + FLASHBACK_SLACK_SECS;
        }
        self.last_session_time.is_some_and(|last| session_time < last)
    }

    /// Fold one lap-data entry into the progress.
    pub fn apply(&mut self, entry: &LapDataEntry, session_time: f32) -> Advance {
        if session_time.is_finite() {
            self.last_session_time = Some(session_time);
            if self
                .flashback_to
                .is_some_and(|target| session_time <= target + FLASHBACK_SLACK_SECS)
            {
                self.flashback_to = None;
            }
        }

        let advance = if self.lap_num == 0 || entry.current_lap_num != self.lap_num {
            let closes =
                self.lap_num != 0 && Some(entry.current_lap_num) == self.lap_num.checked_add(1);
            let closed = closes.then_some(ClosedLap {
                lap_num: self.lap_num,
                splits: self.splits,
                invalid: self.invalid,
            });
            self.start_lap(entry, closed);
            match closed {
                Some(closed) => Advance::Closed(closed),
                None => Advance::Restarted {
                    lap_num: entry.current_lap_num,
                },
            }
        } else {
            Advance::Same
        };

        self.track_sectors(entry);
        self.invalid |= entry.is_current_lap_invalid();
        self.current_lap_time_ms = entry.current_lap_time_ms;
        advance
    }

    fn start_lap(&mut self, entry: &LapDataEntry, closed: Option<ClosedLap>) {
        self.lap_num = entry.current_lap_num;
        self.splits = SectorSplits::default();
        self.invalid = false;
        // A lap we watched start is in sector 0; otherwise trust the packet so
        // no transition is inferred from a lap joined halfway.
        self.sector = if closed.is_some() { 0 } else { entry.sector };
        self.closed = closed;
    }

    fn track_sectors(&mut self, entry: &LapDataEntry) {
        let previous = self.sector;
        let transition = entry.sector > previous;

        if entry.sector >= 1 && self.splits.sector1_ms.is_none() {
            if entry.sector1_time_ms != 0 {
                self.splits.sector1_ms = Some(u32::from(entry.sector1_time_ms));
            } else if transition && previous == 0 {
                self.splits.sector1_ms = Some(entry.current_lap_time_ms);
            }
        }

        if entry.sector >= 2 && self.splits.sector2_ms.is_none() {
            if entry.sector2_time_ms != 0 {
                self.splits.sector2_ms = Some(u32::from(entry.sector2_time_ms));
            } else if transition {
                self.splits.sector2_ms = self
                    .splits
                    .sector1_ms
                    .map(|s1| entry.current_lap_time_ms.saturating_sub(s1));
            }
        }

        self.sector = entry.sector;
    }

    /// Forget the current lap and the ordering guard after a flashback to
    /// `target`. Lap data newer than `target` is stale until the stream has
    /// caught up with the rewind.
    pub fn rewind(&mut self, target: Option<f32>) {
        *self = Self {
            flashback_to: target.filter(|t| t.is_finite()),
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(lap: u8, sector: u8, current_ms: u32) -> LapDataEntry {
        LapDataEntry {
            current_lap_num: lap,
            sector,
            current_lap_time_ms: current_ms,
            ..LapDataEntry::default()
        }
    }

    #[test]
    fn first_packet_restarts() {
        let mut p = LapProgress::default();
        assert_eq!(p.apply(&entry(3, 0, 1_000), 1.0), Advance::Restarted { lap_num: 3 });
        assert_eq!(p.lap_num, 3);
        assert_eq!(p.closed, None);
    }

    #[test]
    fn splits_fall_back_to_lap_time_at_transition() {
        let mut p = LapProgress::default();
        p.apply(&entry(2, 0, 500), 1.0);
        p.apply(&entry(2, 0, 27_900), 2.0);
        p.apply(&entry(2, 1, 28_000), 3.0);
        assert_eq!(p.splits.sector1_ms, Some(28_000));
        p.apply(&entry(2, 2, 57_000), 4.0);
        assert_eq!(p.splits.both(), Some((28_000, 29_000)));
    }

    #[test]
    fn game_split_fields_win_over_fallback() {
        let mut p = LapProgress::default();
        p.apply(&entry(2, 0, 500), 1.0);
        let mut e = entry(2, 1, 28_100);
        e.sector1_time_ms = 28_000;
        p.apply(&e, 2.0);
        let mut e = entry(2, 2, 57_300);
        e.sector1_time_ms = 28_000;
        e.sector2_time_ms = 29_000;
        p.apply(&e, 3.0);
        assert_eq!(p.splits.both(), Some((28_000, 29_000)));
    }

    #[test]
    fn joining_mid_lap_infers_nothing() {
        let mut p = LapProgress::default();
        p.apply(&entry(2, 1, 40_000), 1.0);
        assert_eq!(p.splits, SectorSplits::default());
        p.apply(&entry(2, 2, 57_000), 2.0);
        assert_eq!(p.splits.sector2_ms, None);
    }

    #[test]
    fn advance_by_one_closes_lap() {
        let mut p = LapProgress::default();
        p.apply(&entry(2, 0, 500), 1.0);
        let mut e = entry(2, 1, 28_000);
        e.current_lap_invalid = 1;
        p.apply(&e, 2.0);
        p.apply(&entry(2, 2, 57_000), 3.0);
        p.apply(&entry(2, 2, 84_900), 4.0);

        let advance = p.apply(&entry(3, 0, 100), 5.0);
        let closed = ClosedLap {
            lap_num: 2,
            splits: SectorSplits {
                sector1_ms: Some(28_000),
                sector2_ms: Some(29_000),
            },
            invalid: true,
        };
        assert_eq!(advance, Advance::Closed(closed));
        assert_eq!(p.closed, Some(closed));
        assert_eq!(p.lap_num, 3);
        assert!(!p.invalid);
        assert_eq!(p.splits, SectorSplits::default());
    }

    #[test]
    fn invalid_flag_is_sticky() {
        let mut p = LapProgress::default();
        let mut e = entry(4, 0, 100);
        e.current_lap_invalid = 1;
        p.apply(&e, 1.0);
        p.apply(&entry(4, 0, 200), 2.0);
        assert!(p.invalid);
    }

    #[test]
    fn jump_restarts_without_closing() {
        let mut p = LapProgress::default();
        p.apply(&entry(2, 0, 100), 1.0);
        assert_eq!(p.apply(&entry(5, 0, 100), 2.0), Advance::Restarted { lap_num: 5 });
        assert_eq!(p.apply(&entry(4, 0, 100), 3.0), Advance::Restarted { lap_num: 4 });
        assert_eq!(p.closed, None);

        assert!(matches!(p.apply(&entry(5, 0, 100), 4.0), Advance::Closed(_)));
        p.apply(&entry(9, 0, 100), 5.0);
        assert_eq!(p.closed, None);
    }

    #[test]
    fn ordering_guard_and_rewind() {
        let mut p = LapProgress::default();
        assert!(!p.is_stale(0.0));
        p.apply(&entry(2, 0, 100), 10.0);
        assert!(p.is_stale(9.5));
        assert!(!p.is_stale(10.0));
        p.rewind(None);
        assert!(!p.is_stale(9.5));
        assert_eq!(p.lap_num, 0);
    }

    #[test]
    fn flashback_window_holds_until_stream_rewinds() {
        let mut p = LapProgress::default();
        p.apply(&entry(3, 1, 30_000), 50.0);
        p.rewind(Some(40.0));

        // sent before the flashback, delivered after it
        assert!(p.is_stale(50.5));
        assert!(!p.is_stale(40.0));
        assert!(!p.is_stale(40.2));

        p.apply(&entry(3, 0, 20_000), 40.1);
        assert_eq!(p.flashback_to, None);
        assert!(!p.is_stale(45.0));
        assert!(p.is_stale(40.0));
    }

    #[test]
    fn non_finite_flashback_target_is_a_plain_reset() {
        let mut p = LapProgress::default();
        p.apply(&entry(3, 1, 30_000), 50.0);
        p.rewind(Some(f32::NAN));
        assert_eq!(p.flashback_to, None);
        assert!(!p.is_stale(50.5));
    }

    #[test]
    fn non_finite_session_time_leaves_guard_alone() {
        let mut p = LapProgress::default();
        p.apply(&entry(2, 0, 100), 10.0);
        p.apply(&entry(2, 0, 200), f32::NAN);
        assert_eq!(p.last_session_time.map(f32::to_bits), Some(10.0f32.to_bits()));
    }
}
