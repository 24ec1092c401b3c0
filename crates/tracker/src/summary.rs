//! End-of-session lap statistics.

use serde::Serialize;

use crate::ledger::LapRecord;
use crate::session::SessionId;

/// A best time and the lap it was set on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BestTime {
    pub lap_num: u8,
    pub time_ms: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSummary {
    pub session_id: Option<SessionId>,
    pub lap_count: usize,
    pub valid_lap_count: usize,
    pub best_lap: Option<BestTime>,
    pub best_sector1: Option<BestTime>,
    pub best_sector2: Option<BestTime>,
    pub best_sector3: Option<BestTime>,
    /// Sample standard deviation of valid lap times in ms; 0 below two laps.
    pub consistency_ms: f64,
}

fn faster(best: Option<BestTime>, lap_num: u8, time_ms: u32) -> Option<BestTime> {
    // Zero means the game never reported the time.
    if time_ms == 0 {
        return best;
    }
    match best {
        Some(b) if b.time_ms <= time_ms => Some(b),
        _ => Some(BestTime { lap_num, time_ms }),
    }
}

fn sample_std_dev(values: &[u32]) -> f64 {
    let n = u32::try_from(values.len()).unwrap_or(u32::MAX);
    if n < 2 {
        return 0.0;
    }
    let n = f64::from(n);
    let mean = values.iter().copied().map(f64::from).sum::<f64>() / n;
    let sum_sq = values
        .iter()
        .map(|&v| {
            let d = f64::from(v) - mean;
            d * d
        })
        .sum::<f64>();
    (sum_sq / (n - 1.0)).sqrt()
}

impl SessionSummary {
    /// Summarise one record per lap. Best times and consistency only count
    /// valid laps.
    pub fn from_records<'a>(
        session_id: Option<SessionId>,
        records: impl IntoIterator<Item = &'a LapRecord>,
    ) -> Self {
        let mut summary = Self {
            session_id,
            ..Self::default()
        };
        let mut valid_times = Vec::new();

        for record in records {
            summary.lap_count = summary.lap_count.saturating_add(1);
            if !record.valid {
                continue;
            }
            summary.valid_lap_count = summary.valid_lap_count.saturating_add(1);
            let t = record.times;
            summary.best_lap = faster(summary.best_lap, record.lap_num, t.total_ms);
            summary.best_sector1 = faster(summary.best_sector1, record.lap_num, t.sector1_ms);
            summary.best_sector2 = faster(summary.best_sector2, record.lap_num, t.sector2_ms);
            summary.best_sector3 = faster(summary.best_sector3, record.lap_num, t.sector3_ms);
            if t.total_ms > 0 {
                valid_times.push(t.total_ms);
            }
        }

        summary.consistency_ms = sample_std_dev(&valid_times);
        summary
    }

    /// Sum of the best sectors, when all three are known.
    pub fn theoretical_best_ms(&self) -> Option<u32> {
        let s1 = self.best_sector1?.time_ms;
        let s2 = self.best_sector2?.time_ms;
        let s3 = self.best_sector3?.time_ms;
        s1.checked_add(s2)?.checked_add(s3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{LapSource, LapTimes};
    use crate::session::LapContext;

    fn record(lap_num: u8, total: u32, s1: u32, s2: u32, valid: bool) -> LapRecord {
        LapRecord {
            session_id: SessionId::new(),
            lap_num,
            times: LapTimes::from_splits(total, s1, s2),
            valid,
            source: LapSource::History,
            context: LapContext {
                session_type: "R",
                track_name: "Spa",
                team_name: "Alpine",
                weather: "Clear",
            },
        }
    }

    #[test]
    fn empty_summary() {
        let summary = SessionSummary::from_records(None, []);
        assert_eq!(summary.lap_count, 0);
        assert_eq!(summary.best_lap, None);
        assert!(summary.consistency_ms.abs() < f64::EPSILON);
        assert_eq!(summary.theoretical_best_ms(), None);
    }

    #[test]
    fn best_times_ignore_invalid_laps() {
        let laps = [
            record(1, 90_000, 30_000, 31_000, true),
            record(2, 80_000, 25_000, 27_000, false),
            record(3, 88_000, 29_500, 31_500, true),
        ];
        let summary = SessionSummary::from_records(None, &laps);
        assert_eq!(summary.lap_count, 3);
        assert_eq!(summary.valid_lap_count, 2);
        assert_eq!(
            summary.best_lap,
            Some(BestTime {
                lap_num: 3,
                time_ms: 88_000
            })
        );
        assert_eq!(summary.best_sector1.map(|b| b.lap_num), Some(3));
        assert_eq!(summary.best_sector2.map(|b| b.lap_num), Some(1));
        // lap 1: 29_000, lap 3: 27_000
        assert_eq!(summary.best_sector3.map(|b| b.time_ms), Some(27_000));
        assert_eq!(summary.theoretical_best_ms(), Some(29_500 + 31_000 + 27_000));
    }

    #[test]
    fn consistency_is_sample_std_dev() {
        let laps = [
            record(1, 90_000, 1, 1, true),
            record(2, 92_000, 1, 1, true),
            record(3, 94_000, 1, 1, true),
        ];
        let summary = SessionSummary::from_records(None, &laps);
        assert!((summary.consistency_ms - 2_000.0).abs() < 1e-9);
    }

    #[test]
    fn ties_keep_earliest_lap() {
        let laps = [
            record(4, 85_000, 1, 1, true),
            record(5, 85_000, 1, 1, true),
        ];
        let summary = SessionSummary::from_records(None, &laps);
        assert_eq!(summary.best_lap.map(|b| b.lap_num), Some(4));
    }
}
