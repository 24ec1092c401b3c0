//! Output formatting for CLI responses
//!
//! Human output is colored text; `--json` prints one compact JSON object per
//! line so a long `listen` session can be piped line by line.

use anyhow::Error;
use colored::*;
use serde::Serialize;
use serde_json::json;

use paddock_tracker::{
    LapRecord, SessionContext, SessionSummary, TrackerEvent, TrackerStats,
};

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "chain": error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        }
    });
    print_json_line(&error_json);
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    // Print error chain if available
    for cause in error.chain().skip(1) {
        eprintln!("  {} {}", "Caused by:".yellow(), cause);
    }
}

/// Print any serializable value as one compact JSON line.
pub fn print_json_line<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format output as JSON: {e}"),
    }
}

/// `m:ss.mmm`, or `ss.mmm` under a minute.
pub fn format_lap_time(ms: u32) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    if minutes > 0 {
        format!("{minutes}:{seconds:02}.{millis:03}")
    } else {
        format!("{seconds}.{millis:03}")
    }
}

fn format_sector(ms: u32) -> String {
    if ms == 0 {
        "--.---".to_string()
    } else {
        format_lap_time(ms)
    }
}

/// Print a tracker event. Pending-lap events are JSON only.
pub fn print_event(event: &TrackerEvent, json: bool) {
    if json {
        print_json_line(event);
        return;
    }
    match event {
        TrackerEvent::SessionStarted { session } => print_session_human(session),
        TrackerEvent::LapPending { .. } => {}
        TrackerEvent::LapCompleted { record } => print_lap_human(record, None),
        TrackerEvent::LapFinalized { record, supersedes } => {
            print_lap_human(record, supersedes.as_ref());
        }
        TrackerEvent::StalePendingLaps { laps, .. } => {
            let laps: Vec<String> = laps.iter().map(ToString::to_string).collect();
            println!(
                "{} laps {} were never confirmed by session history",
                "⚠".yellow(),
                laps.join(", ")
            );
        }
    }
}

fn print_session_human(session: &SessionContext) {
    println!(
        "{} {} at {} ({}, track {}°C, air {}°C, {} laps)",
        "●".green(),
        session.session_type_label.bold(),
        session.track_name.bold(),
        session.weather_label,
        session.track_temperature,
        session.air_temperature,
        session.total_laps
    );
    if let Some(driver) = &session.driver {
        println!(
            "  {} #{} ({})",
            driver.driver_name, driver.race_number, driver.team_name
        );
    }
}

fn print_lap_human(record: &LapRecord, supersedes: Option<&LapRecord>) {
    let t = record.times;
    let source = if record.is_final() {
        "final".green()
    } else {
        "provisional".yellow()
    };
    let validity = if record.valid {
        "valid".normal()
    } else {
        "invalid".red()
    };
    println!(
        "  Lap {:>3}  {:>9}  S1 {:>7}  S2 {:>7}  S3 {:>7}  {}  {}",
        record.lap_num,
        format_lap_time(t.total_ms).bold(),
        format_sector(t.sector1_ms),
        format_sector(t.sector2_ms),
        format_sector(t.sector3_ms),
        validity,
        source
    );
    if let Some(live) = supersedes.filter(|live| live.times != t) {
        println!(
            "           {} {}",
            "corrects".dimmed(),
            format_lap_time(live.times.total_ms).dimmed()
        );
    }
}

/// Print the end-of-session summary.
pub fn print_summary(summary: &SessionSummary, stats: &TrackerStats, json: bool) {
    if json {
        print_json_line(&json!({
            "summary": summary,
            "theoretical_best_ms": summary.theoretical_best_ms(),
            "stats": stats,
        }));
        return;
    }

    println!("{}", "Session summary".bold());
    println!(
        "  laps: {} ({} valid)",
        summary.lap_count, summary.valid_lap_count
    );
    if let Some(best) = summary.best_lap {
        println!(
            "  best lap: {} (lap {})",
            format_lap_time(best.time_ms).green(),
            best.lap_num
        );
    }
    for (name, best) in [
        ("S1", summary.best_sector1),
        ("S2", summary.best_sector2),
        ("S3", summary.best_sector3),
    ] {
        if let Some(best) = best {
            println!(
                "  best {name}: {} (lap {})",
                format_lap_time(best.time_ms),
                best.lap_num
            );
        }
    }
    if let Some(theoretical) = summary.theoretical_best_ms() {
        println!("  theoretical best: {}", format_lap_time(theoretical));
    }
    if summary.valid_lap_count >= 2 {
        println!("  consistency: ±{:.0} ms", summary.consistency_ms);
    }
    println!(
        "  packets: {} received, {} applied, {} rejected, {} decode errors, {} out of order",
        stats.received, stats.applied, stats.rejected, stats.decode_errors, stats.out_of_order
    );
}

/// Print a one-line success message.
pub fn print_success(message: &str, json: bool) {
    if json {
        print_json_line(&json!({
            "success": true,
            "message": message
        }));
    } else {
        println!("{} {}", "✓".green(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lap_time_formatting() {
        assert_eq!(format_lap_time(85_000), "1:25.000");
        assert_eq!(format_lap_time(58_123), "58.123");
        assert_eq!(format_lap_time(0), "0.000");
        assert_eq!(format_lap_time(3_600_001), "60:00.001");
        assert_eq!(format_sector(0), "--.---");
    }
}
