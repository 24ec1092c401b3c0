//! `paddockctl replay`: run captured datagrams through a tracker offline.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use paddock_tracker::{Tracker, TrackerConfig};
use tracing::{debug, warn};

use crate::commands::ReplayArgs;
use crate::error::CliError;
use crate::output;

/// Expand directories into their files, sorted by name. Plain file
/// arguments keep their command-line order.
pub fn collect_datagram_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>, CliError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut entries: Vec<PathBuf> = std::fs::read_dir(path)?
                .filter_map(Result::ok)
                .map(|entry| entry.path())
                .filter(|p| p.is_file())
                .collect();
            entries.sort();
            files.extend(entries);
        } else {
            files.push(path.clone());
        }
    }
    if files.is_empty() {
        return Err(CliError::NoInput("no datagram files found".to_string()));
    }
    Ok(files)
}

fn read_datagram(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read datagram '{}'", path.display()))
}

pub fn execute(args: &ReplayArgs, json: bool) -> Result<()> {
    let files = collect_datagram_files(&args.paths)?;
    let config = TrackerConfig {
        provisional_laps: !args.no_provisional,
        ..TrackerConfig::default()
    };
    let mut tracker = Tracker::new(config);

    for path in &files {
        let raw = read_datagram(path)?;
        let ingest = tracker.ingest(&raw);
        debug!(file = %path.display(), len = raw.len(), ?ingest, "replayed datagram");
        for event in ingest.into_events() {
            output::print_event(&event, json);
        }
    }

    let stale = tracker.pending_laps();
    if !stale.is_empty() {
        let laps: Vec<u8> = stale.iter().map(|lap| lap.lap_num).collect();
        warn!(?laps, "Replay ended with laps the session history never confirmed");
    }
    output::print_summary(&tracker.summary(), &tracker.stats(), json);
    Ok(())
}
