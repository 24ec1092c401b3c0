//! Session and lap state tracking for the F1 22 telemetry stream.
//!
//! [`Tracker`] consumes raw datagrams one at a time and turns the lossy,
//! reordered UDP stream into lap records:
//!
//! - **Session** packets mint a local [`SessionId`] whenever the game's
//!   session UID or session type changes, clearing all lap state.
//! - **Lap data** drives [`LapProgress`] (sector splits, sticky invalid
//!   flag) and marks each completed lap as pending.
//! - **Session history** is authoritative: it finalizes pending laps with
//!   the game's own lap and sector times.
//! - **Events**: fastest-lap gives an early provisional record, flashback
//!   rewinds lap progress, session end reports laps history never confirmed.
//!
//! Provisional (Live) records are corrected by the History record for the
//! same lap; see [`ledger`] for the slot rules.
//!
//! ```
//! use paddock_tracker::{Ingest, Tracker};
//!
//! let mut tracker = Tracker::default();
//! let outcome = tracker.ingest(&[0u8; 8]);
//! assert!(matches!(outcome, Ingest::Dropped(_)));
//! ```

#![deny(static_mut_refs)]

pub mod config;
pub mod error;
pub mod event;
pub mod ledger;
pub mod progress;
pub mod session;
pub mod summary;
pub mod tracker;

pub use config::TrackerConfig;
pub use error::{DropReason, TrackerError};
pub use event::TrackerEvent;
pub use ledger::{LapRecord, LapSource, LapTimes, PendingLap, resolve_sector3};
pub use progress::{LapProgress, SectorSplits};
pub use session::{DriverInfo, LapContext, SessionContext, SessionId, SessionKey};
pub use summary::{BestTime, SessionSummary};
pub use tracker::{Ingest, Tracker, TrackerSnapshot, TrackerStats};
