//! Tokio UDP listener for the F1 22 telemetry stream.
//!
//! [`TelemetryListener`] binds a UDP socket and spawns one task that owns
//! both the socket and a [`paddock_tracker::Tracker`]. Consumers read from the
//! returned [`ListenerHandle`]:
//!
//! - `laps()`: Live and History [`paddock_tracker::LapRecord`]s,
//! - `events()`: every [`paddock_tracker::TrackerEvent`],
//! - `snapshot()`: a `watch` receiver of the latest tracker state,
//! - `subscribe(kind)`: raw copies of one packet kind.
//!
//! Channels are bounded; a slow consumer loses messages instead of stalling
//! the socket.
//!
//! ```no_run
//! use paddock_listener::{ListenerConfig, TelemetryListener};
//!
//! # async fn run() -> Result<(), paddock_listener::ListenerError> {
//! let mut handle = TelemetryListener::new(ListenerConfig::from_env()).start().await?;
//! while let Some(lap) = handle.laps().recv().await {
//!     println!("lap {} in {:.3}s", lap.lap_num, lap.times.total_secs());
//! }
//! let tracker = handle.shutdown().await?;
//! println!("{} laps", tracker.summary().lap_count);
//! # Ok(())
//! # }
//! ```

#![deny(static_mut_refs)]

pub mod config;
pub mod error;
pub mod listener;
pub mod packet;

pub use config::{DEFAULT_PORT, ListenerConfig};
pub use error::ListenerError;
pub use listener::{ListenerHandle, TelemetryListener};
pub use packet::RawPacket;
