//! Tracker configuration.

use paddock_wire::PACKET_FORMAT_2022;
use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Laps a pending lap may trail the current lap before it is reported stale.
pub const DEFAULT_STALE_AFTER_LAPS: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Only datagrams with this `m_packetFormat` are accepted.
    pub packet_format: u16,
    /// Emit Live lap records from lap-data and fastest-lap events before the
    /// session history confirms them.
    pub provisional_laps: bool,
    pub stale_after_laps: u8,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            packet_format: PACKET_FORMAT_2022,
            provisional_laps: true,
            stale_after_laps: DEFAULT_STALE_AFTER_LAPS,
        }
    }
}

impl TrackerConfig {
    /// # Errors
    ///
    /// Returns [`TrackerError::InvalidConfig`] for an unsupported packet
    /// format or a zero stale threshold.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if self.packet_format != PACKET_FORMAT_2022 {
            return Err(TrackerError::InvalidConfig {
                field: "packet_format",
                message: format!(
                    "only {PACKET_FORMAT_2022} is supported, got {}",
                    self.packet_format
                ),
            });
        }
        if self.stale_after_laps == 0 {
            return Err(TrackerError::InvalidConfig {
                field: "stale_after_laps",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
