//! Session identity and the context captured with each lap.

use std::fmt;

use paddock_wire::{ParticipantEntry, SessionData};
use paddock_wire::catalog::{session_type_label, team_name, track_name, weather_label};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const UNKNOWN_TEAM: &str = "Unknown";

/// Locally generated session id. A fresh one is minted whenever the game's
/// session UID or the session type changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The pair that identifies a session on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SessionKey {
    pub session_uid: u64,
    pub session_type: u8,
}

/// Player team and name, from the participants packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverInfo {
    pub team_id: u8,
    pub team_name: &'static str,
    pub driver_name: String,
    pub race_number: u8,
}

impl DriverInfo {
    pub fn from_participant(entry: &ParticipantEntry) -> Self {
        Self {
            team_id: entry.team_id,
            team_name: team_name(entry.team_id),
            driver_name: entry.name.clone(),
            race_number: entry.race_number,
        }
    }
}

/// Everything known about the current session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionContext {
    pub id: SessionId,
    pub session_uid: u64,
    pub session_type: u8,
    pub session_type_label: &'static str,
    pub track_id: i8,
    pub track_name: &'static str,
    pub weather: u8,
    pub weather_label: &'static str,
    pub track_temperature: i8,
    pub air_temperature: i8,
    pub total_laps: u8,
    pub track_length: u16,
    pub player_car_index: Option<u8>,
    pub driver: Option<DriverInfo>,
}

impl SessionContext {
    pub fn new(
        id: SessionId,
        session_uid: u64,
        data: &SessionData,
        player_car_index: Option<u8>,
        driver: Option<DriverInfo>,
    ) -> Self {
        Self {
            id,
            session_uid,
            session_type: data.session_type,
            session_type_label: session_type_label(data.session_type),
            track_id: data.track_id,
            track_name: track_name(data.track_id),
            weather: data.weather,
            weather_label: weather_label(data.weather),
            track_temperature: data.track_temperature,
            air_temperature: data.air_temperature,
            total_laps: data.total_laps,
            track_length: data.track_length,
            player_car_index,
            driver,
        }
    }

    pub fn key(&self) -> SessionKey {
        SessionKey {
            session_uid: self.session_uid,
            session_type: self.session_type,
        }
    }

    /// A copy of this context with new driver details.
    pub fn with_driver(&self, driver: DriverInfo) -> Self {
        Self {
            driver: Some(driver),
            ..self.clone()
        }
    }

    /// Snapshot attached to laps completed under this context.
    pub fn lap_context(&self) -> LapContext {
        LapContext {
            session_type: self.session_type_label,
            track_name: self.track_name,
            team_name: self.driver.as_ref().map_or(UNKNOWN_TEAM, |d| d.team_name),
            weather: self.weather_label,
        }
    }
}

/// Display labels captured when a lap is detected complete. Later session
/// updates (weather changes, a team swap) do not rewrite them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LapContext {
    pub session_type: &'static str,
    pub track_name: &'static str,
    pub team_name: &'static str,
    pub weather: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silverstone_race() -> SessionData {
        SessionData {
            weather: 2,
            track_temperature: 30,
            air_temperature: 21,
            total_laps: 52,
            track_length: 5891,
            session_type: 10,
            track_id: 7,
        }
    }

    #[test]
    fn context_resolves_labels() {
        let ctx = SessionContext::new(SessionId::new(), 1, &silverstone_race(), Some(0), None);
        assert_eq!(ctx.track_name, "Silverstone");
        assert_eq!(ctx.session_type_label, "R");
        assert_eq!(ctx.weather_label, "Overcast");
        assert_eq!(
            ctx.key(),
            SessionKey {
                session_uid: 1,
                session_type: 10
            }
        );
    }

    #[test]
    fn lap_context_uses_driver_team_when_known() {
        let ctx = SessionContext::new(SessionId::new(), 1, &silverstone_race(), Some(0), None);
        assert_eq!(ctx.lap_context().team_name, "Unknown");

        let ctx = ctx.with_driver(DriverInfo::from_participant(&ParticipantEntry {
            team_id: 1,
            race_number: 16,
            name: "LECLERC".to_string(),
            ..ParticipantEntry::default()
        }));
        let lap = ctx.lap_context();
        assert_eq!(lap.team_name, "Ferrari");
        assert_eq!(lap.track_name, "Silverstone");
        assert_eq!(lap.session_type, "R");
        assert_eq!(lap.weather, "Overcast");
        assert_eq!(
            ctx.driver.map(|d| (d.driver_name, d.race_number)),
            Some(("LECLERC".to_string(), 16))
        );
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
