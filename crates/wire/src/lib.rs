//! F1 22 UDP telemetry wire format.
//!
//! Decodes the EA/Codemasters F1 22 (packet format `2022`) binary UDP protocol.
//! Every packet starts with the same 24-byte [`PacketHeader`]; the payload
//! layout depends on the packet id. All fields are little-endian and sit at
//! fixed offsets.
//!
//! ## Decoded packet types
//!
//! | Packet ID | Name            | Fields used                                   |
//! |-----------|-----------------|-----------------------------------------------|
//! | 1         | Session         | weather, temperatures, session type, track ID |
//! | 2         | Lap Data        | full 43-byte entry for one car                |
//! | 3         | Event           | 4-byte code plus typed details                |
//! | 4         | Participants    | team ID, race number, driver name             |
//! | 11        | Session History | per-lap times, sector times, validity flags   |
//!
//! All other packet ids are classified but never decoded.
//!
//! ## Layers
//!
//! - [`codec`]: scalar reads at arbitrary offsets ([`read_at`]) plus the
//!   cursor-style [`ByteReader`] / [`ByteWriter`] pair.
//! - [`classify()`]: header-only inspection that rejects short buffers and
//!   foreign protocol versions.
//! - One module per payload with named offset constants and a `parse_*`
//!   function. Decoders never validate ranges; that is the caller's job.
//! - [`builders`]: assemble complete datagrams (tests, fixtures, replay).

#![deny(static_mut_refs)]

pub mod builders;
pub mod catalog;
pub mod classify;
pub mod codec;
pub mod error;
pub mod event;
pub mod header;
pub mod history;
pub mod lap_data;
pub mod participants;
pub mod session;

pub use classify::{Classified, PacketKind, Rejection, classify};
pub use codec::{ByteReader, ByteWriter, LeScalar, read_at};
pub use error::DecodeError;
pub use event::{EventCode, EventDetails, EventPacket, parse_event};
pub use header::{
    HEADER_SIZE, MAX_DATAGRAM_BYTES, NUM_CARS, PACKET_FORMAT_2022, PacketHeader, parse_header,
};
pub use history::{LapHistoryEntry, SessionHistory, parse_session_history};
pub use lap_data::{LAP_DATA_ENTRY_SIZE, LapDataEntry, parse_lap_data};
pub use participants::{
    PARTICIPANT_ENTRY_SIZE, ParticipantEntry, parse_num_active_cars, parse_participant,
};
pub use session::{SessionData, parse_session_data};
