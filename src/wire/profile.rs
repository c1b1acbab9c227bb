//! Field catalog for the emitted message types.
//!
//! Only the fields the assembler emits are catalogued. Scales and offsets
//! follow the global profile's measurement encodings (for example, distances
//! are stored in centimeters and altitudes shifted by 500 meters).

use super::value::BaseType;

/// A message type emitted into an activity document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    FileId,
    DeveloperDataId,
    FieldDescription,
    Activity,
    Session,
    Lap,
    Record,
}

impl MessageKind {
    /// The global message number for this type.
    pub fn number(self) -> u16 {
        match self {
            MessageKind::FileId => 0,
            MessageKind::Session => 18,
            MessageKind::Lap => 19,
            MessageKind::Record => 20,
            MessageKind::Activity => 34,
            MessageKind::FieldDescription => 206,
            MessageKind::DeveloperDataId => 207,
        }
    }
}

/// Wire placement and measurement conversion for one field.
#[derive(Clone, Copy, Debug)]
pub struct FieldSpec {
    /// Field definition number.
    pub number: u8,
    /// Base type the value serializes to.
    pub base: BaseType,
    /// Units per natural unit, applied to floating-point inputs.
    pub scale: f64,
    /// Shift applied before scaling.
    pub offset: f64,
}

const fn plain(number: u8, base: BaseType) -> FieldSpec {
    FieldSpec { number, base, scale: 1.0, offset: 0.0 }
}

const fn scaled(number: u8, base: BaseType, scale: f64, offset: f64) -> FieldSpec {
    FieldSpec { number, base, scale, offset }
}

/// Look up the wire placement of a named field.
pub(crate) fn field(kind: MessageKind, name: &str) -> Option<FieldSpec> {
    use BaseType::*;

    let spec = match (kind, name) {
        (MessageKind::FileId, "type") => plain(0, Enum),
        (MessageKind::FileId, "manufacturer") => plain(1, Uint16),
        (MessageKind::FileId, "product") => plain(2, Uint16),
        (MessageKind::FileId, "serial_number") => plain(3, Uint32z),
        (MessageKind::FileId, "time_created") => plain(4, Uint32),
        (MessageKind::FileId, "product_name") => plain(8, String),

        (MessageKind::DeveloperDataId, "application_id") => plain(1, Byte),
        (MessageKind::DeveloperDataId, "developer_data_index") => plain(3, Uint8),
        (MessageKind::DeveloperDataId, "application_version") => plain(4, Uint32),

        (MessageKind::FieldDescription, "developer_data_index") => plain(0, Uint8),
        (MessageKind::FieldDescription, "field_definition_number") => plain(1, Uint8),
        (MessageKind::FieldDescription, "fit_base_type_id") => plain(2, Uint8),
        (MessageKind::FieldDescription, "field_name") => plain(3, String),
        (MessageKind::FieldDescription, "units") => plain(8, String),

        (MessageKind::Activity, "total_timer_time") => scaled(0, Uint32, 1000.0, 0.0),
        (MessageKind::Activity, "num_sessions") => plain(1, Uint16),
        (MessageKind::Activity, "type") => plain(2, Enum),
        (MessageKind::Activity, "event") => plain(3, Enum),
        (MessageKind::Activity, "event_type") => plain(4, Enum),
        (MessageKind::Activity, "local_timestamp") => plain(5, Uint32),
        (MessageKind::Activity, "timestamp") => plain(253, Uint32),

        (MessageKind::Session, "event") => plain(0, Enum),
        (MessageKind::Session, "event_type") => plain(1, Enum),
        (MessageKind::Session, "start_time") => plain(2, Uint32),
        (MessageKind::Session, "start_position_lat") => plain(3, Sint32),
        (MessageKind::Session, "start_position_long") => plain(4, Sint32),
        (MessageKind::Session, "sport") => plain(5, Enum),
        (MessageKind::Session, "total_elapsed_time") => scaled(7, Uint32, 1000.0, 0.0),
        (MessageKind::Session, "total_timer_time") => scaled(8, Uint32, 1000.0, 0.0),
        (MessageKind::Session, "total_distance") => scaled(9, Uint32, 100.0, 0.0),
        (MessageKind::Session, "first_lap_index") => plain(25, Uint16),
        (MessageKind::Session, "num_laps") => plain(26, Uint16),
        (MessageKind::Session, "timestamp") => plain(253, Uint32),

        (MessageKind::Lap, "event") => plain(0, Enum),
        (MessageKind::Lap, "event_type") => plain(1, Enum),
        (MessageKind::Lap, "start_time") => plain(2, Uint32),
        (MessageKind::Lap, "start_position_lat") => plain(3, Sint32),
        (MessageKind::Lap, "start_position_long") => plain(4, Sint32),
        (MessageKind::Lap, "total_elapsed_time") => scaled(7, Uint32, 1000.0, 0.0),
        (MessageKind::Lap, "total_timer_time") => scaled(8, Uint32, 1000.0, 0.0),
        (MessageKind::Lap, "total_distance") => scaled(9, Uint32, 100.0, 0.0),
        (MessageKind::Lap, "sport") => plain(25, Enum),
        (MessageKind::Lap, "timestamp") => plain(253, Uint32),

        (MessageKind::Record, "position_lat") => plain(0, Sint32),
        (MessageKind::Record, "position_long") => plain(1, Sint32),
        (MessageKind::Record, "altitude") => scaled(2, Uint16, 5.0, 500.0),
        (MessageKind::Record, "heart_rate") => plain(3, Uint8),
        (MessageKind::Record, "cadence") => plain(4, Uint8),
        (MessageKind::Record, "distance") => scaled(5, Uint32, 100.0, 0.0),
        (MessageKind::Record, "speed") => scaled(6, Uint16, 1000.0, 0.0),
        (MessageKind::Record, "power") => plain(7, Uint16),
        (MessageKind::Record, "cycles") => plain(18, Uint8),
        (MessageKind::Record, "timestamp") => plain(253, Uint32),

        _ => return None,
    };

    Some(spec)
}
