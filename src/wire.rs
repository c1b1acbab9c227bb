//! Low-level encoding of activity documents.
//!
//! This module serializes individual messages into the wire format: each
//! message type is introduced by a definition record carrying its field
//! layout, followed by data records holding the values themselves. The
//! [`Encoder`] trait captures the four operations the assembler needs (unit
//! conversions for instants and coordinates, message serialization, and
//! finishing), so the assembly logic in [`crate::activity`] can be exercised
//! against a recording encoder without producing real documents.
//!
//! [`Document`] is the concrete implementation. It manages the sixteen
//! local message slots, re-emitting a definition only when a message type's
//! field shape changes, and on finishing frames the record section with the
//! document header and trailing cyclic redundancy check.

pub mod check;
pub mod encoder;
pub mod profile;
pub mod value;

pub use encoder::Document;

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

use self::{profile::MessageKind, value::Value};

/// Seconds from the Unix epoch to the format's epoch (1989-12-31T00:00:00Z).
const EPOCH_OFFSET: i64 = 631_065_600;

/// Semicircles per degree of arc.
const SEMICIRCLES_PER_DEGREE: f64 = 2_147_483_648.0 / 180.0;

/// An error serializing a message into a document.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The message type has no field with this name.
    #[error("Message type has no field `{0}`.")]
    UnknownField(&'static str),
    /// A value rounds outside its wire representation.
    #[error("Value for field `{0}` is outside its wire representation.")]
    OutOfRange(&'static str),
    /// All sixteen local message slots are live.
    #[error("All local message slots are live.")]
    SlotsFull,
}

/// A developer field attached to a single data message.
///
/// The field must have been declared earlier in the document by a field
/// description message carrying the same field definition number and
/// developer data index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeveloperField {
    /// Field definition number from the field description.
    pub number: u8,
    /// Developer data index of the declaring application.
    pub index: u8,
    /// The attached reading.
    pub value: f64,
}

/// Capability to serialize messages and produce a finished document.
///
/// One encoder instance backs one document; the caller writes messages in
/// document order and finishes exactly once.
pub trait Encoder {
    /// Convert an absolute instant to the wire time representation.
    ///
    /// Instants before the format's epoch clamp to zero.
    fn timestamp(&self, instant: &DateTime<FixedOffset>) -> u32 {
        (instant.timestamp() - EPOCH_OFFSET).clamp(0, u32::MAX as i64) as u32
    }

    /// Convert decimal degrees to the fixed-point angular representation.
    fn semicircles(&self, degrees: f64) -> i32 {
        (degrees * SEMICIRCLES_PER_DEGREE).round() as i32
    }

    /// Serialize one message from a set of named field values.
    ///
    /// `last` marks the final message of its type, releasing the definition
    /// context held for that type.
    fn write(
        &mut self,
        kind: MessageKind,
        fields: &[(&'static str, Value)],
        developer: &[DeveloperField],
        last: bool,
    ) -> Result<(), EncodeError>;

    /// Complete the document and return the encoded bytes.
    fn finish(self) -> Result<Vec<u8>, EncodeError>
    where
        Self: Sized;
}
