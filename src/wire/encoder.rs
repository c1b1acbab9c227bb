//! Document builder writing definition and data records.

use tartan_bitfield::bitfield;
use zerocopy::{Immutable, IntoBytes};

use super::{
    DeveloperField, EncodeError, Encoder,
    check::checksum,
    profile::{self, MessageKind},
    value::Value,
};

const HEADER_SIZE: u8 = 14;
const PROTOCOL_VERSION: u8 = 0x20;
const PROFILE_VERSION: u16 = 2140;

// Header byte prefixing every record.
bitfield! {
    struct RecordHeader(u8) {
        [0..4] local_message: u8,
        [5] is_developer,
        [6] is_definition,
    }
}

/// Fixed-size prefix of a definition message.
#[repr(C, packed)]
#[derive(IntoBytes, Immutable)]
struct DefinitionMessage {
    reserved: u8,
    architecture: u8,
    global_message: [u8; 2],
    field_count: u8,
}

/// One field entry of a definition message.
#[repr(C, packed)]
#[derive(IntoBytes, Immutable)]
struct FieldHeader {
    field: u8,
    size: u8,
    base_type: u8,
}

/// One developer field entry of a definition message.
#[repr(C, packed)]
#[derive(IntoBytes, Immutable)]
struct DeveloperFieldHeader {
    field: u8,
    size: u8,
    index: u8,
}

/// A definition occupying one local message slot.
struct Slot {
    kind: MessageKind,
    shape: Vec<u8>,
}

/// An in-progress activity document.
///
/// Messages accumulate in an internal record buffer; [`Encoder::finish`]
/// frames the buffer with the document header and trailing cyclic redundancy
/// check. A finished document is a complete, self-contained file.
#[derive(Default)]
pub struct Document {
    records: Vec<u8>,
    slots: [Option<Slot>; 16],
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Find or assign the local message slot for `kind`, emitting a
    /// definition record whenever the stored shape differs from `shape`.
    fn define(
        &mut self,
        kind: MessageKind,
        shape: Vec<u8>,
        has_developer: bool,
    ) -> Result<u8, EncodeError> {
        let occupied = self
            .slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|slot| slot.kind == kind));

        let (local, stale) = match occupied {
            Some(i) => {
                let stale = self.slots[i]
                    .as_ref()
                    .is_none_or(|slot| slot.shape != shape);
                (i, stale)
            }
            None => {
                let free = self
                    .slots
                    .iter()
                    .position(|slot| slot.is_none())
                    .ok_or(EncodeError::SlotsFull)?;
                (free, true)
            }
        };

        if stale {
            let mut header = RecordHeader(0);
            header.set_is_definition(true);
            header.set_is_developer(has_developer);
            header.set_local_message(local as u8);

            self.records.push(header.0);
            self.records.extend_from_slice(&shape);
            self.slots[local] = Some(Slot { kind, shape });
        }

        Ok(local as u8)
    }
}

impl Encoder for Document {
    fn write(
        &mut self,
        kind: MessageKind,
        fields: &[(&'static str, Value)],
        developer: &[DeveloperField],
        last: bool,
    ) -> Result<(), EncodeError> {
        // Serialize values up front so the definition carries exact sizes.
        let mut encoded = Vec::with_capacity(fields.len());
        for &(name, value) in fields {
            let spec = profile::field(kind, name).ok_or(EncodeError::UnknownField(name))?;
            let bytes = value
                .to_wire(spec.base, spec.scale, spec.offset)
                .ok_or(EncodeError::OutOfRange(name))?;
            encoded.push((spec.number, spec.base.code(), bytes));
        }

        let mut shape = Vec::new();
        let message = DefinitionMessage {
            reserved: 0,
            architecture: 0,
            global_message: kind.number().to_le_bytes(),
            field_count: encoded.len() as u8,
        };
        shape.extend_from_slice(message.as_bytes());

        for (number, code, bytes) in &encoded {
            let field = FieldHeader {
                field: *number,
                size: bytes.len() as u8,
                base_type: *code,
            };
            shape.extend_from_slice(field.as_bytes());
        }

        if !developer.is_empty() {
            shape.push(developer.len() as u8);
            for attachment in developer {
                let field = DeveloperFieldHeader {
                    field: attachment.number,
                    size: size_of::<f64>() as u8,
                    index: attachment.index,
                };
                shape.extend_from_slice(field.as_bytes());
            }
        }

        let local = self.define(kind, shape, !developer.is_empty())?;

        let mut header = RecordHeader(0);
        header.set_local_message(local);

        self.records.push(header.0);
        for (_, _, bytes) in &encoded {
            self.records.extend_from_slice(bytes);
        }
        for attachment in developer {
            self.records.extend_from_slice(&attachment.value.to_le_bytes());
        }

        if last {
            self.slots[local as usize] = None;
        }

        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>, EncodeError> {
        /// Leading bytes of the document, before the header check value.
        #[repr(C, packed)]
        #[derive(IntoBytes, Immutable)]
        struct FileHeader {
            header_size: u8,
            protocol_version: u8,
            profile_version: [u8; 2],
            data_size: [u8; 4],
            data_type: [u8; 4],
        }

        let data_size =
            u32::try_from(self.records.len()).map_err(|_| EncodeError::OutOfRange("data_size"))?;

        let header = FileHeader {
            header_size: HEADER_SIZE,
            protocol_version: PROTOCOL_VERSION,
            profile_version: PROFILE_VERSION.to_le_bytes(),
            data_size: data_size.to_le_bytes(),
            data_type: *b".FIT",
        };

        let mut document = Vec::with_capacity(HEADER_SIZE as usize + self.records.len() + 2);
        document.extend_from_slice(header.as_bytes());
        document.extend_from_slice(&checksum(0, header.as_bytes()).to_le_bytes());
        document.extend_from_slice(&self.records);

        let check = checksum(0, &document);
        document.extend_from_slice(&check.to_le_bytes());

        Ok(document)
    }
}
