//! Field values and their base-type serialization.

/// A base type of the wire format.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BaseType {
    /// `enum`
    Enum,
    /// `sint8`
    Sint8,
    /// `uint8`
    Uint8,
    /// `uint8z`
    Uint8z,
    /// `string`
    String,
    /// `byte`
    Byte,
    /// `sint16`
    Sint16,
    /// `uint16`
    Uint16,
    /// `uint16z`
    Uint16z,
    /// `sint32`
    Sint32,
    /// `uint32`
    Uint32,
    /// `uint32z`
    Uint32z,
    /// `float32`
    Float32,
    /// `float64`
    Float64,
}

impl BaseType {
    /// The wire code identifying this base type in a definition field.
    pub fn code(self) -> u8 {
        match self {
            BaseType::Enum => 0x00,
            BaseType::Sint8 => 0x01,
            BaseType::Uint8 => 0x02,
            BaseType::String => 0x07,
            BaseType::Uint8z => 0x0A,
            BaseType::Byte => 0x0D,
            BaseType::Sint16 => 0x83,
            BaseType::Uint16 => 0x84,
            BaseType::Sint32 => 0x85,
            BaseType::Uint32 => 0x86,
            BaseType::Float32 => 0x88,
            BaseType::Float64 => 0x89,
            BaseType::Uint16z => 0x8B,
            BaseType::Uint32z => 0x8C,
        }
    }
}

/// A field value supplied for serialization.
///
/// Measurements are passed as [`Value::Float64`] in their natural units and
/// converted to the field's wire integer by the catalogued scale and offset.
/// The remaining variants carry values already in wire form.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Sint32(i32),
    Float64(f64),
    Text(&'static str),
    Bytes(&'static [u8]),
}

impl Value {
    /// Serialize for `base`, applying the measurement scale and offset to
    /// floating-point inputs.
    ///
    /// Returns `None` when the value has no representation in `base`, either
    /// because the rounded result falls outside the target range or because
    /// the variant and base type cannot be paired.
    pub(crate) fn to_wire(self, base: BaseType, scale: f64, offset: f64) -> Option<Vec<u8>> {
        match (self, base) {
            (Value::Uint8(x), BaseType::Enum | BaseType::Uint8 | BaseType::Uint8z) => {
                Some(vec![x])
            }
            (Value::Uint16(x), BaseType::Uint16 | BaseType::Uint16z) => {
                Some(x.to_le_bytes().to_vec())
            }
            (Value::Uint32(x), BaseType::Uint32 | BaseType::Uint32z) => {
                Some(x.to_le_bytes().to_vec())
            }
            (Value::Sint32(x), BaseType::Sint32) => Some(x.to_le_bytes().to_vec()),
            (Value::Float64(x), BaseType::Float64) => Some(x.to_le_bytes().to_vec()),
            (Value::Float64(x), BaseType::Float32) => Some((x as f32).to_le_bytes().to_vec()),
            (Value::Float64(x), _) => scaled(x, base, scale, offset),
            (Value::Text(s), BaseType::String) => {
                let mut bytes = s.as_bytes().to_vec();
                bytes.push(0);
                Some(bytes)
            }
            (Value::Bytes(b), BaseType::Byte) => Some(b.to_vec()),
            _ => None,
        }
    }
}

/// Scale a measurement into an integer base type, refusing values that round
/// outside the target range.
fn scaled(x: f64, base: BaseType, scale: f64, offset: f64) -> Option<Vec<u8>> {
    let wire = ((x + offset) * scale).round();

    macro_rules! bounded {
        ($t:ty) => {{
            if wire >= <$t>::MIN as f64 && wire <= <$t>::MAX as f64 {
                Some((wire as $t).to_le_bytes().to_vec())
            } else {
                None
            }
        }};
    }

    match base {
        BaseType::Enum | BaseType::Uint8 | BaseType::Uint8z => bounded!(u8),
        BaseType::Sint8 => bounded!(i8),
        BaseType::Uint16 | BaseType::Uint16z => bounded!(u16),
        BaseType::Sint16 => bounded!(i16),
        BaseType::Uint32 | BaseType::Uint32z => bounded!(u32),
        BaseType::Sint32 => bounded!(i32),
        _ => None,
    }
}
