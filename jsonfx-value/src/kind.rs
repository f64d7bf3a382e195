//! Type discriminant and capability flags.
//!
//! A [`Value`](crate::Value) stores only its payload variant. The
//! [`ValueType`] and the [`TypeFlags`] are derived from that variant on
//! demand, so they can never disagree with it.

use bitflags::bitflags;

/// The seven kinds of value, in their historical numeric order.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueType {
    /// Key-value map
    Object = 0,
    /// UTF-8 string
    String = 1,
    /// Integer or floating point number
    Number = 2,
    /// Boolean `true`
    True = 3,
    /// Boolean `false`
    False = 4,
    /// Ordered sequence
    Array = 5,
    /// Null
    Null = 6,
}

impl ValueType {
    /// Lower-case name, as used in assertion messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ValueType::Object => "object",
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::True => "true",
            ValueType::False => "false",
            ValueType::Array => "array",
            ValueType::Null => "null",
        }
    }
}

bitflags! {
    /// Capabilities of a value, derived from its payload.
    ///
    /// The bit positions match the packed tag word reported by
    /// [`Value::raw_tag`](crate::Value::raw_tag); the low byte of that word is
    /// the [`ValueType`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TypeFlags: u32 {
        /// `true` or `false`
        const BOOL = 0x0000_0100;
        /// Stored as `i32`
        const INT32 = 0x0000_2000;
        /// Stored as `u32`
        const UINT32 = 0x0000_4000;
        /// Stored as `i64`
        const INT64 = 0x0000_8000;
        /// Stored as `u64`
        const UINT64 = 0x0001_0000;
        /// Any integer representation
        const INTEGER = 0x0002_0000;
        /// Stored as `f32`
        const FLOAT = 0x0004_0000;
        /// Stored as `f64`
        const DOUBLE = 0x0008_0000;
        /// Any number
        const NUMBER = 0x0010_0000;
        /// Any string
        const STRING = 0x0020_0000;
        /// The string bytes were copied and belong to the value
        const OWNED_STR = 0x0040_0000;
        /// The string bytes live inside the value
        const INLINE_STR = 0x0080_0000;
    }
}

/// Mask selecting the [`ValueType`] byte of a packed tag.
pub const TYPE_MASK: u32 = 0xFF;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discriminants_follow_declaration_order() {
        assert_eq!(ValueType::Object as u8, 0);
        assert_eq!(ValueType::Null as u8, 6);
        assert!(ValueType::String < ValueType::Array);
    }

    #[test]
    fn flags_never_touch_the_type_byte() {
        assert_eq!(TypeFlags::all().bits() & TYPE_MASK, 0);
    }
}
