//! Numeric payload.

use core::fmt::{self, Debug, Display, Formatter};

use crate::kind::TypeFlags;

/// A number in the representation it was built with.
///
/// The representation is kept as-is: a number set from an `i32` answers
/// `is_int` and nothing else, even if it would also fit in a `u32`.
#[derive(Clone, Copy)]
pub enum Number {
    /// 32-bit signed integer
    I32(i32),
    /// 32-bit unsigned integer
    U32(u32),
    /// 64-bit signed integer
    I64(i64),
    /// 64-bit unsigned integer
    U64(u64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
}

impl Number {
    pub(crate) const fn flags(self) -> TypeFlags {
        let repr = match self {
            Number::I32(_) => TypeFlags::INT32.union(TypeFlags::INTEGER),
            Number::U32(_) => TypeFlags::UINT32.union(TypeFlags::INTEGER),
            Number::I64(_) => TypeFlags::INT64.union(TypeFlags::INTEGER),
            Number::U64(_) => TypeFlags::UINT64.union(TypeFlags::INTEGER),
            Number::F32(_) => TypeFlags::FLOAT,
            Number::F64(_) => TypeFlags::DOUBLE,
        };
        repr.union(TypeFlags::NUMBER)
    }

    /// The exact integer value, for any integer representation.
    #[must_use]
    pub const fn as_i128(self) -> Option<i128> {
        match self {
            Number::I32(v) => Some(v as i128),
            Number::U32(v) => Some(v as i128),
            Number::I64(v) => Some(v as i128),
            Number::U64(v) => Some(v as i128),
            Number::F32(_) | Number::F64(_) => None,
        }
    }

    /// The value as an `f64`, possibly losing precision.
    #[must_use]
    pub const fn to_f64(self) -> f64 {
        match self {
            Number::I32(v) => v as f64,
            Number::U32(v) => v as f64,
            Number::I64(v) => v as f64,
            Number::U64(v) => v as f64,
            Number::F32(v) => v as f64,
            Number::F64(v) => v,
        }
    }

    /// `true` for the two float representations.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Number::F32(_) | Number::F64(_))
    }
}

/// Numbers compare by value: `Number::I32(1) == Number::U64(1)`, and an
/// integer equals a float holding the same value.
impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        match (self.as_i128(), other.as_i128()) {
            (Some(a), Some(b)) => a == b,
            _ => self.to_f64() == other.to_f64(),
        }
    }
}

impl Debug for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Display for Number {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Number::I32(v) => write!(f, "{v}"),
            Number::U32(v) => write!(f, "{v}"),
            Number::I64(v) => write!(f, "{v}"),
            Number::U64(v) => write!(f, "{v}"),
            Number::F32(v) => write!(f, "{v:?}"),
            Number::F64(v) => write!(f, "{v:?}"),
        }
    }
}

macro_rules! impl_from_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Number {
                fn from(v: $ty) -> Self {
                    Number::$variant(v)
                }
            }
        )*
    };
}

impl_from_primitive! {
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn each_representation_has_its_own_flag() {
        assert!(Number::I32(1).flags().contains(TypeFlags::INT32 | TypeFlags::INTEGER));
        assert!(!Number::I32(1).flags().contains(TypeFlags::UINT32));
        assert!(!Number::F32(1.0).flags().contains(TypeFlags::DOUBLE));
        assert!(!Number::F64(1.0).flags().contains(TypeFlags::FLOAT));
        assert!(Number::U64(1).flags().contains(TypeFlags::NUMBER));
    }

    #[test]
    fn compares_by_value() {
        assert_eq!(Number::I32(-3), Number::I64(-3));
        assert_eq!(Number::U64(u64::MAX), Number::U64(u64::MAX));
        assert_ne!(Number::U64(u64::MAX), Number::I64(-1));
        assert_eq!(Number::F64(2.0), Number::U32(2));
        assert_ne!(Number::F64(f64::NAN), Number::F64(f64::NAN));
    }

    #[test]
    fn display_keeps_float_marker() {
        assert_eq!(Number::F64(1.0).to_string(), "1.0");
        assert_eq!(Number::F32(0.5).to_string(), "0.5");
        assert_eq!(Number::I64(-42).to_string(), "-42");
    }
}
