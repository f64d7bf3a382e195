//! Builds a value tree straight from `serde_json`'s event stream.
//!
//! No intermediate `serde_json::Value` is built: members keep document order
//! and duplicate names survive, as they would with any incremental builder.

use core::cell::Cell;
use core::fmt;

use jsonfx_alloc::{AllocError, PoolAllocator};
use jsonfx_value::Value;
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess};

/// Seed and visitor in one: every node is built in `pool`.
///
/// A pool that refuses to grow a node stops the parse. The refusal is kept
/// in `failure`, since serde only carries a message back to the caller.
pub(crate) struct TreeBuilder<'p, 'f, A: PoolAllocator> {
    pool: &'p A,
    failure: &'f Cell<Option<AllocError>>,
}

impl<'p, 'f, A: PoolAllocator> TreeBuilder<'p, 'f, A> {
    pub(crate) fn new(pool: &'p A, failure: &'f Cell<Option<AllocError>>) -> Self {
        Self { pool, failure }
    }

    fn refused<E: de::Error>(self, err: AllocError) -> E {
        self.failure.set(Some(err));
        E::custom(err)
    }
}

impl<A: PoolAllocator> Clone for TreeBuilder<'_, '_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A: PoolAllocator> Copy for TreeBuilder<'_, '_, A> {}

impl<'de, 'p, A: PoolAllocator> DeserializeSeed<'de> for TreeBuilder<'p, '_, A> {
    type Value = Value<'p, A>;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}

/// Integers take the narrowest representation that holds them, signed first.
fn integer<'p, A: PoolAllocator>(v: i128) -> Value<'p, A> {
    if let Ok(v) = i32::try_from(v) {
        Value::from_i32(v)
    } else if let Ok(v) = u32::try_from(v) {
        Value::from_u32(v)
    } else if let Ok(v) = i64::try_from(v) {
        Value::from_i64(v)
    } else if let Ok(v) = u64::try_from(v) {
        Value::from_u64(v)
    } else {
        Value::from_f64(v as f64)
    }
}

impl<'de, 'p, A: PoolAllocator> de::Visitor<'de> for TreeBuilder<'p, '_, A> {
    type Value = Value<'p, A>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Value::null())
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Value::null())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Value::from_bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(integer(i128::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(integer(i128::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Value::from_f64(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Value::try_string_in(v, self.pool).map_err(|err| self.refused(err))
    }

    fn visit_seq<S: SeqAccess<'de>>(self, mut seq: S) -> Result<Self::Value, S::Error> {
        let mut array = Value::new_array();
        array
            .try_set_array_with_capacity(seq.size_hint().unwrap_or(0), self.pool)
            .map_err(|err| self.refused::<S::Error>(err))?;
        while let Some(item) = seq.next_element_seed(self)? {
            array
                .try_push_back(item, self.pool)
                .map_err(|err| self.refused::<S::Error>(err))?;
        }
        Ok(array)
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        let mut object = Value::new_object();
        object
            .try_set_object_with_capacity(map.size_hint().unwrap_or(0), self.pool)
            .map_err(|err| self.refused::<M::Error>(err))?;
        while let Some((name, value)) = map.next_entry_seed(self, self)? {
            object
                .try_add_member(name, value, self.pool)
                .map_err(|err| self.refused::<M::Error>(err))?;
        }
        Ok(object)
    }
}
