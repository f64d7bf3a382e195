//! The `Value` type: a tagged payload whose storage comes from a pool.
//!
//! # Payload variants
//!
//! | variant      | storage                                   | freed on release |
//! |--------------|-------------------------------------------|------------------|
//! | null / bool  | none                                      | -                |
//! | number       | 64-bit slot in the value                  | -                |
//! | borrowed str | `&'a str`, owned by the caller            | never            |
//! | inline str   | up to [`INLINE_CAPACITY`] bytes in value  | -                |
//! | owned str    | pool run of bytes                         | if `NEEDS_FREE`  |
//! | array        | pool run of `Value`                       | if `NEEDS_FREE`  |
//! | object       | pool run of [`Member`]                    | if `NEEDS_FREE`  |
//!
//! The lifetime `'a` is the borrow of the pool (and of any borrowed string).
//! Every setter that needs storage takes `&'a A`, so a value can never
//! outlive the pool it was built in.

use core::fmt::{self, Debug, Formatter};
use core::marker::PhantomData;
use core::mem;
use core::ops::{Index, IndexMut};

use jsonfx_alloc::{AllocError, DefaultPool, PoolAllocator, handle_alloc_failure};

use crate::kind::{TypeFlags, ValueType};
use crate::member::Member;
use crate::number::Number;
use crate::seq::RawSeq;
use crate::string::{INLINE_CAPACITY, InlineStr, owned_as_str, str_equal, try_copy_into_pool};

pub(crate) enum Payload<'a, A: PoolAllocator> {
    Null,
    Bool(bool),
    Number(Number),
    BorrowedStr(&'a str),
    InlineStr(InlineStr),
    OwnedStr(RawSeq<u8>),
    Array(RawSeq<Value<'a, A>>),
    Object(RawSeq<Member<'a, A>>),
}

/// A null, boolean, number, string, array or object.
///
/// Values are move-only. Use [`Value::clone_in`] to deep-copy a tree into a
/// pool. Dropping a value releases its storage when the pool type frees
/// blocks individually ([`PoolAllocator::NEEDS_FREE`]); with an arena pool
/// dropping is free and the memory goes away with the pool.
///
/// ```
/// use jsonfx_alloc::ChunkedPool;
/// use jsonfx_value::Value;
///
/// let pool: ChunkedPool = ChunkedPool::new();
/// let mut doc = Value::new_object();
/// doc.add_member(Value::from("name"), Value::from("jsonfx"), &pool);
/// doc.add_member(Value::from("version"), Value::from(3), &pool);
///
/// assert!(doc.has_member("name"));
/// assert_eq!(doc["version"].get_int(), 3);
/// ```
pub struct Value<'a, A: PoolAllocator = DefaultPool> {
    payload: Payload<'a, A>,
    _pool: PhantomData<&'a A>,
}

#[cold]
#[track_caller]
fn type_mismatch(expected: &str, found: ValueType) -> ! {
    panic!("expected {expected}, found {}", found.name())
}

impl<'a, A: PoolAllocator> Value<'a, A> {
    // === Constructors ===

    /// The null value.
    #[must_use]
    pub const fn null() -> Self {
        Self {
            payload: Payload::Null,
            _pool: PhantomData,
        }
    }

    /// A boolean.
    #[must_use]
    pub const fn from_bool(v: bool) -> Self {
        Self {
            payload: Payload::Bool(v),
            _pool: PhantomData,
        }
    }

    /// A number in the given representation.
    #[must_use]
    pub const fn from_number(n: Number) -> Self {
        Self {
            payload: Payload::Number(n),
            _pool: PhantomData,
        }
    }

    /// A 32-bit signed integer.
    #[must_use]
    pub const fn from_i32(v: i32) -> Self {
        Self::from_number(Number::I32(v))
    }

    /// A 32-bit unsigned integer.
    #[must_use]
    pub const fn from_u32(v: u32) -> Self {
        Self::from_number(Number::U32(v))
    }

    /// A 64-bit signed integer.
    #[must_use]
    pub const fn from_i64(v: i64) -> Self {
        Self::from_number(Number::I64(v))
    }

    /// A 64-bit unsigned integer.
    #[must_use]
    pub const fn from_u64(v: u64) -> Self {
        Self::from_number(Number::U64(v))
    }

    /// A 32-bit float.
    #[must_use]
    pub const fn from_f32(v: f32) -> Self {
        Self::from_number(Number::F32(v))
    }

    /// A 64-bit float.
    #[must_use]
    pub const fn from_f64(v: f64) -> Self {
        Self::from_number(Number::F64(v))
    }

    /// A string that borrows `s` without copying it.
    #[must_use]
    pub const fn from_str_raw(s: &'a str) -> Self {
        Self {
            payload: Payload::BorrowedStr(s),
            _pool: PhantomData,
        }
    }

    /// A string holding a copy of `s`: inline if it fits, otherwise in `pool`.
    #[must_use]
    #[track_caller]
    pub fn string_in(s: &str, pool: &'a A) -> Self {
        Self::try_string_in(s, pool).unwrap_or_else(|err| handle_alloc_failure(err))
    }

    /// Fallible counterpart of [`Value::string_in`].
    pub fn try_string_in(s: &str, pool: &'a A) -> Result<Self, AllocError> {
        let mut value = Self::null();
        value.try_set_string(s, pool)?;
        Ok(value)
    }

    /// An empty array. No storage is allocated until the first push.
    #[must_use]
    pub const fn new_array() -> Self {
        Self {
            payload: Payload::Array(RawSeq::new()),
            _pool: PhantomData,
        }
    }

    /// An empty object. No storage is allocated until the first member.
    #[must_use]
    pub const fn new_object() -> Self {
        Self {
            payload: Payload::Object(RawSeq::new()),
            _pool: PhantomData,
        }
    }

    // === Type inspection ===

    /// The discriminant, without capability flags.
    #[must_use]
    pub fn get_type(&self) -> ValueType {
        match &self.payload {
            Payload::Null => ValueType::Null,
            Payload::Bool(true) => ValueType::True,
            Payload::Bool(false) => ValueType::False,
            Payload::Number(_) => ValueType::Number,
            Payload::BorrowedStr(_) | Payload::InlineStr(_) | Payload::OwnedStr(_) => {
                ValueType::String
            }
            Payload::Array(_) => ValueType::Array,
            Payload::Object(_) => ValueType::Object,
        }
    }

    /// The capability flags of the current payload.
    #[must_use]
    pub fn type_flags(&self) -> TypeFlags {
        match &self.payload {
            Payload::Null | Payload::Array(_) | Payload::Object(_) => TypeFlags::empty(),
            Payload::Bool(_) => TypeFlags::BOOL,
            Payload::Number(n) => n.flags(),
            Payload::BorrowedStr(_) => TypeFlags::STRING,
            Payload::OwnedStr(_) => TypeFlags::STRING | TypeFlags::OWNED_STR,
            Payload::InlineStr(_) => {
                TypeFlags::STRING | TypeFlags::OWNED_STR | TypeFlags::INLINE_STR
            }
        }
    }

    /// Discriminant in the low byte, capability flags above it.
    ///
    /// Only meant for diagnostics; the layout of a value does not depend on it.
    #[must_use]
    pub fn raw_tag(&self) -> u32 {
        self.get_type() as u32 | self.type_flags().bits()
    }

    /// Returns `true` for null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self.payload, Payload::Null)
    }

    /// Returns `true` for `true` and `false`.
    #[must_use]
    pub fn is_bool(&self) -> bool {
        self.type_flags().contains(TypeFlags::BOOL)
    }

    /// Returns `true` for `true`.
    #[must_use]
    pub fn is_true(&self) -> bool {
        self.get_type() == ValueType::True
    }

    /// Returns `true` for `false`.
    #[must_use]
    pub fn is_false(&self) -> bool {
        self.get_type() == ValueType::False
    }

    /// Returns `true` for objects.
    #[must_use]
    pub fn is_object(&self) -> bool {
        self.get_type() == ValueType::Object
    }

    /// Returns `true` for arrays.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.get_type() == ValueType::Array
    }

    /// Returns `true` for numbers of any representation.
    #[must_use]
    pub fn is_number(&self) -> bool {
        self.type_flags().contains(TypeFlags::NUMBER)
    }

    /// Returns `true` for numbers of any integer representation.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.type_flags().contains(TypeFlags::INTEGER)
    }

    /// Returns `true` for numbers stored as `i32`.
    #[must_use]
    pub fn is_int(&self) -> bool {
        self.type_flags().contains(TypeFlags::INT32)
    }

    /// Returns `true` for numbers stored as `u32`.
    #[must_use]
    pub fn is_uint(&self) -> bool {
        self.type_flags().contains(TypeFlags::UINT32)
    }

    /// Returns `true` for numbers stored as `i64`.
    #[must_use]
    pub fn is_int64(&self) -> bool {
        self.type_flags().contains(TypeFlags::INT64)
    }

    /// Returns `true` for numbers stored as `u64`.
    #[must_use]
    pub fn is_uint64(&self) -> bool {
        self.type_flags().contains(TypeFlags::UINT64)
    }

    /// Returns `true` for numbers stored as `f32`.
    #[must_use]
    pub fn is_float(&self) -> bool {
        self.type_flags().contains(TypeFlags::FLOAT)
    }

    /// Returns `true` for numbers stored as `f64`.
    #[must_use]
    pub fn is_double(&self) -> bool {
        self.type_flags().contains(TypeFlags::DOUBLE)
    }

    /// Returns `true` for strings of any storage kind.
    #[must_use]
    pub fn is_string(&self) -> bool {
        self.type_flags().contains(TypeFlags::STRING)
    }

    /// Returns `true` for strings that borrow their bytes.
    #[must_use]
    pub fn is_borrowed_string(&self) -> bool {
        self.type_flags() == TypeFlags::STRING
    }

    /// Returns `true` for strings whose bytes live inside the value.
    #[must_use]
    pub fn is_inline_string(&self) -> bool {
        self.type_flags().contains(TypeFlags::INLINE_STR)
    }

    /// Returns `true` for strings whose bytes were copied into the pool.
    #[must_use]
    pub fn is_owned_string(&self) -> bool {
        self.type_flags() == TypeFlags::STRING | TypeFlags::OWNED_STR
    }

    // === Setters ===

    /// Releases the current payload, leaving null behind.
    ///
    /// Storage is handed back only when the pool type frees blocks
    /// individually; otherwise this just forgets it.
    pub fn release(&mut self) {
        let payload = mem::replace(&mut self.payload, Payload::Null);
        if A::NEEDS_FREE {
            match payload {
                Payload::Array(mut items) => unsafe { items.release::<A>() },
                Payload::Object(mut members) => unsafe { members.release::<A>() },
                Payload::OwnedStr(mut bytes) => unsafe { bytes.release::<A>() },
                Payload::Null
                | Payload::Bool(_)
                | Payload::Number(_)
                | Payload::BorrowedStr(_)
                | Payload::InlineStr(_) => {}
            }
        }
    }

    fn replace(&mut self, payload: Payload<'a, A>) -> &mut Self {
        self.release();
        self.payload = payload;
        self
    }

    /// Makes this value null.
    pub fn set_null(&mut self) -> &mut Self {
        self.replace(Payload::Null)
    }

    /// Makes this value a boolean.
    pub fn set_bool(&mut self, v: bool) -> &mut Self {
        self.replace(Payload::Bool(v))
    }

    /// Makes this value a number in the given representation.
    pub fn set_number(&mut self, n: Number) -> &mut Self {
        self.replace(Payload::Number(n))
    }

    /// Makes this value an `i32` number.
    pub fn set_int(&mut self, v: i32) -> &mut Self {
        self.set_number(Number::I32(v))
    }

    /// Makes this value a `u32` number.
    pub fn set_uint(&mut self, v: u32) -> &mut Self {
        self.set_number(Number::U32(v))
    }

    /// Makes this value an `i64` number.
    pub fn set_int64(&mut self, v: i64) -> &mut Self {
        self.set_number(Number::I64(v))
    }

    /// Makes this value a `u64` number.
    pub fn set_uint64(&mut self, v: u64) -> &mut Self {
        self.set_number(Number::U64(v))
    }

    /// Makes this value an `f32` number.
    pub fn set_float(&mut self, v: f32) -> &mut Self {
        self.set_number(Number::F32(v))
    }

    /// Makes this value an `f64` number.
    pub fn set_double(&mut self, v: f64) -> &mut Self {
        self.set_number(Number::F64(v))
    }

    /// Makes this value a string borrowing `s`.
    pub fn set_string_raw(&mut self, s: &'a str) -> &mut Self {
        self.replace(Payload::BorrowedStr(s))
    }

    /// Makes this value a string holding a copy of `s`.
    ///
    /// Up to [`INLINE_CAPACITY`] bytes are stored in the value itself; longer
    /// strings are copied into `pool`.
    #[track_caller]
    pub fn set_string(&mut self, s: &str, pool: &'a A) -> &mut Self {
        match self.try_set_string(s, pool) {
            Ok(this) => this,
            Err(err) => handle_alloc_failure(err),
        }
    }

    /// Fallible counterpart of [`Value::set_string`]. On error the value is
    /// unchanged.
    pub fn try_set_string(&mut self, s: &str, pool: &'a A) -> Result<&mut Self, AllocError> {
        let payload = match InlineStr::new(s) {
            Some(inline) => Payload::InlineStr(inline),
            None => Payload::OwnedStr(try_copy_into_pool(s, pool)?),
        };
        Ok(self.replace(payload))
    }

    /// Makes this value an empty array.
    pub fn set_array(&mut self) -> &mut Self {
        self.replace(Payload::Array(RawSeq::new()))
    }

    /// Makes this value an empty array with room for `capacity` elements.
    #[track_caller]
    pub fn set_array_with_capacity(&mut self, capacity: usize, pool: &'a A) -> &mut Self {
        self.replace(Payload::Array(RawSeq::with_capacity(capacity, pool)))
    }

    /// Fallible counterpart of [`Value::set_array_with_capacity`]. On error
    /// the value is unchanged.
    pub fn try_set_array_with_capacity(
        &mut self,
        capacity: usize,
        pool: &'a A,
    ) -> Result<&mut Self, AllocError> {
        let items = RawSeq::try_with_capacity(capacity, pool)?;
        Ok(self.replace(Payload::Array(items)))
    }

    /// Makes this value an empty object.
    pub fn set_object(&mut self) -> &mut Self {
        self.replace(Payload::Object(RawSeq::new()))
    }

    /// Makes this value an empty object with room for `capacity` members.
    #[track_caller]
    pub fn set_object_with_capacity(&mut self, capacity: usize, pool: &'a A) -> &mut Self {
        self.replace(Payload::Object(RawSeq::with_capacity(capacity, pool)))
    }

    /// Fallible counterpart of [`Value::set_object_with_capacity`]. On error
    /// the value is unchanged.
    pub fn try_set_object_with_capacity(
        &mut self,
        capacity: usize,
        pool: &'a A,
    ) -> Result<&mut Self, AllocError> {
        let members = RawSeq::try_with_capacity(capacity, pool)?;
        Ok(self.replace(Payload::Object(members)))
    }

    /// Appends an element to an array.
    ///
    /// # Panics
    ///
    /// Panics if this value is not an array, or if the pool refuses to grow
    /// it (see [`PoolAllocator::allocate`]).
    #[track_caller]
    pub fn push_back(&mut self, value: Value<'a, A>, pool: &'a A) -> &mut Self {
        match self.try_push_back(value, pool) {
            Ok(this) => this,
            Err(err) => handle_alloc_failure(err),
        }
    }

    /// Appends an element to an array, reporting a pool that cannot grow it.
    ///
    /// On error `value` is dropped and the array is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if this value is not an array.
    #[track_caller]
    pub fn try_push_back(&mut self, value: Value<'a, A>, pool: &'a A) -> Result<&mut Self, AllocError> {
        let found = self.get_type();
        match &mut self.payload {
            Payload::Array(items) => items.try_push(value, pool)?,
            _ => type_mismatch("array", found),
        }
        Ok(self)
    }

    /// Appends a member to an object. Names are not deduplicated.
    ///
    /// # Panics
    ///
    /// Panics if this value is not an object, if `name` is not a string, or
    /// if the pool refuses to grow the object.
    #[track_caller]
    pub fn add_member(&mut self, name: Value<'a, A>, value: Value<'a, A>, pool: &'a A) -> &mut Self {
        match self.try_add_member(name, value, pool) {
            Ok(this) => this,
            Err(err) => handle_alloc_failure(err),
        }
    }

    /// Appends a member to an object, reporting a pool that cannot grow it.
    ///
    /// On error the member is dropped and the object is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if this value is not an object or `name` is not a string.
    #[track_caller]
    pub fn try_add_member(
        &mut self,
        name: Value<'a, A>,
        value: Value<'a, A>,
        pool: &'a A,
    ) -> Result<&mut Self, AllocError> {
        assert!(
            name.is_string(),
            "member name must be a string, found {}",
            name.get_type().name()
        );
        let found = self.get_type();
        match &mut self.payload {
            Payload::Object(members) => members.try_push(Member::new(name, value), pool)?,
            _ => type_mismatch("object", found),
        }
        Ok(self)
    }

    /// Deep-copies this value into `pool`.
    ///
    /// Borrowed strings stay borrowed; copied strings are copied again.
    #[must_use]
    #[track_caller]
    pub fn clone_in(&self, pool: &'a A) -> Value<'a, A> {
        self.try_clone_in(pool).unwrap_or_else(|err| handle_alloc_failure(err))
    }

    /// Fallible counterpart of [`Value::clone_in`].
    pub fn try_clone_in(&self, pool: &'a A) -> Result<Value<'a, A>, AllocError> {
        let payload = match &self.payload {
            Payload::Null => Payload::Null,
            Payload::Bool(v) => Payload::Bool(*v),
            Payload::Number(n) => Payload::Number(*n),
            Payload::BorrowedStr(s) => Payload::BorrowedStr(*s),
            Payload::InlineStr(s) => Payload::InlineStr(*s),
            Payload::OwnedStr(bytes) => {
                Payload::OwnedStr(try_copy_into_pool(owned_as_str(bytes), pool)?)
            }
            Payload::Array(items) => {
                let mut copy = Value::new_array();
                copy.try_set_array_with_capacity(items.len(), pool)?;
                for item in items.as_slice() {
                    copy.try_push_back(item.try_clone_in(pool)?, pool)?;
                }
                return Ok(copy);
            }
            Payload::Object(members) => {
                let mut copy = Value::new_object();
                copy.try_set_object_with_capacity(members.len(), pool)?;
                for member in members.as_slice() {
                    copy.try_add_member(
                        member.name().try_clone_in(pool)?,
                        member.value().try_clone_in(pool)?,
                        pool,
                    )?;
                }
                return Ok(copy);
            }
        };
        Ok(Value {
            payload,
            _pool: PhantomData,
        })
    }

    // === Accessors ===

    /// The boolean.
    ///
    /// # Panics
    ///
    /// Panics if this value is not a boolean.
    #[must_use]
    #[track_caller]
    pub fn get_bool(&self) -> bool {
        self.as_bool()
            .unwrap_or_else(|| type_mismatch("bool", self.get_type()))
    }

    /// The number, whatever its representation.
    ///
    /// # Panics
    ///
    /// Panics if this value is not a number.
    #[must_use]
    #[track_caller]
    pub fn get_number(&self) -> Number {
        self.as_number()
            .unwrap_or_else(|| type_mismatch("number", self.get_type()))
    }

    /// The `i32`.
    ///
    /// # Panics
    ///
    /// Panics unless [`Value::is_int`].
    #[must_use]
    #[track_caller]
    pub fn get_int(&self) -> i32 {
        self.as_int()
            .unwrap_or_else(|| type_mismatch("int", self.get_type()))
    }

    /// The `u32`.
    ///
    /// # Panics
    ///
    /// Panics unless [`Value::is_uint`].
    #[must_use]
    #[track_caller]
    pub fn get_uint(&self) -> u32 {
        self.as_uint()
            .unwrap_or_else(|| type_mismatch("uint", self.get_type()))
    }

    /// The `i64`.
    ///
    /// # Panics
    ///
    /// Panics unless [`Value::is_int64`].
    #[must_use]
    #[track_caller]
    pub fn get_int64(&self) -> i64 {
        self.as_int64()
            .unwrap_or_else(|| type_mismatch("int64", self.get_type()))
    }

    /// The `u64`.
    ///
    /// # Panics
    ///
    /// Panics unless [`Value::is_uint64`].
    #[must_use]
    #[track_caller]
    pub fn get_uint64(&self) -> u64 {
        self.as_uint64()
            .unwrap_or_else(|| type_mismatch("uint64", self.get_type()))
    }

    /// The `f32`.
    ///
    /// # Panics
    ///
    /// Panics unless [`Value::is_float`].
    #[must_use]
    #[track_caller]
    pub fn get_float(&self) -> f32 {
        self.as_float()
            .unwrap_or_else(|| type_mismatch("float", self.get_type()))
    }

    /// The `f64`.
    ///
    /// # Panics
    ///
    /// Panics unless [`Value::is_double`].
    #[must_use]
    #[track_caller]
    pub fn get_double(&self) -> f64 {
        self.as_double()
            .unwrap_or_else(|| type_mismatch("double", self.get_type()))
    }

    /// The string contents.
    ///
    /// # Panics
    ///
    /// Panics if this value is not a string.
    #[must_use]
    #[track_caller]
    pub fn get_string(&self) -> &str {
        self.as_str()
            .unwrap_or_else(|| type_mismatch("string", self.get_type()))
    }

    /// The string length in bytes.
    ///
    /// # Panics
    ///
    /// Panics if this value is not a string.
    #[must_use]
    #[track_caller]
    pub fn get_string_length(&self) -> usize {
        self.get_string().len()
    }

    /// The boolean, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.payload {
            Payload::Bool(v) => Some(v),
            _ => None,
        }
    }

    /// The number, if this is one.
    #[must_use]
    pub fn as_number(&self) -> Option<Number> {
        match self.payload {
            Payload::Number(n) => Some(n),
            _ => None,
        }
    }

    /// The `i32`, if stored as one.
    #[must_use]
    pub fn as_int(&self) -> Option<i32> {
        match self.payload {
            Payload::Number(Number::I32(v)) => Some(v),
            _ => None,
        }
    }

    /// The `u32`, if stored as one.
    #[must_use]
    pub fn as_uint(&self) -> Option<u32> {
        match self.payload {
            Payload::Number(Number::U32(v)) => Some(v),
            _ => None,
        }
    }

    /// The `i64`, if stored as one.
    #[must_use]
    pub fn as_int64(&self) -> Option<i64> {
        match self.payload {
            Payload::Number(Number::I64(v)) => Some(v),
            _ => None,
        }
    }

    /// The `u64`, if stored as one.
    #[must_use]
    pub fn as_uint64(&self) -> Option<u64> {
        match self.payload {
            Payload::Number(Number::U64(v)) => Some(v),
            _ => None,
        }
    }

    /// The `f32`, if stored as one.
    #[must_use]
    pub fn as_float(&self) -> Option<f32> {
        match self.payload {
            Payload::Number(Number::F32(v)) => Some(v),
            _ => None,
        }
    }

    /// The `f64`, if stored as one.
    #[must_use]
    pub fn as_double(&self) -> Option<f64> {
        match self.payload {
            Payload::Number(Number::F64(v)) => Some(v),
            _ => None,
        }
    }

    /// The string contents, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match &self.payload {
            Payload::BorrowedStr(s) => Some(s),
            Payload::InlineStr(s) => Some(s.as_str()),
            Payload::OwnedStr(bytes) => Some(owned_as_str(bytes)),
            _ => None,
        }
    }

    /// The elements, if this is an array.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value<'a, A>]> {
        match &self.payload {
            Payload::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// The elements, mutably, if this is an array.
    pub fn as_array_mut(&mut self) -> Option<&mut [Value<'a, A>]> {
        match &mut self.payload {
            Payload::Array(items) => Some(items.as_mut_slice()),
            _ => None,
        }
    }

    /// The members in storage order, if this is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&[Member<'a, A>]> {
        match &self.payload {
            Payload::Object(members) => Some(members.as_slice()),
            _ => None,
        }
    }

    /// The members, mutably, if this is an object.
    pub fn as_object_mut(&mut self) -> Option<&mut [Member<'a, A>]> {
        match &mut self.payload {
            Payload::Object(members) => Some(members.as_mut_slice()),
            _ => None,
        }
    }

    /// The array elements.
    ///
    /// # Panics
    ///
    /// Panics if this value is not an array.
    #[must_use]
    #[track_caller]
    pub fn as_slice(&self) -> &[Value<'a, A>] {
        self.as_array()
            .unwrap_or_else(|| type_mismatch("array", self.get_type()))
    }

    /// The array elements, mutably.
    ///
    /// # Panics
    ///
    /// Panics if this value is not an array.
    #[track_caller]
    pub fn as_mut_slice(&mut self) -> &mut [Value<'a, A>] {
        let found = self.get_type();
        self.as_array_mut()
            .unwrap_or_else(|| type_mismatch("array", found))
    }

    /// Number of array elements.
    ///
    /// # Panics
    ///
    /// Panics if this value is not an array.
    #[must_use]
    #[track_caller]
    pub fn size(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns `true` for an array or object without entries, or an empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.payload {
            Payload::Array(items) => items.len() == 0,
            Payload::Object(members) => members.len() == 0,
            _ => self.as_str().is_some_and(str::is_empty),
        }
    }

    /// Reserved slots of an array or object.
    ///
    /// # Panics
    ///
    /// Panics if this value is neither an array nor an object.
    #[must_use]
    #[track_caller]
    pub fn capacity(&self) -> usize {
        match &self.payload {
            Payload::Array(items) => items.capacity(),
            Payload::Object(members) => members.capacity(),
            _ => type_mismatch("array or object", self.get_type()),
        }
    }

    /// `true` if both strings compare equal.
    ///
    /// Lengths are compared first, then the data pointers, then the bytes.
    ///
    /// # Panics
    ///
    /// Panics if either value is not a string.
    #[must_use]
    #[track_caller]
    pub fn string_equal<B: PoolAllocator>(&self, other: &Value<'_, B>) -> bool {
        str_equal(self.get_string(), other.get_string())
    }

    // === Crate-internal ===

    #[track_caller]
    pub(crate) fn members(&self) -> &[Member<'a, A>] {
        self.as_object()
            .unwrap_or_else(|| type_mismatch("object", self.get_type()))
    }

    #[track_caller]
    pub(crate) fn members_mut(&mut self) -> &mut [Member<'a, A>] {
        let found = self.get_type();
        self.as_object_mut()
            .unwrap_or_else(|| type_mismatch("object", found))
    }
}

impl<A: PoolAllocator> Drop for Value<'_, A> {
    fn drop(&mut self) {
        if A::NEEDS_FREE {
            self.release();
        }
    }
}

impl<A: PoolAllocator> Default for Value<'_, A> {
    fn default() -> Self {
        Self::null()
    }
}

// === Conversions ===

impl<A: PoolAllocator> From<bool> for Value<'_, A> {
    fn from(v: bool) -> Self {
        Self::from_bool(v)
    }
}

impl<A: PoolAllocator> From<Number> for Value<'_, A> {
    fn from(n: Number) -> Self {
        Self::from_number(n)
    }
}

macro_rules! impl_from_number {
    ($($ty:ty => $ctor:ident),* $(,)?) => {
        $(
            impl<A: PoolAllocator> From<$ty> for Value<'_, A> {
                fn from(v: $ty) -> Self {
                    Self::$ctor(v)
                }
            }
        )*
    };
}

impl_from_number! {
    i32 => from_i32,
    u32 => from_u32,
    i64 => from_i64,
    u64 => from_u64,
    f32 => from_f32,
    f64 => from_f64,
}

impl<'a, A: PoolAllocator> From<&'a str> for Value<'a, A> {
    fn from(s: &'a str) -> Self {
        Self::from_str_raw(s)
    }
}

impl<A: PoolAllocator> From<()> for Value<'_, A> {
    fn from((): ()) -> Self {
        Self::null()
    }
}

// === Indexing ===

impl<'a, A: PoolAllocator> Index<usize> for Value<'a, A> {
    type Output = Value<'a, A>;

    #[track_caller]
    fn index(&self, index: usize) -> &Self::Output {
        let items = self.as_slice();
        match items.get(index) {
            Some(item) => item,
            None => panic!("index {index} out of bounds for array of {}", items.len()),
        }
    }
}

impl<A: PoolAllocator> IndexMut<usize> for Value<'_, A> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        let items = self.as_mut_slice();
        let len = items.len();
        match items.get_mut(index) {
            Some(item) => item,
            None => panic!("index {index} out of bounds for array of {len}"),
        }
    }
}

// === Comparison ===

/// Structural equality: strings compare by contents whatever their storage,
/// numbers by value, arrays element-wise and objects member by member in
/// storage order.
impl<A: PoolAllocator, B: PoolAllocator> PartialEq<Value<'_, B>> for Value<'_, A> {
    fn eq(&self, other: &Value<'_, B>) -> bool {
        if let (Some(a), Some(b)) = (self.as_str(), other.as_str()) {
            return str_equal(a, b);
        }
        match (&self.payload, &other.payload) {
            (Payload::Null, Payload::Null) => true,
            (Payload::Bool(a), Payload::Bool(b)) => a == b,
            (Payload::Number(a), Payload::Number(b)) => a == b,
            (Payload::Array(a), Payload::Array(b)) => {
                a.len() == b.len()
                    && a.as_slice()
                        .iter()
                        .zip(b.as_slice())
                        .all(|(x, y)| x == y)
            }
            (Payload::Object(a), Payload::Object(b)) => {
                a.len() == b.len()
                    && a.as_slice()
                        .iter()
                        .zip(b.as_slice())
                        .all(|(x, y)| x.name() == y.name() && x.value() == y.value())
            }
            _ => false,
        }
    }
}

impl<A: PoolAllocator> PartialEq<str> for Value<'_, A> {
    fn eq(&self, other: &str) -> bool {
        self.as_str().is_some_and(|s| str_equal(s, other))
    }
}

impl<A: PoolAllocator> PartialEq<&str> for Value<'_, A> {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl<A: PoolAllocator> PartialEq<bool> for Value<'_, A> {
    fn eq(&self, other: &bool) -> bool {
        self.as_bool() == Some(*other)
    }
}

// === Formatting ===

/// Renders JSON-like text; `{:#?}` indents nested containers.
impl<A: PoolAllocator> Debug for Value<'_, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.payload {
            Payload::Null => f.write_str("null"),
            Payload::Bool(v) => write!(f, "{v}"),
            Payload::Number(n) => write!(f, "{n}"),
            Payload::BorrowedStr(s) => Debug::fmt(s, f),
            Payload::InlineStr(s) => Debug::fmt(s, f),
            Payload::OwnedStr(bytes) => Debug::fmt(owned_as_str(bytes), f),
            Payload::Array(items) => f.debug_list().entries(items.as_slice()).finish(),
            Payload::Object(members) => f
                .debug_map()
                .entries(members.as_slice().iter().map(|m| (m.name(), m.value())))
                .finish(),
        }
    }
}
