//! `jsonfx-value` provides the tagged value tree that `jsonfx` pools back.
//!
//! # Design
//!
//! A [`Value`] is a sum type over null, booleans, six number
//! representations, three kinds of string, arrays and objects. Arrays and
//! objects keep their elements in one contiguous run allocated from a pool;
//! growing the most recent run of a bump pool extends it in place.
//!
//! Strings come in three kinds:
//!
//! - *borrowed*: a `&'a str` owned by the caller, never copied or freed
//! - *inline*: up to [`INLINE_CAPACITY`] bytes stored in the value itself
//! - *owned*: a copy in pool memory
//!
//! The pool is a type parameter. Pools whose
//! [`NEEDS_FREE`](jsonfx_alloc::PoolAllocator::NEEDS_FREE) is `false` make
//! dropping a tree free of any walk.
//!
//! ```
//! use jsonfx_alloc::FastPool;
//! use jsonfx_value::Value;
//!
//! let pool: FastPool = FastPool::new();
//! let mut list = Value::new_array();
//! for i in 0..4 {
//!     list.push_back(Value::from(i), &pool);
//! }
//! assert_eq!(list.size(), 4);
//! assert_eq!(format!("{list:?}"), "[0, 1, 2, 3]");
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::std_instead_of_core)]
#![warn(clippy::std_instead_of_alloc)]

extern crate alloc;

mod kind;
pub use kind::{TYPE_MASK, TypeFlags, ValueType};

mod number;
pub use number::Number;

mod seq;

mod string;
pub use string::INLINE_CAPACITY;

mod value;
pub use value::Value;

mod member;
pub use member::{Member, MemberIter, MemberIterMut};

mod visit;
pub use visit::Visitor;
