//! Depth-first traversal of a value tree.

use jsonfx_alloc::PoolAllocator;

use crate::number::Number;
use crate::value::Value;

/// Callbacks for [`Value::accept`].
///
/// Every callback defaults to doing nothing. Returning an error stops the walk
/// and is handed back to the caller of `accept`.
pub trait Visitor {
    /// Error that stops the walk.
    type Error;

    /// A null value.
    fn visit_null(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// A boolean.
    fn visit_bool(&mut self, _v: bool) -> Result<(), Self::Error> {
        Ok(())
    }

    /// A number, in the representation it was stored with.
    fn visit_number(&mut self, _n: Number) -> Result<(), Self::Error> {
        Ok(())
    }

    /// A string value. Member names go to [`Visitor::visit_key`] instead.
    fn visit_string(&mut self, _s: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    /// An array with `len` elements is about to be walked.
    fn start_array(&mut self, _len: usize) -> Result<(), Self::Error> {
        Ok(())
    }

    /// The last element of the current array was walked.
    fn end_array(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// An object with `len` members is about to be walked.
    fn start_object(&mut self, _len: usize) -> Result<(), Self::Error> {
        Ok(())
    }

    /// The name of the member whose value is walked next.
    fn visit_key(&mut self, _name: &str) -> Result<(), Self::Error> {
        Ok(())
    }

    /// The last member of the current object was walked.
    fn end_object(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl<A: PoolAllocator> Value<'_, A> {
    /// Walks this value depth-first, elements and members in storage order.
    pub fn accept<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<(), V::Error> {
        if let Some(items) = self.as_array() {
            visitor.start_array(items.len())?;
            for item in items {
                item.accept(visitor)?;
            }
            return visitor.end_array();
        }
        if let Some(members) = self.as_object() {
            visitor.start_object(members.len())?;
            for member in members {
                visitor.visit_key(member.name_str())?;
                member.value().accept(visitor)?;
            }
            return visitor.end_object();
        }
        if let Some(s) = self.as_str() {
            return visitor.visit_string(s);
        }
        if let Some(n) = self.as_number() {
            return visitor.visit_number(n);
        }
        match self.as_bool() {
            Some(v) => visitor.visit_bool(v),
            None => visitor.visit_null(),
        }
    }
}
