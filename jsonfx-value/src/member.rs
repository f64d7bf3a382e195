//! Object members, member iterators and lookup by name.

use core::cmp::Ordering;
use core::fmt::{self, Debug, Formatter};
use core::iter::FusedIterator;
use core::mem;
use core::ops::{Index, IndexMut};

use jsonfx_alloc::{DefaultPool, PoolAllocator};

use crate::string::str_equal;
use crate::value::Value;

/// A name/value pair stored inside an object.
///
/// The name is always a string value.
pub struct Member<'a, A: PoolAllocator = DefaultPool> {
    name: Value<'a, A>,
    value: Value<'a, A>,
}

impl<'a, A: PoolAllocator> Member<'a, A> {
    pub(crate) fn new(name: Value<'a, A>, value: Value<'a, A>) -> Self {
        debug_assert!(name.is_string());
        Self { name, value }
    }

    /// The name, as a string value.
    #[must_use]
    pub fn name(&self) -> &Value<'a, A> {
        &self.name
    }

    /// The name's text.
    #[must_use]
    pub fn name_str(&self) -> &str {
        self.name.get_string()
    }

    /// The value.
    #[must_use]
    pub fn value(&self) -> &Value<'a, A> {
        &self.value
    }

    /// The value, mutably. The name cannot be changed in place.
    pub fn value_mut(&mut self) -> &mut Value<'a, A> {
        &mut self.value
    }
}

impl<A: PoolAllocator> Debug for Member<'_, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {:?}", self.name, self.value)
    }
}

// === Read-only iterator ===

/// A random-access position in an object's member run.
///
/// Two iterators over the same object compare by position, so the classic
/// `begin != end` loop works, and so does ordinary `for` iteration.
pub struct MemberIter<'v, 'a, A: PoolAllocator = DefaultPool> {
    members: &'v [Member<'a, A>],
    pos: usize,
    end: usize,
}

impl<'v, 'a, A: PoolAllocator> MemberIter<'v, 'a, A> {
    pub(crate) fn at(members: &'v [Member<'a, A>], pos: usize) -> Self {
        Self {
            members,
            pos,
            end: members.len(),
        }
    }

    /// Index of the member this iterator points at.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// `true` once no member is left.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.pos >= self.end
    }

    /// The member at the current position.
    #[must_use]
    pub fn current(&self) -> Option<&'v Member<'a, A>> {
        self.get(0)
    }

    /// The member `n` places past the current position.
    #[must_use]
    pub fn get(&self, n: usize) -> Option<&'v Member<'a, A>> {
        let index = self.pos.checked_add(n)?;
        if index < self.end {
            self.members.get(index)
        } else {
            None
        }
    }

    /// An iterator moved `n` places, backwards if `n` is negative.
    ///
    /// # Panics
    ///
    /// Panics if the new position falls outside the member run.
    #[must_use]
    #[track_caller]
    pub fn offset(&self, n: isize) -> Self {
        let pos = self
            .pos
            .checked_add_signed(n)
            .filter(|&pos| pos <= self.end);
        match pos {
            Some(pos) => Self {
                members: self.members,
                pos,
                end: self.end,
            },
            None => panic!(
                "member iterator offset {n} from {} leaves 0..={}",
                self.pos, self.end
            ),
        }
    }

    /// Signed number of members between `other` and `self`.
    #[must_use]
    pub fn distance_from(&self, other: &Self) -> isize {
        debug_assert!(self.same_run(other), "iterators over different objects");
        self.pos as isize - other.pos as isize
    }

    fn same_run(&self, other: &Self) -> bool {
        core::ptr::eq(self.members.as_ptr(), other.members.as_ptr())
    }
}

impl<A: PoolAllocator> Clone for MemberIter<'_, '_, A> {
    fn clone(&self) -> Self {
        Self {
            members: self.members,
            pos: self.pos,
            end: self.end,
        }
    }
}

impl<'v, 'a, A: PoolAllocator> Iterator for MemberIter<'v, 'a, A> {
    type Item = &'v Member<'a, A>;

    fn next(&mut self) -> Option<Self::Item> {
        let member = self.current()?;
        self.pos += 1;
        Some(member)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end.saturating_sub(self.pos);
        (len, Some(len))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.pos = self.pos.saturating_add(n).min(self.end);
        self.next()
    }
}

impl<A: PoolAllocator> DoubleEndedIterator for MemberIter<'_, '_, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.is_end() {
            return None;
        }
        self.end -= 1;
        self.members.get(self.end)
    }
}

impl<A: PoolAllocator> ExactSizeIterator for MemberIter<'_, '_, A> {}

impl<A: PoolAllocator> FusedIterator for MemberIter<'_, '_, A> {}

impl<A: PoolAllocator> PartialEq for MemberIter<'_, '_, A> {
    fn eq(&self, other: &Self) -> bool {
        self.same_run(other) && self.pos == other.pos
    }
}

impl<A: PoolAllocator> PartialOrd for MemberIter<'_, '_, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.same_run(other) {
            Some(self.pos.cmp(&other.pos))
        } else {
            None
        }
    }
}

impl<A: PoolAllocator> Debug for MemberIter<'_, '_, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberIter")
            .field("pos", &self.pos)
            .field("end", &self.end)
            .finish()
    }
}

// === Mutable iterator ===

/// A forward position in an object's member run that hands out mutable
/// members.
///
/// It only ever reaches members it has not yielded yet, so it cannot move
/// backwards. Converting it into a [`MemberIter`] keeps those remaining
/// members; positions of the converted iterator count from the first of them.
pub struct MemberIterMut<'v, 'a, A: PoolAllocator = DefaultPool> {
    rest: &'v mut [Member<'a, A>],
    pos: usize,
}

impl<'v, 'a, A: PoolAllocator> MemberIterMut<'v, 'a, A> {
    pub(crate) fn at(members: &'v mut [Member<'a, A>], pos: usize) -> Self {
        let rest = match members.get_mut(pos..) {
            Some(rest) => rest,
            None => &mut [],
        };
        Self { rest, pos }
    }

    /// Index of the member this iterator points at.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// `true` once no member is left.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.rest.is_empty()
    }

    /// The member `n` places past the current position.
    #[must_use]
    pub fn get(&self, n: usize) -> Option<&Member<'a, A>> {
        self.rest.get(n)
    }

    /// The member `n` places past the current position, mutably.
    pub fn get_mut(&mut self, n: usize) -> Option<&mut Member<'a, A>> {
        self.rest.get_mut(n)
    }
}

impl<'v, 'a, A: PoolAllocator> Iterator for MemberIterMut<'v, 'a, A> {
    type Item = &'v mut Member<'a, A>;

    fn next(&mut self) -> Option<Self::Item> {
        let (first, rest) = mem::take(&mut self.rest).split_first_mut()?;
        self.rest = rest;
        self.pos += 1;
        Some(first)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.rest.len(), Some(self.rest.len()))
    }
}

impl<A: PoolAllocator> DoubleEndedIterator for MemberIterMut<'_, '_, A> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let (last, rest) = mem::take(&mut self.rest).split_last_mut()?;
        self.rest = rest;
        Some(last)
    }
}

impl<A: PoolAllocator> ExactSizeIterator for MemberIterMut<'_, '_, A> {}

impl<A: PoolAllocator> FusedIterator for MemberIterMut<'_, '_, A> {}

impl<'v, 'a, A: PoolAllocator> From<MemberIterMut<'v, 'a, A>> for MemberIter<'v, 'a, A> {
    fn from(iter: MemberIterMut<'v, 'a, A>) -> Self {
        MemberIter::at(iter.rest, 0)
    }
}

impl<A: PoolAllocator> Debug for MemberIterMut<'_, '_, A> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberIterMut")
            .field("pos", &self.pos)
            .field("remaining", &self.rest.len())
            .finish()
    }
}

// === Lookup ===

fn position_of<A: PoolAllocator>(members: &[Member<'_, A>], name: &str) -> Option<usize> {
    members
        .iter()
        .position(|member| str_equal(member.name_str(), name))
}

impl<'a, A: PoolAllocator> Value<'a, A> {
    /// Number of members.
    ///
    /// # Panics
    ///
    /// Panics if this value is not an object.
    #[must_use]
    #[track_caller]
    pub fn member_count(&self) -> usize {
        self.members().len()
    }

    /// An iterator at the first member.
    ///
    /// # Panics
    ///
    /// Panics if this value is not an object.
    #[track_caller]
    pub fn get_member_begin(&self) -> MemberIter<'_, 'a, A> {
        MemberIter::at(self.members(), 0)
    }

    /// The end iterator, one past the last member.
    ///
    /// # Panics
    ///
    /// Panics if this value is not an object.
    #[track_caller]
    pub fn get_member_end(&self) -> MemberIter<'_, 'a, A> {
        let members = self.members();
        MemberIter::at(members, members.len())
    }

    /// A mutable iterator at the first member.
    ///
    /// # Panics
    ///
    /// Panics if this value is not an object.
    #[track_caller]
    pub fn get_member_begin_mut(&mut self) -> MemberIterMut<'_, 'a, A> {
        MemberIterMut::at(self.members_mut(), 0)
    }

    /// An iterator at the first member named `name`, or the end iterator.
    ///
    /// Members are scanned in storage order, so with duplicate names the
    /// earliest one wins.
    ///
    /// # Panics
    ///
    /// Panics if this value is not an object.
    #[track_caller]
    pub fn find_member(&self, name: &str) -> MemberIter<'_, 'a, A> {
        let members = self.members();
        let pos = position_of(members, name).unwrap_or(members.len());
        MemberIter::at(members, pos)
    }

    /// [`Value::find_member`] with the name given as a string value.
    ///
    /// # Panics
    ///
    /// Panics if this value is not an object or `name` is not a string.
    #[track_caller]
    pub fn find_member_value<B: PoolAllocator>(&self, name: &Value<'_, B>) -> MemberIter<'_, 'a, A> {
        self.find_member(name.get_string())
    }

    /// A mutable iterator at the first member named `name`, or at the end.
    ///
    /// # Panics
    ///
    /// Panics if this value is not an object.
    #[track_caller]
    pub fn find_member_mut(&mut self, name: &str) -> MemberIterMut<'_, 'a, A> {
        let members = self.members_mut();
        let pos = position_of(members, name).unwrap_or(members.len());
        MemberIterMut::at(members, pos)
    }

    /// `true` if some member is named `name`.
    ///
    /// # Panics
    ///
    /// Panics if this value is not an object.
    #[must_use]
    #[track_caller]
    pub fn has_member(&self, name: &str) -> bool {
        !self.find_member(name).is_end()
    }

    /// The value of the first member named `name`.
    ///
    /// # Panics
    ///
    /// Panics if this value is not an object.
    #[must_use]
    #[track_caller]
    pub fn get_member(&self, name: &str) -> Option<&Value<'a, A>> {
        self.find_member(name).current().map(Member::value)
    }

    /// The value of the first member named `name`, mutably.
    ///
    /// # Panics
    ///
    /// Panics if this value is not an object.
    #[track_caller]
    pub fn get_member_mut(&mut self, name: &str) -> Option<&mut Value<'a, A>> {
        self.find_member_mut(name).next().map(Member::value_mut)
    }
}

impl<'a, A: PoolAllocator> Index<&str> for Value<'a, A> {
    type Output = Value<'a, A>;

    /// # Panics
    ///
    /// Panics if this value is not an object or has no member named `name`.
    #[track_caller]
    fn index(&self, name: &str) -> &Self::Output {
        match self.get_member(name) {
            Some(value) => value,
            None => panic!("no member named `{name}`"),
        }
    }
}

impl<A: PoolAllocator> IndexMut<&str> for Value<'_, A> {
    #[track_caller]
    fn index_mut(&mut self, name: &str) -> &mut Self::Output {
        match self.get_member_mut(name) {
            Some(value) => value,
            None => panic!("no member named `{name}`"),
        }
    }
}
