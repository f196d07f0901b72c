//! # Object Identifiers
//!
//! Identifiers are reserved on the producer thread the moment a creating
//! call is issued, long before the native resource exists.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Producer-visible name of a (possibly not yet created) native resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Wraps a raw identifier, e.g. one decoded from a script argument.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw identifier handed to scripts.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}

/// Native resource name as returned by the graphics API.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NativeHandle(u32);

impl NativeHandle {
    /// The null resource. Native calls treat it as "no object".
    pub const NULL: Self = Self(0);

    /// Wraps a raw native name.
    #[inline]
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw native name.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// True for the null resource.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Monotonic identifier source.
///
/// One allocator per relay, so independent contexts never collide. The
/// counter only ever increments; identifiers are never reused. Once the
/// 32-bit space is used up the counter stays pinned at `u32::MAX` and every
/// later reservation fails.
///
/// # Atomicity
///
/// `try_reserve` is a relaxed compare-and-swap loop: uniqueness needs no
/// ordering with the handle table because the table is populated by queued
/// work, which is itself ordered by the queue lock.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU32,
}

impl IdAllocator {
    /// First identifier handed out. Zero is never issued.
    pub const FIRST: u32 = 1;

    /// Creates a fresh allocator.
    #[must_use]
    pub const fn new() -> Self {
        Self::starting_at(Self::FIRST)
    }

    const fn starting_at(next: u32) -> Self {
        Self {
            next: AtomicU32::new(next),
        }
    }

    /// Reserves the next identifier, or `None` once the space is exhausted.
    #[inline]
    pub fn try_reserve(&self) -> Option<ObjectId> {
        self.next
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |next| next.checked_add(1))
            .ok()
            .map(ObjectId)
    }

    /// Reserves the next identifier.
    ///
    /// # Panics
    ///
    /// Panics if the 32-bit identifier space is exhausted. An exhausted
    /// allocator keeps panicking; it never wraps around.
    #[inline]
    pub fn reserve(&self) -> ObjectId {
        match self.try_reserve() {
            Some(id) => id,
            None => panic!("object identifier space exhausted"),
        }
    }

    /// Number of identifiers reserved so far.
    #[inline]
    #[must_use]
    pub fn reserved(&self) -> u32 {
        self.next.load(Ordering::Relaxed) - Self::FIRST
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
