// Copyright (c) 2023-2024 The Ledger MW Project

//! Shared response buffer
//!
//! One [`Response`] is owned by the dispatcher for the lifetime of a command
//! and lent to exactly one handler invocation. Handlers only ever _append_;
//! the buffer is never rewound and every append is preceded by an explicit
//! capacity check so a failed handler leaves the buffer untouched.

use heapless::Vec;

/// Fixed response buffer capacity in bytes
pub const RESPONSE_CAPACITY: usize = 256;

bitflags::bitflags! {
    /// Transport hints attached to a response
    pub struct ResponseFlags: u8 {
        /// Reply is produced asynchronously (handler suspended on a
        /// user confirmation), the transport must poll for completion
        const ASYNCHRONOUS = 1 << 0;
    }
}

/// Check whether appending `change` bytes to a response of `current_length`
/// bytes would exceed the fixed response capacity
pub fn will_response_overflow(current_length: usize, change: usize) -> bool {
    match current_length.checked_add(change) {
        Some(n) => n > RESPONSE_CAPACITY,
        None => true,
    }
}

/// Append-only response accumulator with a length cursor and flags
pub struct Response {
    data: Vec<u8, RESPONSE_CAPACITY>,
    flags: ResponseFlags,
}

impl Response {
    /// Create a new empty response
    pub const fn new() -> Self {
        Self {
            data: Vec::new(),
            flags: ResponseFlags::empty(),
        }
    }

    /// Current response length cursor
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check for an empty response
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Check whether appending `change` bytes would overflow the buffer
    pub fn will_overflow(&self, change: usize) -> bool {
        will_response_overflow(self.data.len(), change)
    }

    /// Append bytes, advancing the length cursor
    ///
    /// Callers check [`Response::will_overflow`] first; an append that does
    /// not fit fails without writing anything.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), ()> {
        self.data.extend_from_slice(bytes)
    }

    /// Response bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Response transport flags
    pub fn flags(&self) -> ResponseFlags {
        self.flags
    }

    /// Set a transport flag
    pub fn set_flags(&mut self, flags: ResponseFlags) {
        self.flags |= flags;
    }

    /// Reset the buffer for the next command (dispatcher only)
    pub fn reset(&mut self) {
        self.data.clear();
        self.flags = ResponseFlags::empty();
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn overflow_boundaries() {
        // One under, at, and one over capacity
        assert!(!will_response_overflow(RESPONSE_CAPACITY - 1, 0));
        assert!(!will_response_overflow(RESPONSE_CAPACITY - 1, 1));
        assert!(!will_response_overflow(RESPONSE_CAPACITY, 0));
        assert!(will_response_overflow(RESPONSE_CAPACITY, 1));
        assert!(will_response_overflow(RESPONSE_CAPACITY - 1, 2));
        assert!(will_response_overflow(0, RESPONSE_CAPACITY + 1));
        assert!(!will_response_overflow(0, RESPONSE_CAPACITY));

        // Arithmetic overflow counts as buffer overflow
        assert!(will_response_overflow(usize::MAX, 1));
    }

    #[test]
    fn append_advances_cursor() {
        let mut r = Response::new();
        assert_eq!(r.len(), 0);

        assert!(!r.will_overflow(4));
        r.append(&[1, 2, 3, 4]).unwrap();
        assert_eq!(r.len(), 4);

        r.append(&[5]).unwrap();
        assert_eq!(r.as_bytes(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn full_buffer_rejects_append() {
        let mut r = Response::new();
        let chunk = [0xaa; RESPONSE_CAPACITY];
        r.append(&chunk).unwrap();

        assert!(r.will_overflow(1));
        assert!(r.append(&[0xbb]).is_err());
        assert_eq!(r.len(), RESPONSE_CAPACITY);
    }

    #[test]
    fn flags_default_empty() {
        let mut r = Response::new();
        assert_eq!(r.flags(), ResponseFlags::empty());

        r.set_flags(ResponseFlags::ASYNCHRONOUS);
        assert!(r.flags().contains(ResponseFlags::ASYNCHRONOUS));

        r.reset();
        assert_eq!(r.flags(), ResponseFlags::empty());
    }
}
