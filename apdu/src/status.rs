// Copyright (c) 2023-2024 The Ledger MW Project

//! Wire-level status words
//!
//! Every command terminates with exactly one status word; failures carry no
//! other observable signal (a failed handler appends nothing to the response).

use num_enum::TryFromPrimitive;

/// Status words returned to the host with each response
#[derive(Copy, Clone, Debug, PartialEq, TryFromPrimitive)]
#[repr(u16)]
pub enum Status {
    /// Command completed
    Success = 0x9000,

    /// Response would exceed buffer capacity
    WrongLength = 0x6700,

    /// Unrecognized APDU class
    UnknownClass = 0xB100,

    /// Unrecognized instruction
    UnknownInstruction = 0xB101,

    /// Device locked, operation requires unlock
    DeviceLocked = 0xB102,

    /// Framing-level corruption in the request
    MalformedRequest = 0xB103,

    /// Holder declined the operation
    UserRejected = 0xB104,

    /// Unexpected internal fault
    InternalError = 0xB105,

    /// Semantic validation failure
    ///
    /// Deliberately covers _every_ validation rule so an untrusted host
    /// cannot distinguish which check failed.
    InvalidParameters = 0xD100,

    /// Operation not valid given the prior command sequence
    InvalidState = 0xD101,
}

impl Status {
    /// Encode the status word for the wire (appended after response data)
    pub fn to_bytes(self) -> [u8; 2] {
        (self as u16).to_be_bytes()
    }
}
