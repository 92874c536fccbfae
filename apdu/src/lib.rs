// Copyright (c) 2023-2024 The Ledger MW Project

//! Protocol / APDU definitions for MimbleWimble (Grin) app communication
//!
//! This module provides a protocol specification and reference implementation
//! for communication with MimbleWimble hardware wallets.
//!
//! APDUs use a primitive binary encoding to simplify implementation with
//! unsupported languages and platforms. Encodings are intended to be _roughly_
//! equivalent to packed c structures; all multi-byte wire fields are
//! little-endian except where an encoding is defined externally (identifiers
//! serialize their path indices big-endian, matching wallet convention).
//!
//! Each command is a single request / response exchange: the host encodes a
//! request object into an APDU frame, the device parses this to a [`Request`]
//! view, executes the matching handler, and appends the response object to a
//! shared [`Response`] buffer.

#![no_std]

use core::fmt::Debug;

use num_enum::TryFromPrimitive;

pub mod address;
pub mod app_info;
pub mod commitment;
pub mod frame;
pub mod prelude;
pub mod proof;
pub mod response;
pub mod status;

mod helpers;

pub use frame::Request;
pub use response::{Response, ResponseFlags, RESPONSE_CAPACITY};
pub use status::Status;

/// MimbleWimble APDU Class
pub const MW_APDU_CLA: u8 = 0xc7;

/// Protocol version
pub const MW_PROTO_VERSION: u8 = 0x01;

/// MimbleWimble APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum Instruction {
    // General instructions
    GetAppInfo = 0x00,

    /// Fetch the public key for an MQS / Tor / Slatepack address
    GetAddressPublicKey = 0x10,

    /// Fetch a Pedersen commitment for a value and identifier
    GetCommitment = 0x20,

    /// Fetch a chunk of the bulletproof for a value and identifier
    GetBulletproofComponents = 0x21,

    /// Sign a payment proof message with the Tor address key
    GetTorTransactionSignature = 0x30,
}

/// APDU encode / decode errors
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ApduError {
    /// Buffer too short for object (or encoded length mismatch)
    InvalidLength,
    /// Object encoding invalid
    InvalidEncoding,
    /// String field not valid UTF-8
    InvalidUtf8,
}

impl From<encdec::Error> for ApduError {
    fn from(e: encdec::Error) -> Self {
        match e {
            encdec::Error::Length => ApduError::InvalidLength,
            encdec::Error::Utf8 => ApduError::InvalidUtf8,
            #[allow(unreachable_patterns)]
            _ => ApduError::InvalidEncoding,
        }
    }
}

/// Static APDU header information, attached to request objects so
/// hosts can construct the matching frame header
pub trait ApduStatic {
    /// APDU class
    const CLA: u8;

    /// APDU instruction
    const INS: u8;

    /// First parameter byte, zero unless a request carries one
    fn p1(&self) -> u8 {
        0
    }

    /// Second parameter byte, zero unless a request carries one
    fn p2(&self) -> u8 {
        0
    }
}
