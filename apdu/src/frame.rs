// Copyright (c) 2023-2024 The Ledger MW Project

//! Raw APDU frame parsing
//!
//! A command frame is `CLA | INS | P1 | P2 | LC | DATA[LC]`. The dispatcher
//! parses incoming frames to a [`Request`] view and lends it to exactly one
//! handler invocation; handlers never mutate the request.

use crate::ApduError;

/// Frame offset for the class byte
pub const APDU_OFF_CLA: usize = 0;

/// Frame offset for the instruction byte
pub const APDU_OFF_INS: usize = 1;

/// Frame offset for the first parameter byte
pub const APDU_OFF_P1: usize = 2;

/// Frame offset for the second parameter byte
pub const APDU_OFF_P2: usize = 3;

/// Frame offset for the data length byte
pub const APDU_OFF_LC: usize = 4;

/// Frame offset for the start of command data
pub const APDU_OFF_DATA: usize = 5;

/// Immutable view over one parsed command frame
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Request<'a> {
    /// APDU class byte
    pub class: u8,

    /// Instruction byte, selects the handler
    pub instruction: u8,

    /// First parameter byte, handler specific
    pub first_parameter: u8,

    /// Second parameter byte, handler specific
    pub second_parameter: u8,

    /// Handler specific payload, `LC` bytes
    pub data: &'a [u8],
}

impl<'a> Request<'a> {
    /// Parse a raw frame into a [`Request`] view
    ///
    /// Fails if the frame is shorter than the fixed header or the data
    /// length byte does not match the remaining frame length.
    pub fn parse(frame: &'a [u8]) -> Result<Self, ApduError> {
        if frame.len() < APDU_OFF_DATA {
            return Err(ApduError::InvalidLength);
        }

        let data_length = frame[APDU_OFF_LC] as usize;
        if frame.len() != APDU_OFF_DATA + data_length {
            return Err(ApduError::InvalidLength);
        }

        Ok(Self {
            class: frame[APDU_OFF_CLA],
            instruction: frame[APDU_OFF_INS],
            first_parameter: frame[APDU_OFF_P1],
            second_parameter: frame[APDU_OFF_P2],
            data: &frame[APDU_OFF_DATA..],
        })
    }

    /// Build a frame for the provided header and payload, for host /
    /// test use
    pub fn encode_frame(
        class: u8,
        instruction: u8,
        p1: u8,
        p2: u8,
        data: &[u8],
        buff: &mut [u8],
    ) -> Result<usize, ApduError> {
        if data.len() > u8::MAX as usize || buff.len() < APDU_OFF_DATA + data.len() {
            return Err(ApduError::InvalidLength);
        }

        buff[APDU_OFF_CLA] = class;
        buff[APDU_OFF_INS] = instruction;
        buff[APDU_OFF_P1] = p1;
        buff[APDU_OFF_P2] = p2;
        buff[APDU_OFF_LC] = data.len() as u8;
        buff[APDU_OFF_DATA..][..data.len()].copy_from_slice(data);

        Ok(APDU_OFF_DATA + data.len())
    }
}
