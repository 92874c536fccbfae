// Copyright (c) 2023-2024 The Ledger MW Project

//! Pedersen commitment APDUs

use byteorder::{ByteOrder, LittleEndian};
use encdec::{Decode, Encode};

use super::{ApduError, ApduStatic, Instruction, MW_APDU_CLA};
use crate::helpers::arr;

/// Serialized commitment size in bytes
pub const COMMITMENT_SIZE: usize = 33;

/// Serialized identifier size in bytes (depth byte + four path indices)
pub const IDENTIFIER_SIZE: usize = 17;

/// Fetch the Pedersen commitment for a value and identifier
///
/// ## Encoding
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             VALUE                             |
/// |                           (u64, LE)                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                     IDENTIFIER (17 bytes)                     /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  SWITCH_TYPE  |
/// +-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CommitmentReq {
    /// Value to commit
    pub value: u64,

    /// Serialized output identifier
    pub identifier: [u8; IDENTIFIER_SIZE],

    /// Switch commitment type byte
    pub switch_type: u8,
}

impl CommitmentReq {
    /// Create a new commitment request APDU
    pub fn new(value: u64, identifier: [u8; IDENTIFIER_SIZE], switch_type: u8) -> Self {
        Self {
            value,
            identifier,
            switch_type,
        }
    }
}

impl ApduStatic for CommitmentReq {
    const CLA: u8 = MW_APDU_CLA;
    const INS: u8 = Instruction::GetCommitment as u8;
}

impl Encode for CommitmentReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(8 + IDENTIFIER_SIZE + 1)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let mut index = 0;

        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        // Write value
        LittleEndian::write_u64(&mut buff[index..], self.value);
        index += 8;

        // Write identifier
        buff[index..][..IDENTIFIER_SIZE].copy_from_slice(&self.identifier);
        index += IDENTIFIER_SIZE;

        // Write switch type
        buff[index] = self.switch_type;
        index += 1;

        Ok(index)
    }
}

impl<'a> Decode<'a> for CommitmentReq {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let mut index = 0;

        if buff.len() < 8 + IDENTIFIER_SIZE + 1 {
            return Err(ApduError::InvalidLength);
        }

        // Read value
        let value = LittleEndian::read_u64(&buff[index..]);
        index += 8;

        // Read identifier
        let (identifier, n) = arr::dec(&buff[index..])?;
        index += n;

        // Read switch type
        let switch_type = buff[index];
        index += 1;

        Ok((
            Self {
                value,
                identifier,
                switch_type,
            },
            index,
        ))
    }
}

/// Pedersen commitment response APDU, 33-byte commitment body
#[derive(Copy, Clone, Debug, PartialEq, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct CommitmentResp {
    /// Serialized Pedersen commitment
    #[encdec(with = "arr")]
    pub commitment: [u8; COMMITMENT_SIZE],
}

impl CommitmentResp {
    /// Create a new commitment response APDU
    pub fn new(commitment: [u8; COMMITMENT_SIZE]) -> Self {
        Self { commitment }
    }
}
