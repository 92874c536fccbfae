// Copyright (c) 2023-2024 The Ledger MW Project

//! Range proof and payment proof APDUs

use byteorder::{ByteOrder, LittleEndian};
use encdec::{Decode, Encode};

use super::{ApduError, ApduStatic, Instruction, MW_APDU_CLA};
use crate::commitment::{COMMITMENT_SIZE, IDENTIFIER_SIZE};
use crate::helpers::arr;

/// Ed25519 signature size in bytes
pub const ED25519_SIGNATURE_SIZE: usize = 64;

/// Maximum bulletproof chunk carried by one response
pub const BULLETPROOF_CHUNK_SIZE: usize = 192;

/// Fetch one chunk of the bulletproof for a value and identifier
///
/// The proof is deterministic for a given request so the device recomputes
/// it per chunk rather than holding state between exchanges; `P2` selects
/// the chunk index. Body encoding matches [`CommitmentReq`][super::commitment::CommitmentReq].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BulletproofComponentsReq {
    /// Value to prove
    pub value: u64,

    /// Serialized output identifier
    pub identifier: [u8; IDENTIFIER_SIZE],

    /// Switch commitment type byte
    pub switch_type: u8,

    /// Requested chunk index, carried in `P2`
    pub chunk: u8,
}

impl BulletproofComponentsReq {
    /// Create a new bulletproof components request APDU
    pub fn new(value: u64, identifier: [u8; IDENTIFIER_SIZE], switch_type: u8, chunk: u8) -> Self {
        Self {
            value,
            identifier,
            switch_type,
            chunk,
        }
    }
}

impl ApduStatic for BulletproofComponentsReq {
    const CLA: u8 = MW_APDU_CLA;
    const INS: u8 = Instruction::GetBulletproofComponents as u8;

    fn p2(&self) -> u8 {
        self.chunk
    }
}

impl Encode for BulletproofComponentsReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(8 + IDENTIFIER_SIZE + 1)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let mut index = 0;

        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        LittleEndian::write_u64(&mut buff[index..], self.value);
        index += 8;

        buff[index..][..IDENTIFIER_SIZE].copy_from_slice(&self.identifier);
        index += IDENTIFIER_SIZE;

        buff[index] = self.switch_type;
        index += 1;

        Ok(index)
    }
}

/// Bulletproof chunk response APDU
///
/// ## Encoding
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |       PROOF_LEN (u16, LE)     |                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               /
/// /                       CHUNK (<= 192 bytes)                    /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BulletproofComponentsResp<'a> {
    /// Total proof length in bytes
    pub proof_length: u16,

    /// Proof bytes for the requested chunk
    pub chunk: &'a [u8],
}

impl<'a> BulletproofComponentsResp<'a> {
    /// Create a new bulletproof chunk response APDU
    pub fn new(proof_length: u16, chunk: &'a [u8]) -> Self {
        Self {
            proof_length,
            chunk,
        }
    }
}

impl<'a> Encode for BulletproofComponentsResp<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(2 + self.chunk.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if self.chunk.len() > BULLETPROOF_CHUNK_SIZE || buff.len() < 2 + self.chunk.len() {
            return Err(ApduError::InvalidLength);
        }

        LittleEndian::write_u16(buff, self.proof_length);
        buff[2..][..self.chunk.len()].copy_from_slice(self.chunk);

        Ok(2 + self.chunk.len())
    }
}

impl<'a> Decode<'a> for BulletproofComponentsResp<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        if buff.len() < 2 {
            return Err(ApduError::InvalidLength);
        }

        let proof_length = LittleEndian::read_u16(buff);
        let chunk = &buff[2..];

        if chunk.len() > BULLETPROOF_CHUNK_SIZE {
            return Err(ApduError::InvalidLength);
        }

        Ok((
            Self {
                proof_length,
                chunk,
            },
            buff.len(),
        ))
    }
}

/// Sign a payment proof message with the device Tor address key
///
/// ## Encoding
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             VALUE                             |
/// |                           (u64, LE)                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                     COMMITMENT (33 bytes)                     /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                        SENDER_ADDRESS                         /
/// /                 (variable length, non-empty)                  /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TorTransactionSignatureReq<'a> {
    /// Transaction value
    pub value: u64,

    /// Serialized Pedersen commitment
    pub commitment: [u8; COMMITMENT_SIZE],

    /// Sender address bytes (encoding is caller-defined)
    pub sender_address: &'a [u8],
}

impl<'a> TorTransactionSignatureReq<'a> {
    /// Create a new Tor transaction signature request APDU
    pub fn new(value: u64, commitment: [u8; COMMITMENT_SIZE], sender_address: &'a [u8]) -> Self {
        Self {
            value,
            commitment,
            sender_address,
        }
    }
}

impl<'a> ApduStatic for TorTransactionSignatureReq<'a> {
    const CLA: u8 = MW_APDU_CLA;
    const INS: u8 = Instruction::GetTorTransactionSignature as u8;
}

impl<'a> Encode for TorTransactionSignatureReq<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(8 + COMMITMENT_SIZE + self.sender_address.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        let mut index = 0;

        if buff.len() < self.encode_len()? {
            return Err(ApduError::InvalidLength);
        }

        LittleEndian::write_u64(&mut buff[index..], self.value);
        index += 8;

        buff[index..][..COMMITMENT_SIZE].copy_from_slice(&self.commitment);
        index += COMMITMENT_SIZE;

        buff[index..][..self.sender_address.len()].copy_from_slice(self.sender_address);
        index += self.sender_address.len();

        Ok(index)
    }
}

impl<'a> Decode<'a> for TorTransactionSignatureReq<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let mut index = 0;

        // Sender address must be non-empty
        if buff.len() <= 8 + COMMITMENT_SIZE {
            return Err(ApduError::InvalidLength);
        }

        let value = LittleEndian::read_u64(buff);
        index += 8;

        let (commitment, n) = arr::dec(&buff[index..])?;
        index += n;

        let sender_address = &buff[index..];
        index += sender_address.len();

        Ok((
            Self {
                value,
                commitment,
                sender_address,
            },
            index,
        ))
    }
}

/// Tor transaction signature response APDU, 64-byte Ed25519 signature body
#[derive(Copy, Clone, Debug, PartialEq, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct TorTransactionSignatureResp {
    /// Ed25519 signature over the payment proof message
    #[encdec(with = "arr")]
    pub signature: [u8; ED25519_SIGNATURE_SIZE],
}

impl TorTransactionSignatureResp {
    /// Create a new Tor transaction signature response APDU
    pub fn new(signature: [u8; ED25519_SIGNATURE_SIZE]) -> Self {
        Self { signature }
    }
}
