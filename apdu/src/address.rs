// Copyright (c) 2023-2024 The Ledger MW Project

//! Address key APDUs
//!
//! Each supported address scheme derives its key at its own path: MQS
//! addresses use a secp256k1 key, Tor and Slatepack addresses share the
//! device's Ed25519 address key (only the public encoding differs, which is
//! applied host-side).

use encdec::{Decode, Encode};
use num_enum::TryFromPrimitive;

use super::{ApduError, ApduStatic, Instruction, MW_APDU_CLA};

/// Address scheme selector, carried in `P1` of address requests
#[derive(Copy, Clone, Debug, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum AddressType {
    /// MQS (MimbleWimble Queue Service) address, secp256k1
    Mqs = 0x00,

    /// Tor (v3 onion service) address, Ed25519
    Tor = 0x01,

    /// Slatepack address, Ed25519
    Slatepack = 0x02,
}

/// Fetch the public key for an address index APDU
///
/// ## Encoding
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                         ADDRESS_INDEX                         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AddressPublicKeyReq {
    /// Address scheme, carried in `P1`
    pub address_type: AddressType,

    /// Address derivation index
    pub index: u32,
}

impl AddressPublicKeyReq {
    /// Create a new address public key request APDU
    pub fn new(address_type: AddressType, index: u32) -> Self {
        Self {
            address_type,
            index,
        }
    }
}

impl ApduStatic for AddressPublicKeyReq {
    const CLA: u8 = MW_APDU_CLA;
    const INS: u8 = Instruction::GetAddressPublicKey as u8;

    fn p1(&self) -> u8 {
        self.address_type as u8
    }
}

impl Encode for AddressPublicKeyReq {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(4)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < 4 {
            return Err(ApduError::InvalidLength);
        }

        buff[..4].copy_from_slice(&self.index.to_le_bytes());

        Ok(4)
    }
}

/// Address public key response APDU
///
/// Body is the raw public key, 33 bytes (compressed secp256k1) for MQS
/// addresses and 32 bytes (Ed25519) otherwise.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AddressPublicKeyResp<'a> {
    /// Raw public key bytes
    pub public_key: &'a [u8],
}

impl<'a> AddressPublicKeyResp<'a> {
    /// Create a new address public key response APDU
    pub fn new(public_key: &'a [u8]) -> Self {
        Self { public_key }
    }
}

impl<'a> Encode for AddressPublicKeyResp<'a> {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, Self::Error> {
        Ok(self.public_key.len())
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, Self::Error> {
        if buff.len() < self.public_key.len() {
            return Err(ApduError::InvalidLength);
        }

        buff[..self.public_key.len()].copy_from_slice(self.public_key);

        Ok(self.public_key.len())
    }
}

impl<'a> Decode<'a> for AddressPublicKeyResp<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        Ok((Self { public_key: buff }, buff.len()))
    }
}
