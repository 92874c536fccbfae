// Copyright (c) 2023-2024 The Ledger MW Project

//! Tor payment proof signature handler
//!
//! Signs the canonical payment proof message (decimal value, kernel
//! commitment, sender address) with the device Tor address key. The device
//! refuses to sign any message embedding its own public key, in any of its
//! encodings, so a host cannot obtain a receiver signature over a
//! self-referential proof.

use encdec::Decode;
use heapless::Vec;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use curve25519_dalek::edwards::CompressedEdwardsY;
use ed25519_dalek::Signer;

use ledger_mw_apdu::{
    proof::{TorTransactionSignatureReq, TorTransactionSignatureResp},
    Request, Response,
};

use crate::consts::{COMMITMENT_SIZE, ED25519_SIGNATURE_SIZE, TOR_ADDRESS_PRIVATE_KEY_INDEX};
use crate::engine::{
    append_apdu,
    mw::{self, Commitment},
    Driver, Engine, Error,
};
use crate::keys::{self, Curve};

/// Maximum payment proof message length, full-width decimal value plus
/// commitment plus the largest address one frame can carry
const MESSAGE_CAPACITY: usize = 20 + COMMITMENT_SIZE + (u8::MAX as usize - 8 - COMMITMENT_SIZE);

/// Constant-time substring search for a public key encoding
fn contains_public_key(message: &[u8], key: &[u8; 32]) -> bool {
    message.windows(key.len()).any(|w| bool::from(w.ct_eq(key)))
}

/// Big-endian `y` coordinate of a compressed Edwards point
///
/// The 65-byte uncompressed encoding is `04 || x || y` with big-endian
/// coordinates, so any message embedding it embeds this 32-byte window.
fn uncompressed_y_window(compressed: &CompressedEdwardsY) -> [u8; 32] {
    let mut y = compressed.to_bytes();
    y[31] &= 0x7f;
    y.reverse();
    y
}

impl<DRV: Driver> Engine<DRV> {
    /// Sign a payment proof message with the device Tor address key
    #[cfg_attr(feature = "noinline", inline(never))]
    pub(crate) fn get_tor_transaction_signature(
        &mut self,
        req: &Request,
        response: &mut Response,
    ) -> Result<(), Error> {
        self.require_unlocked()?;

        if req.first_parameter != 0 || req.second_parameter != 0 {
            return Err(Error::InvalidParameters);
        }

        // Body must hold the value, commitment and a non-empty address;
        // short bodies fail the shared parameter check
        if req.data.len() <= 8 + COMMITMENT_SIZE {
            return Err(Error::InvalidParameters);
        }
        let (tx, _) =
            TorTransactionSignatureReq::decode(req.data).map_err(|_| Error::InvalidParameters)?;

        if tx.value == 0 {
            return Err(Error::InvalidParameters);
        }
        if !mw::commitment_is_valid(&tx.commitment) {
            return Err(Error::InvalidParameters);
        }
        let commitment = Commitment(tx.commitment);

        let length = mw::payment_proof_message_length(tx.value, tx.sender_address.len());

        let mut message = Vec::<u8, MESSAGE_CAPACITY>::new();
        message
            .resize_default(length)
            .map_err(|_| Error::InvalidParameters)?;
        let n = mw::payment_proof_message(&mut message, tx.value, &commitment, tx.sender_address)?;

        let mut seed = self.driver().wallet_seed();
        let key = keys::address_private_key(
            seed.as_ref(),
            TOR_ADDRESS_PRIVATE_KEY_INDEX,
            Curve::Ed25519,
        );
        seed.zeroize();
        let mut key = key?;

        let signing = ed25519_dalek::SigningKey::from_bytes(key.as_bytes());
        let verifying = signing.verifying_key();

        // Refuse to sign a message embedding the device public key in any
        // encoding: compressed, Montgomery, or the coordinate window the
        // uncompressed form carries
        let compressed = verifying.to_bytes();
        let montgomery = verifying.to_montgomery().to_bytes();
        let uncompressed_y = uncompressed_y_window(&CompressedEdwardsY(compressed));
        if contains_public_key(&message[..n], &compressed)
            || contains_public_key(&message[..n], &montgomery)
            || contains_public_key(&message[..n], &uncompressed_y)
        {
            key.zeroize();
            return Err(Error::InvalidParameters);
        }

        if response.will_overflow(ED25519_SIGNATURE_SIZE) {
            key.zeroize();
            return Err(Error::InvalidLength);
        }

        let signature = signing.sign(&message[..n]).to_bytes();
        key.zeroize();

        append_apdu(response, &TorTransactionSignatureResp::new(signature))
    }
}
