// Copyright (c) 2023-2024 The Ledger MW Project

//! MimbleWimble crypto engine
//!
//! Pedersen commitments, switch commitments, rewind / private nonces,
//! bulletproof assembly, single-signer signatures, payment proof messages
//! and the AEAD used for slate exchange. Everything here is deterministic
//! for a given seed and request so commands can be re-issued without
//! device-side state.

use aes_gcm::{AeadInPlace, Aes256Gcm, KeyInit};
use blake2::{digest::consts::U32, Blake2b};
use byteorder::{BigEndian, ByteOrder};
use hmac::{Hmac, Mac};
use num_enum::TryFromPrimitive;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use ed25519_dalek::Verifier;

use k256::{
    elliptic_curve::{
        group::Group,
        ops::Reduce,
        point::AffineCoordinates,
        sec1::{FromEncodedPoint, ToEncodedPoint},
        PrimeField,
    },
    AffinePoint, EncodedPoint, ProjectivePoint, Scalar, U256,
};

use crate::consts::{
    BLINDING_FACTOR_SIZE, BULLETPROOF_SIZE, COMMITMENT_SIZE, COMPRESSED_PUBLIC_KEY_SIZE,
    ED25519_PUBLIC_KEY_SIZE, ED25519_SIGNATURE_SIZE, ENCRYPTION_NONCE_SIZE, ENCRYPTION_TAG_SIZE,
    EVEN_COMMITMENT_PREFIX, EVEN_COMPRESSED_PUBLIC_KEY_PREFIX, GENERATOR_H, GENERATOR_J,
    IDENTIFIER_MAXIMUM_DEPTH, IDENTIFIER_SIZE, NONCE_SIZE, ODD_COMMITMENT_PREFIX,
    ODD_COMPRESSED_PUBLIC_KEY_PREFIX, PROOF_MESSAGE_IDENTIFIER_INDEX, PROOF_MESSAGE_SIZE,
    PROOF_MESSAGE_SWITCH_TYPE_INDEX, SINGLE_SIGNER_COMPACT_SIGNATURE_SIZE,
    SINGLE_SIGNER_MESSAGE_SIZE, UNCOMPRESSED_PUBLIC_KEY_SIZE,
};
use crate::engine::{Driver, Error};
use crate::helpers;
use crate::keys::{self, Curve, PrivateKey};

/// Blake2b with 256-bit output, the wallet's nonce derivation hash
type Blake2b256 = Blake2b<U32>;

/// Pedersen commitment blinding factor, wiped on drop
#[derive(Clone, PartialEq, Zeroize, ZeroizeOnDrop)]
pub struct BlindingFactor([u8; BLINDING_FACTOR_SIZE]);

impl BlindingFactor {
    /// Wrap raw blinding factor bytes
    pub fn from_bytes(bytes: [u8; BLINDING_FACTOR_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw blinding factor bytes
    pub fn as_bytes(&self) -> &[u8; BLINDING_FACTOR_SIZE] {
        &self.0
    }
}

/// Serialized Pedersen commitment
///
/// Standard compressed SEC1 encoding with the prefix byte remapped to the
/// commitment range, `0x08` for even `y` and `0x09` for odd.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Commitment(pub [u8; COMMITMENT_SIZE]);

impl Commitment {
    /// Raw commitment bytes
    pub fn as_bytes(&self) -> &[u8; COMMITMENT_SIZE] {
        &self.0
    }
}

/// Switch commitment type
#[derive(Copy, Clone, Debug, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum SwitchType {
    /// Plain Pedersen commitment, raw derived blinding factor
    None = 0x00,

    /// Switch commitment, blinding factor tweaked towards `J`
    Regular = 0x01,
}

/// Output identifier, a bounded derivation path
///
/// Serialized as one depth byte followed by four big-endian path indices;
/// indices beyond the depth are carried but ignored.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Identifier {
    depth: u8,
    path: [u32; IDENTIFIER_MAXIMUM_DEPTH],
}

impl Identifier {
    /// Create an identifier from a depth-prefixed path
    pub fn new(path: &[u32]) -> Result<Self, Error> {
        if path.len() > IDENTIFIER_MAXIMUM_DEPTH {
            return Err(Error::InvalidParameters);
        }

        let mut p = [0u32; IDENTIFIER_MAXIMUM_DEPTH];
        p[..path.len()].copy_from_slice(path);

        Ok(Self {
            depth: path.len() as u8,
            path: p,
        })
    }

    /// Parse a serialized identifier, rejecting out-of-range depths
    pub fn from_bytes(bytes: &[u8; IDENTIFIER_SIZE]) -> Result<Self, Error> {
        let depth = bytes[0];
        if depth as usize > IDENTIFIER_MAXIMUM_DEPTH {
            return Err(Error::InvalidParameters);
        }

        let mut path = [0u32; IDENTIFIER_MAXIMUM_DEPTH];
        for (i, p) in path.iter_mut().enumerate() {
            *p = BigEndian::read_u32(&bytes[1 + i * 4..]);
        }

        Ok(Self { depth, path })
    }

    /// Serialize the identifier
    pub fn to_bytes(self) -> [u8; IDENTIFIER_SIZE] {
        let mut bytes = [0u8; IDENTIFIER_SIZE];

        bytes[0] = self.depth;
        for (i, p) in self.path.iter().enumerate() {
            BigEndian::write_u32(&mut bytes[1 + i * 4..1 + (i + 1) * 4], *p);
        }

        bytes
    }

    /// Active derivation path, `depth` indices
    pub fn path(&self) -> &[u32] {
        &self.path[..self.depth as usize]
    }
}

/// Parse a canonical secp256k1 scalar, zero allowed
fn scalar(bytes: &[u8; 32]) -> Option<Scalar> {
    Option::<Scalar>::from(Scalar::from_repr((*bytes).into()))
}

/// Parse a canonical, non-zero secp256k1 scalar
fn nonzero_scalar(bytes: &[u8; 32]) -> Option<Scalar> {
    scalar(bytes).filter(|s| !bool::from(s.is_zero()))
}

/// Decode an embedded uncompressed generator point
fn generator(bytes: &[u8; UNCOMPRESSED_PUBLIC_KEY_SIZE]) -> Result<ProjectivePoint, Error> {
    let encoded = EncodedPoint::from_bytes(bytes).map_err(|_| Error::Internal)?;
    let affine = Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded))
        .ok_or(Error::Internal)?;

    Ok(ProjectivePoint::from(affine))
}

/// Serialize a point as a 33-byte commitment
fn encode_commitment(point: &ProjectivePoint) -> Result<Commitment, Error> {
    if bool::from(point.is_identity()) {
        return Err(Error::Internal);
    }

    let encoded = point.to_affine().to_encoded_point(true);

    let mut out = [0u8; COMMITMENT_SIZE];
    out.copy_from_slice(encoded.as_bytes());
    out[0] = match out[0] {
        ODD_COMPRESSED_PUBLIC_KEY_PREFIX => ODD_COMMITMENT_PREFIX,
        _ => EVEN_COMMITMENT_PREFIX,
    };

    Ok(Commitment(out))
}

/// Pedersen commitment `value * H + blinding * G`
fn commit_scalar(value: u64, blind: &Scalar) -> Result<Commitment, Error> {
    let h = generator(&GENERATOR_H)?;
    let point = h * Scalar::from(value) + ProjectivePoint::GENERATOR * blind;

    encode_commitment(&point)
}

/// Commit a value under a blinding factor
pub fn commit(value: u64, blinding: &BlindingFactor) -> Result<Commitment, Error> {
    let b = scalar(blinding.as_bytes()).ok_or(Error::InvalidParameters)?;

    commit_scalar(value, &b)
}

/// Check a serialized commitment for prefix, curve membership and
/// non-identity
pub fn commitment_is_valid(bytes: &[u8; COMMITMENT_SIZE]) -> bool {
    let prefix = match bytes[0] {
        EVEN_COMMITMENT_PREFIX => EVEN_COMPRESSED_PUBLIC_KEY_PREFIX,
        ODD_COMMITMENT_PREFIX => ODD_COMPRESSED_PUBLIC_KEY_PREFIX,
        _ => return false,
    };

    let mut sec1 = *bytes;
    sec1[0] = prefix;

    let encoded = match EncodedPoint::from_bytes(sec1) {
        Ok(p) => p,
        Err(_) => return false,
    };

    Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded)).is_some()
}

/// Apply the switch commitment tweak to a derived blinding factor
///
/// `blind + SHA256(commit(value, blind) || blind * J)`, reduced mod the
/// curve order, per the libsecp256k1-zkp switch commitment construction.
fn switch_blinding_factor(value: u64, blind: &[u8; 32]) -> Result<BlindingFactor, Error> {
    let b = nonzero_scalar(blind).ok_or(Error::Internal)?;

    let commitment = commit_scalar(value, &b)?;

    let j = generator(&GENERATOR_J)?;
    let jb = (j * b).to_affine().to_encoded_point(true);

    let mut hasher = Sha256::new();
    hasher.update(commitment.as_bytes());
    hasher.update(jb.as_bytes());
    let digest = hasher.finalize();

    let tweak = <Scalar as Reduce<U256>>::reduce_bytes(&digest);
    let sum = b + tweak;
    if bool::from(sum.is_zero()) {
        return Err(Error::Internal);
    }

    Ok(BlindingFactor(sum.to_bytes().into()))
}

/// Derive the blinding factor for a value and output identifier
#[cfg_attr(feature = "noinline", inline(never))]
pub fn derive_blinding_factor(
    seed: &[u8],
    value: u64,
    identifier: &Identifier,
    switch_type: SwitchType,
) -> Result<BlindingFactor, Error> {
    let (mut key, mut chain) = keys::derive_child_key(seed, Curve::Secp256k1, identifier.path())?;
    chain.zeroize();

    let r = match switch_type {
        SwitchType::None => Ok(BlindingFactor(*key.as_bytes())),
        SwitchType::Regular => switch_blinding_factor(value, key.as_bytes()),
    };

    key.zeroize();

    r
}

/// Commit a value under its derived blinding factor
#[cfg_attr(feature = "noinline", inline(never))]
pub fn commit_value(
    seed: &[u8],
    value: u64,
    identifier: &Identifier,
    switch_type: SwitchType,
) -> Result<Commitment, Error> {
    let mut blinding = derive_blinding_factor(seed, value, identifier, switch_type)?;
    let r = commit(value, &blinding);

    blinding.zeroize();

    r
}

/// Blake2b-256 of a root-derived tag and a commitment
fn nonce_chain(tag: &[u8], commitment: &Commitment) -> [u8; NONCE_SIZE] {
    let mut hasher = Blake2b256::new();
    hasher.update(tag);
    let hash = hasher.finalize();

    let mut hasher = Blake2b256::new();
    hasher.update(hash);
    hasher.update(commitment.as_bytes());

    let mut out = [0u8; NONCE_SIZE];
    out.copy_from_slice(&hasher.finalize());

    out
}

/// Rewind nonce for a commitment
///
/// Chained from the root _public_ key so a view wallet holding only the
/// rewind hash can recover its outputs from the chain.
#[cfg_attr(feature = "noinline", inline(never))]
pub fn rewind_nonce(seed: &[u8], commitment: &Commitment) -> Result<[u8; NONCE_SIZE], Error> {
    let (mut root, mut chain) = keys::root_key(seed, Curve::Secp256k1)?;
    chain.zeroize();

    let public = keys::public_key(&root);
    root.zeroize();

    Ok(nonce_chain(public?.as_bytes(), commitment))
}

/// Private nonce for a commitment, chained from the root private key
#[cfg_attr(feature = "noinline", inline(never))]
pub fn private_nonce(seed: &[u8], commitment: &Commitment) -> Result<[u8; NONCE_SIZE], Error> {
    let (mut root, mut chain) = keys::root_key(seed, Curve::Secp256k1)?;
    chain.zeroize();

    let nonce = nonce_chain(root.as_bytes(), commitment);
    root.zeroize();

    Ok(nonce)
}

/// Accumulate a blinding factor into a running sum, in place
///
/// `is_positive` selects addition or subtraction mod the curve order. The
/// sum may pass through zero while accumulating.
pub fn update_blinding_factor_sum(
    sum: &mut BlindingFactor,
    factor: &BlindingFactor,
    is_positive: bool,
) -> Result<(), Error> {
    let s = scalar(sum.as_bytes()).ok_or(Error::InvalidParameters)?;
    let f = scalar(factor.as_bytes()).ok_or(Error::InvalidParameters)?;

    let updated = if is_positive { s + f } else { s - f };
    sum.0.copy_from_slice(&updated.to_bytes());

    Ok(())
}

/// Assemble the embedded bulletproof message for an output
///
/// Twenty bytes, zero-padded, with the switch type at index 2 and the
/// serialized identifier from index 3.
pub fn proof_message(identifier: &Identifier, switch_type: SwitchType) -> [u8; PROOF_MESSAGE_SIZE] {
    let mut message = [0u8; PROOF_MESSAGE_SIZE];

    message[PROOF_MESSAGE_SWITCH_TYPE_INDEX] = switch_type as u8;
    message[PROOF_MESSAGE_IDENTIFIER_INDEX..].copy_from_slice(&identifier.to_bytes());

    message
}

/// Build the range proof for a committed value via the platform prover
///
/// Output is written to `out` and bounded by [`BULLETPROOF_SIZE`].
#[cfg_attr(feature = "noinline", inline(never))]
pub fn calculate_bulletproof<DRV: Driver>(
    drv: &DRV,
    value: u64,
    blinding: &BlindingFactor,
    rewind_nonce: &[u8; NONCE_SIZE],
    private_nonce: &[u8; NONCE_SIZE],
    proof_message: &[u8; PROOF_MESSAGE_SIZE],
    out: &mut [u8],
) -> Result<usize, Error> {
    if out.len() < BULLETPROOF_SIZE {
        return Err(Error::InvalidLength);
    }

    let n = drv.range_proof(value, blinding, rewind_nonce, private_nonce, proof_message, out)?;
    if n > BULLETPROOF_SIZE {
        return Err(Error::Internal);
    }

    Ok(n)
}

/// Schnorr challenge `SHA256(R.x || P || message)` reduced mod the order
fn single_signer_challenge(
    r_x: &[u8; 32],
    public_key: &[u8; COMPRESSED_PUBLIC_KEY_SIZE],
    message: &[u8; SINGLE_SIGNER_MESSAGE_SIZE],
) -> Scalar {
    let mut hasher = Sha256::new();
    hasher.update(r_x);
    hasher.update(public_key);
    hasher.update(message);

    <Scalar as Reduce<U256>>::reduce_bytes(&hasher.finalize())
}

/// Create a single-signer signature over a 32-byte message
///
/// One-round Schnorr over secp256k1 with a deterministic HMAC-derived
/// nonce normalized to an even-`y` commitment point. The compact output is
/// `R.x || s` with each half serialized little-endian.
#[cfg_attr(feature = "noinline", inline(never))]
pub fn create_single_signer_signature(
    message: &[u8; SINGLE_SIGNER_MESSAGE_SIZE],
    private_key: &PrivateKey,
    public_key: &[u8; COMPRESSED_PUBLIC_KEY_SIZE],
) -> Result<[u8; SINGLE_SIGNER_COMPACT_SIGNATURE_SIZE], Error> {
    if private_key.curve() != Curve::Secp256k1 {
        return Err(Error::InvalidParameters);
    }

    let x = nonzero_scalar(private_key.as_bytes()).ok_or(Error::InvalidParameters)?;

    // Deterministic nonce bound to the key, message and public key
    let mut mac = <Hmac<Sha256> as Mac>::new_from_slice(private_key.as_bytes())
        .map_err(|_| Error::Internal)?;
    mac.update(message);
    mac.update(public_key);
    let digest = mac.finalize().into_bytes();

    let mut k = <Scalar as Reduce<U256>>::reduce_bytes(&digest);
    if bool::from(k.is_zero()) {
        return Err(Error::Internal);
    }

    let mut r = (ProjectivePoint::GENERATOR * k).to_affine();
    if bool::from(r.y_is_odd()) {
        k = -k;
        r = (ProjectivePoint::GENERATOR * k).to_affine();
    }

    let mut r_x = [0u8; 32];
    r_x.copy_from_slice(&r.x());

    let e = single_signer_challenge(&r_x, public_key, message);
    let s = k + e * x;

    let mut signature = [0u8; SINGLE_SIGNER_COMPACT_SIGNATURE_SIZE];
    signature[..32].copy_from_slice(&r_x);
    signature[32..].copy_from_slice(&s.to_bytes());

    // Compact encoding carries both halves little-endian
    helpers::swap_endianness(&mut signature[..32]);
    helpers::swap_endianness(&mut signature[32..]);

    Ok(signature)
}

/// Verify a compact single-signer signature
pub fn verify_single_signer_signature(
    signature: &[u8; SINGLE_SIGNER_COMPACT_SIGNATURE_SIZE],
    message: &[u8; SINGLE_SIGNER_MESSAGE_SIZE],
    public_key: &[u8; COMPRESSED_PUBLIC_KEY_SIZE],
) -> bool {
    let mut r_x = [0u8; 32];
    let mut s_bytes = [0u8; 32];
    r_x.copy_from_slice(&signature[..32]);
    s_bytes.copy_from_slice(&signature[32..]);
    helpers::swap_endianness(&mut r_x);
    helpers::swap_endianness(&mut s_bytes);

    let s = match scalar(&s_bytes) {
        Some(s) => s,
        None => return false,
    };

    let encoded = match EncodedPoint::from_bytes(public_key) {
        Ok(p) => p,
        Err(_) => return false,
    };
    let p = match Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded)) {
        Some(p) => ProjectivePoint::from(p),
        None => return false,
    };

    let e = single_signer_challenge(&r_x, public_key, message);

    // R' = s * G - e * P must land on the even-y point with x = R.x
    let r_prime = ProjectivePoint::GENERATOR * s - p * e;
    if bool::from(r_prime.is_identity()) {
        return false;
    }

    let affine = r_prime.to_affine();

    !bool::from(affine.y_is_odd()) && affine.x().as_slice() == r_x
}

/// Length of the payment proof message for a value and sender address
pub fn payment_proof_message_length(value: u64, sender_address_length: usize) -> usize {
    helpers::string_length(value) + COMMITMENT_SIZE + sender_address_length
}

/// Assemble the canonical payment proof message
///
/// ASCII decimal value, raw kernel commitment, then the sender address
/// bytes. Returns the number of bytes written.
pub fn payment_proof_message(
    out: &mut [u8],
    value: u64,
    commitment: &Commitment,
    sender_address: &[u8],
) -> Result<usize, Error> {
    let length = payment_proof_message_length(value, sender_address.len());
    if out.len() < length {
        return Err(Error::InvalidLength);
    }

    let mut index = helpers::write_decimal(out, value).map_err(|_| Error::Internal)?;

    out[index..][..COMMITMENT_SIZE].copy_from_slice(commitment.as_bytes());
    index += COMMITMENT_SIZE;

    out[index..][..sender_address.len()].copy_from_slice(sender_address);
    index += sender_address.len();

    Ok(index)
}

/// Verify an Ed25519 receiver signature over a payment proof message
pub fn verify_payment_proof_message(
    message: &[u8],
    public_key: &[u8; ED25519_PUBLIC_KEY_SIZE],
    signature: &[u8; ED25519_SIGNATURE_SIZE],
) -> bool {
    let key = match ed25519_dalek::VerifyingKey::from_bytes(public_key) {
        Ok(k) => k,
        Err(_) => return false,
    };

    let signature = ed25519_dalek::Signature::from_bytes(signature);

    key.verify(message, &signature).is_ok()
}

/// Ciphertext length for a plaintext, appended authentication tag included
pub fn encrypted_data_length(length: usize) -> usize {
    length + ENCRYPTION_TAG_SIZE
}

/// Encrypt a buffer in place with AES-256-GCM, returning the detached tag
pub fn encrypt_data(
    key: &[u8; 32],
    nonce: &[u8; ENCRYPTION_NONCE_SIZE],
    data: &mut [u8],
) -> Result<[u8; ENCRYPTION_TAG_SIZE], Error> {
    let cipher = Aes256Gcm::new(key.into());

    let tag = cipher
        .encrypt_in_place_detached(nonce.into(), &[], data)
        .map_err(|_| Error::Internal)?;

    Ok(tag.into())
}

/// Decrypt a buffer in place with AES-256-GCM, checking the detached tag
pub fn decrypt_data(
    key: &[u8; 32],
    nonce: &[u8; ENCRYPTION_NONCE_SIZE],
    data: &mut [u8],
    tag: &[u8; ENCRYPTION_TAG_SIZE],
) -> Result<(), Error> {
    let cipher = Aes256Gcm::new(key.into());

    cipher
        .decrypt_in_place_detached(nonce.into(), &[], data, tag.into())
        .map_err(|_| Error::InvalidParameters)
}

/// Check an Ed25519 public key decodes to a valid curve point
pub fn is_valid_ed25519_public_key(bytes: &[u8; ED25519_PUBLIC_KEY_SIZE]) -> bool {
    ed25519_dalek::VerifyingKey::from_bytes(bytes).is_ok()
}

/// Check a secp256k1 private key is canonical and in `[1, n - 1]`
pub fn is_valid_secp256k1_private_key(bytes: &[u8; 32]) -> bool {
    nonzero_scalar(bytes).is_some()
}

/// Check a serialized secp256k1 public key for prefix and curve membership
pub fn is_valid_secp256k1_public_key(bytes: &[u8]) -> bool {
    match bytes.len() {
        COMPRESSED_PUBLIC_KEY_SIZE => {
            if bytes[0] != EVEN_COMPRESSED_PUBLIC_KEY_PREFIX
                && bytes[0] != ODD_COMPRESSED_PUBLIC_KEY_PREFIX
            {
                return false;
            }
        }
        UNCOMPRESSED_PUBLIC_KEY_SIZE => {
            if bytes[0] != 0x04 {
                return false;
            }
        }
        _ => return false,
    }

    let encoded = match EncodedPoint::from_bytes(bytes) {
        Ok(p) => p,
        Err(_) => return false,
    };

    Option::<AffinePoint>::from(AffinePoint::from_encoded_point(&encoded)).is_some()
}

#[cfg(test)]
mod test {
    use rand::random;

    use super::*;
    use crate::consts::SEED_SIZE;
    use crate::engine::testing::TestDriver;

    fn test_identifier() -> Identifier {
        Identifier::new(&[0, 1, 2]).unwrap()
    }

    #[test]
    fn identifier_round_trip() {
        let id = test_identifier();
        let bytes = id.to_bytes();

        assert_eq!(bytes[0], 3);
        assert_eq!(Identifier::from_bytes(&bytes).unwrap(), id);
    }

    #[test]
    fn identifier_rejects_excess_depth() {
        let mut bytes = [0u8; IDENTIFIER_SIZE];
        bytes[0] = (IDENTIFIER_MAXIMUM_DEPTH + 1) as u8;

        assert_eq!(
            Identifier::from_bytes(&bytes).unwrap_err(),
            Error::InvalidParameters
        );
    }

    #[test]
    fn commitments_are_deterministic_and_valid() {
        let seed: [u8; SEED_SIZE] = random();
        let id = test_identifier();

        let a = commit_value(&seed, 1_000_000, &id, SwitchType::Regular).unwrap();
        let b = commit_value(&seed, 1_000_000, &id, SwitchType::Regular).unwrap();

        assert_eq!(a, b);
        assert!(commitment_is_valid(a.as_bytes()));
        assert!(
            a.as_bytes()[0] == EVEN_COMMITMENT_PREFIX || a.as_bytes()[0] == ODD_COMMITMENT_PREFIX
        );

        // Value, path and switch type all bind the commitment
        let c = commit_value(&seed, 1_000_001, &id, SwitchType::Regular).unwrap();
        let d = commit_value(&seed, 1_000_000, &Identifier::new(&[0, 1, 3]).unwrap(), SwitchType::Regular).unwrap();
        let e = commit_value(&seed, 1_000_000, &id, SwitchType::None).unwrap();
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_ne!(a, e);
    }

    #[test]
    fn commitment_validity_rejects_bad_encodings() {
        // Zeroed bytes carry no valid prefix
        assert!(!commitment_is_valid(&[0u8; COMMITMENT_SIZE]));

        // Valid prefix over a non-residue x coordinate
        let mut bytes = [0u8; COMMITMENT_SIZE];
        bytes[0] = EVEN_COMMITMENT_PREFIX;
        bytes[1..].copy_from_slice(&[0xff; 32]);
        assert!(!commitment_is_valid(&bytes));

        // Compressed public key prefix is not a commitment prefix
        let seed: [u8; SEED_SIZE] = random();
        let mut c = commit_value(&seed, 5, &test_identifier(), SwitchType::None)
            .unwrap()
            .0;
        c[0] = EVEN_COMPRESSED_PUBLIC_KEY_PREFIX;
        assert!(!commitment_is_valid(&c));
    }

    #[test]
    fn switch_type_changes_blinding_factor() {
        let seed: [u8; SEED_SIZE] = random();
        let id = test_identifier();

        let plain = derive_blinding_factor(&seed, 42, &id, SwitchType::None).unwrap();
        let switched = derive_blinding_factor(&seed, 42, &id, SwitchType::Regular).unwrap();

        assert_ne!(plain.as_bytes(), switched.as_bytes());

        // Plain factors do not depend on the value, switched factors do
        let plain2 = derive_blinding_factor(&seed, 43, &id, SwitchType::None).unwrap();
        let switched2 = derive_blinding_factor(&seed, 43, &id, SwitchType::Regular).unwrap();
        assert_eq!(plain.as_bytes(), plain2.as_bytes());
        assert_ne!(switched.as_bytes(), switched2.as_bytes());
    }

    #[test]
    fn nonces_are_deterministic_and_distinct() {
        let seed: [u8; SEED_SIZE] = random();
        let c = commit_value(&seed, 9, &test_identifier(), SwitchType::Regular).unwrap();

        let r1 = rewind_nonce(&seed, &c).unwrap();
        let r2 = rewind_nonce(&seed, &c).unwrap();
        let p1 = private_nonce(&seed, &c).unwrap();

        assert_eq!(r1, r2);
        assert_ne!(r1, p1);

        // Nonces are bound to the commitment
        let c2 = commit_value(&seed, 10, &test_identifier(), SwitchType::Regular).unwrap();
        assert_ne!(rewind_nonce(&seed, &c2).unwrap(), r1);
    }

    #[test]
    fn blinding_factor_sum_round_trip() {
        let seed: [u8; SEED_SIZE] = random();
        let id = test_identifier();

        let f1 = derive_blinding_factor(&seed, 1, &id, SwitchType::None).unwrap();
        let f2 = derive_blinding_factor(&seed, 2, &Identifier::new(&[7]).unwrap(), SwitchType::Regular).unwrap();

        let mut sum = BlindingFactor::from_bytes([0u8; BLINDING_FACTOR_SIZE]);
        update_blinding_factor_sum(&mut sum, &f1, true).unwrap();
        update_blinding_factor_sum(&mut sum, &f2, true).unwrap();
        update_blinding_factor_sum(&mut sum, &f2, false).unwrap();

        assert_eq!(sum.as_bytes(), f1.as_bytes());
    }

    #[test]
    fn proof_message_layout() {
        let id = test_identifier();
        let m = proof_message(&id, SwitchType::Regular);

        assert_eq!(&m[..PROOF_MESSAGE_SWITCH_TYPE_INDEX], &[0, 0]);
        assert_eq!(m[PROOF_MESSAGE_SWITCH_TYPE_INDEX], SwitchType::Regular as u8);
        assert_eq!(&m[PROOF_MESSAGE_IDENTIFIER_INDEX..], &id.to_bytes());
    }

    #[test]
    fn bulletproof_is_bounded_and_deterministic() {
        let drv = TestDriver::new();
        let seed = drv.seed();
        let id = test_identifier();

        let blinding = derive_blinding_factor(&seed, 100, &id, SwitchType::Regular).unwrap();
        let c = commit(100, &blinding).unwrap();
        let rewind = rewind_nonce(&seed, &c).unwrap();
        let private = private_nonce(&seed, &c).unwrap();
        let message = proof_message(&id, SwitchType::Regular);

        let mut a = [0u8; BULLETPROOF_SIZE];
        let mut b = [0u8; BULLETPROOF_SIZE];

        let n = calculate_bulletproof(&drv, 100, &blinding, &rewind, &private, &message, &mut a)
            .unwrap();
        let m = calculate_bulletproof(&drv, 100, &blinding, &rewind, &private, &message, &mut b)
            .unwrap();

        assert!(n <= BULLETPROOF_SIZE);
        assert_eq!(n, m);
        assert_eq!(a[..n], b[..m]);

        // Undersized output buffer is rejected before proving
        let mut short = [0u8; BULLETPROOF_SIZE - 1];
        assert_eq!(
            calculate_bulletproof(&drv, 100, &blinding, &rewind, &private, &message, &mut short)
                .unwrap_err(),
            Error::InvalidLength
        );
    }

    #[test]
    fn single_signer_signature_round_trip() {
        let seed: [u8; SEED_SIZE] = random();
        let key = keys::address_private_key(&seed, 0, Curve::Secp256k1).unwrap();

        let public = keys::public_key(&key).unwrap();
        let mut public_bytes = [0u8; COMPRESSED_PUBLIC_KEY_SIZE];
        public_bytes.copy_from_slice(public.as_bytes());

        let message: [u8; SINGLE_SIGNER_MESSAGE_SIZE] = random();

        let sig = create_single_signer_signature(&message, &key, &public_bytes).unwrap();
        assert!(verify_single_signer_signature(&sig, &message, &public_bytes));

        // Deterministic for a fixed key and message
        let sig2 = create_single_signer_signature(&message, &key, &public_bytes).unwrap();
        assert_eq!(sig, sig2);

        // Tampered message and signature both fail
        let mut other = message;
        other[0] ^= 1;
        assert!(!verify_single_signer_signature(&sig, &other, &public_bytes));

        let mut bad = sig;
        bad[40] ^= 1;
        assert!(!verify_single_signer_signature(&bad, &message, &public_bytes));
    }

    #[test]
    fn payment_proof_message_layout() {
        let seed: [u8; SEED_SIZE] = random();
        let c = commit_value(&seed, 1_000_000, &test_identifier(), SwitchType::Regular).unwrap();
        let address = b"sender address bytes";

        let length = payment_proof_message_length(1_000_000, address.len());
        assert_eq!(length, 7 + COMMITMENT_SIZE + address.len());

        let mut buff = [0u8; 128];
        let n = payment_proof_message(&mut buff, 1_000_000, &c, address).unwrap();
        assert_eq!(n, length);

        assert_eq!(&buff[..7], b"1000000");
        assert_eq!(&buff[7..][..COMMITMENT_SIZE], c.as_bytes());
        assert_eq!(&buff[7 + COMMITMENT_SIZE..n], address);
    }

    #[test]
    fn payment_proof_verification() {
        use ed25519_dalek::Signer;

        let seed: [u8; SEED_SIZE] = random();
        let key = keys::address_private_key(&seed, 0, Curve::Ed25519).unwrap();
        let signing = ed25519_dalek::SigningKey::from_bytes(key.as_bytes());
        let public = signing.verifying_key().to_bytes();

        let message = b"100000008...proof message";
        let signature = signing.sign(message).to_bytes();

        assert!(verify_payment_proof_message(message, &public, &signature));

        let mut bad = signature;
        bad[0] ^= 1;
        assert!(!verify_payment_proof_message(message, &public, &bad));
    }

    #[test]
    fn aead_round_trip() {
        let key: [u8; 32] = random();
        let nonce: [u8; ENCRYPTION_NONCE_SIZE] = random();

        let plaintext = b"slate participant data";
        let mut data = *plaintext;

        assert_eq!(
            encrypted_data_length(plaintext.len()),
            plaintext.len() + ENCRYPTION_TAG_SIZE
        );

        let tag = encrypt_data(&key, &nonce, &mut data).unwrap();
        assert_ne!(&data, plaintext);

        decrypt_data(&key, &nonce, &mut data, &tag).unwrap();
        assert_eq!(&data, plaintext);

        // Tampered ciphertext fails authentication
        let mut tampered = data;
        let tag = encrypt_data(&key, &nonce, &mut tampered).unwrap();
        tampered[0] ^= 1;
        assert_eq!(
            decrypt_data(&key, &nonce, &mut tampered, &tag).unwrap_err(),
            Error::InvalidParameters
        );
    }

    #[test]
    fn key_validity_predicates() {
        let seed: [u8; SEED_SIZE] = random();

        let secp = keys::address_private_key(&seed, 0, Curve::Secp256k1).unwrap();
        assert!(is_valid_secp256k1_private_key(secp.as_bytes()));
        assert!(!is_valid_secp256k1_private_key(&[0u8; 32]));
        assert!(!is_valid_secp256k1_private_key(&[0xff; 32]));

        let public = keys::public_key(&secp).unwrap();
        assert!(is_valid_secp256k1_public_key(public.as_bytes()));
        assert!(!is_valid_secp256k1_public_key(&[0u8; 33]));
        assert!(!is_valid_secp256k1_public_key(&[0u8; 16]));

        let ed = keys::address_private_key(&seed, 0, Curve::Ed25519).unwrap();
        let ed_public = keys::public_key(&ed).unwrap();
        let mut ed_bytes = [0u8; ED25519_PUBLIC_KEY_SIZE];
        ed_bytes.copy_from_slice(ed_public.as_bytes());
        assert!(is_valid_ed25519_public_key(&ed_bytes));
    }
}
