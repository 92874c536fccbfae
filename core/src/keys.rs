// Copyright (c) 2023-2024 The Ledger MW Project

//! Hierarchical key derivation over secp256k1 and Ed25519
//!
//! BIP32 (secp256k1) and SLIP-0010 (Ed25519) derivation seeded from the
//! device-protected wallet seed. Address keys live at
//! `44' / 592' / 0' / index`, distinct from the transactional blinding
//! factor paths which derive directly from the root by output identifier.
//!
//! The root secret never leaves this module unwrapped: every returned key is
//! held in a [`PrivateKey`] that is wiped on drop, and callers additionally
//! zeroize keys before leaving handler scope.

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha512};
use zeroize::{Zeroize, ZeroizeOnDrop};

use k256::{
    elliptic_curve::{sec1::ToEncodedPoint, PrimeField},
    ProjectivePoint, Scalar,
};

use crate::consts::{
    BIP44_COIN_TYPE, BIP44_PURPOSE, CHAIN_CODE_SIZE, COMPRESSED_PUBLIC_KEY_SIZE,
    ED25519_PUBLIC_KEY_SIZE, IDENTIFIER_MAXIMUM_DEPTH, SEED_SIZE, X25519_PRIVATE_KEY_SIZE,
};
use crate::engine::Error;

/// Hardened derivation flag
pub const PATH_HARDEN: u32 = 1 << 31;

/// HMAC key for secp256k1 master key derivation (BIP32)
const SECP256K1_SEED_TAG: &[u8] = b"Bitcoin seed";

/// HMAC key for Ed25519 master key derivation (SLIP-0010)
const ED25519_SEED_TAG: &[u8] = b"ed25519 seed";

/// Curves supported for key derivation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Curve {
    Secp256k1,
    Ed25519,
}

/// Device-protected wallet seed
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Seed([u8; SEED_SIZE]);

impl Seed {
    /// Wrap raw seed bytes
    pub fn from_bytes(bytes: [u8; SEED_SIZE]) -> Self {
        Self(bytes)
    }

    /// Raw seed bytes
    pub fn as_bytes(&self) -> &[u8; SEED_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for Seed {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Secret scalar tied to a derivation curve, wiped on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey {
    #[zeroize(skip)]
    curve: Curve,
    bytes: [u8; 32],
}

impl PrivateKey {
    /// Wrap raw key bytes for the given curve
    pub fn from_bytes(curve: Curve, bytes: [u8; 32]) -> Self {
        Self { curve, bytes }
    }

    /// Derivation curve for this key
    pub fn curve(&self) -> Curve {
        self.curve
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }
}

/// Derivation chain code, wiped on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ChainCode([u8; CHAIN_CODE_SIZE]);

impl ChainCode {
    /// Raw chain code bytes
    pub fn as_bytes(&self) -> &[u8; CHAIN_CODE_SIZE] {
        &self.0
    }
}

/// Public key for a derived private key
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PublicKey {
    Secp256k1([u8; COMPRESSED_PUBLIC_KEY_SIZE]),
    Ed25519([u8; ED25519_PUBLIC_KEY_SIZE]),
}

impl PublicKey {
    /// Serialized public key bytes
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            PublicKey::Secp256k1(b) => &b[..],
            PublicKey::Ed25519(b) => &b[..],
        }
    }
}

/// HMAC-SHA512 of `data` under `key`
fn hmac_sha512(key: &[u8], data: &[u8]) -> Result<[u8; 64], Error> {
    let mut mac = Hmac::<Sha512>::new_from_slice(key).map_err(|_| Error::Internal)?;
    mac.update(data);

    let mut out = [0u8; 64];
    out.copy_from_slice(&mac.finalize().into_bytes());

    Ok(out)
}

/// Parse a canonical, non-zero secp256k1 scalar
fn secp256k1_scalar(bytes: &[u8; 32]) -> Option<Scalar> {
    let s = Scalar::from_repr((*bytes).into());
    match Option::<Scalar>::from(s) {
        Some(s) if !bool::from(s.is_zero()) => Some(s),
        _ => None,
    }
}

/// Derive the device root private key and chain code for a curve
///
/// The caller owns (and must wipe) the returned secrets; the seed material
/// itself is borrowed and untouched.
#[cfg_attr(feature = "noinline", inline(never))]
pub fn root_key(seed: &[u8], curve: Curve) -> Result<(PrivateKey, ChainCode), Error> {
    let tag = match curve {
        Curve::Secp256k1 => SECP256K1_SEED_TAG,
        Curve::Ed25519 => ED25519_SEED_TAG,
    };

    let mut i = hmac_sha512(tag, seed)?;

    // BIP32 requires re-hashing on the (negligible) chance the candidate
    // master key is not a valid scalar; SLIP-0010 Ed25519 keys are
    // unconstrained
    if curve == Curve::Secp256k1 {
        let mut retries = 0;
        while secp256k1_scalar(&i[..32].try_into().map_err(|_| Error::Internal)?).is_none() {
            retries += 1;
            if retries > 4 {
                i.zeroize();
                return Err(Error::Internal);
            }

            let next = hmac_sha512(tag, &i)?;
            i.zeroize();
            i = next;
        }
    }

    let mut key = [0u8; 32];
    let mut chain = [0u8; CHAIN_CODE_SIZE];
    key.copy_from_slice(&i[..32]);
    chain.copy_from_slice(&i[32..]);
    i.zeroize();

    Ok((PrivateKey { curve, bytes: key }, ChainCode(chain)))
}

/// Compute the public key for a derived private key
pub fn public_key(private_key: &PrivateKey) -> Result<PublicKey, Error> {
    match private_key.curve {
        Curve::Secp256k1 => {
            let s = secp256k1_scalar(&private_key.bytes).ok_or(Error::Internal)?;
            let point = (ProjectivePoint::GENERATOR * s).to_affine();

            let encoded = point.to_encoded_point(true);
            let mut out = [0u8; COMPRESSED_PUBLIC_KEY_SIZE];
            out.copy_from_slice(encoded.as_bytes());

            Ok(PublicKey::Secp256k1(out))
        }
        Curve::Ed25519 => {
            let signing = ed25519_dalek::SigningKey::from_bytes(&private_key.bytes);
            Ok(PublicKey::Ed25519(signing.verifying_key().to_bytes()))
        }
    }
}

/// One secp256k1 (BIP32) child derivation step, in place
fn derive_secp256k1_child(
    key: &mut [u8; 32],
    chain: &mut [u8; CHAIN_CODE_SIZE],
    index: u32,
) -> Result<(), Error> {
    let parent = secp256k1_scalar(key).ok_or(Error::Internal)?;

    // Hardened children commit to the parent private key, normal children
    // to the parent public key
    let mut data = [0u8; 37];
    if index & PATH_HARDEN != 0 {
        data[0] = 0;
        data[1..33].copy_from_slice(key);
    } else {
        let point = (ProjectivePoint::GENERATOR * parent).to_affine();
        data[..33].copy_from_slice(point.to_encoded_point(true).as_bytes());
    }
    data[33..].copy_from_slice(&index.to_be_bytes());

    let i = hmac_sha512(chain, &data);
    data.zeroize();
    let mut i = i?;

    let il: [u8; 32] = i[..32].try_into().map_err(|_| Error::Internal)?;
    let tweak = match secp256k1_scalar(&il) {
        Some(t) => t,
        None => {
            i.zeroize();
            return Err(Error::Internal);
        }
    };

    let child = tweak + parent;
    if bool::from(child.is_zero()) {
        i.zeroize();
        return Err(Error::Internal);
    }

    key.copy_from_slice(&child.to_bytes());
    chain.copy_from_slice(&i[32..]);
    i.zeroize();

    Ok(())
}

/// One Ed25519 (SLIP-0010) child derivation step, in place
///
/// Ed25519 derivation is hardened-only; the flag is forced on.
fn derive_ed25519_child(
    key: &mut [u8; 32],
    chain: &mut [u8; CHAIN_CODE_SIZE],
    index: u32,
) -> Result<(), Error> {
    let index = index | PATH_HARDEN;

    let mut data = [0u8; 37];
    data[0] = 0;
    data[1..33].copy_from_slice(key);
    data[33..].copy_from_slice(&index.to_be_bytes());

    let i = hmac_sha512(chain, &data);
    data.zeroize();
    let mut i = i?;

    key.copy_from_slice(&i[..32]);
    chain.copy_from_slice(&i[32..]);
    i.zeroize();

    Ok(())
}

/// Derive a child key from a provided parent key and chain code
///
/// Iterates the path one index at a time; paths deeper than
/// [`IDENTIFIER_MAXIMUM_DEPTH`] are rejected.
#[cfg_attr(feature = "noinline", inline(never))]
pub fn derive_child_key_from(
    parent: &PrivateKey,
    chain_code: &ChainCode,
    path: &[u32],
) -> Result<(PrivateKey, ChainCode), Error> {
    if path.len() > IDENTIFIER_MAXIMUM_DEPTH {
        return Err(Error::InvalidParameters);
    }

    let mut key = parent.bytes;
    let mut chain = chain_code.0;

    for &index in path {
        let r = match parent.curve {
            Curve::Secp256k1 => derive_secp256k1_child(&mut key, &mut chain, index),
            Curve::Ed25519 => derive_ed25519_child(&mut key, &mut chain, index),
        };

        if let Err(e) = r {
            key.zeroize();
            chain.zeroize();
            return Err(e);
        }
    }

    Ok((
        PrivateKey {
            curve: parent.curve,
            bytes: key,
        },
        ChainCode(chain),
    ))
}

/// Derive a child key from the device root for a curve
#[cfg_attr(feature = "noinline", inline(never))]
pub fn derive_child_key(
    seed: &[u8],
    curve: Curve,
    path: &[u32],
) -> Result<(PrivateKey, ChainCode), Error> {
    if path.len() > IDENTIFIER_MAXIMUM_DEPTH {
        return Err(Error::InvalidParameters);
    }

    let (mut root, mut root_chain) = root_key(seed, curve)?;
    let r = derive_child_key_from(&root, &root_chain, path);

    root.zeroize();
    root_chain.zeroize();

    r
}

/// Derive a fixed-purpose address private key
///
/// Address keys live at `44' / 592' / 0' / index'`, separate from the
/// transactional blinding factor hierarchy.
#[cfg_attr(feature = "noinline", inline(never))]
pub fn address_private_key(seed: &[u8], index: u32, curve: Curve) -> Result<PrivateKey, Error> {
    let path = [
        BIP44_PURPOSE | PATH_HARDEN,
        BIP44_COIN_TYPE | PATH_HARDEN,
        PATH_HARDEN,
        index | PATH_HARDEN,
    ];

    let (key, mut chain) = derive_child_key(seed, curve, &path)?;
    chain.zeroize();

    Ok(key)
}

/// Convert an Ed25519 private key into its X25519 key agreement form
///
/// SHA-512 expansion with standard clamping, so the resulting key agrees
/// with the Montgomery form of the Ed25519 public key.
pub fn x25519_private_key_from_ed25519_private_key(
    private_key: &PrivateKey,
) -> Result<x25519_dalek::StaticSecret, Error> {
    if private_key.curve != Curve::Ed25519 {
        return Err(Error::InvalidParameters);
    }

    let mut h = [0u8; 64];
    h.copy_from_slice(&Sha512::digest(private_key.bytes));

    let mut scalar = [0u8; X25519_PRIVATE_KEY_SIZE];
    scalar.copy_from_slice(&h[..32]);
    h.zeroize();

    scalar[0] &= 248;
    scalar[31] &= 127;
    scalar[31] |= 64;

    let secret = x25519_dalek::StaticSecret::from(scalar);
    scalar.zeroize();

    Ok(secret)
}
