// Copyright (c) 2023-2024 The Ledger MW Project

//! Protocol and curve constants

use const_decoder::Decoder;

/// Seed size in bytes
pub const SEED_SIZE: usize = 32;

/// Chain code size in bytes
pub const CHAIN_CODE_SIZE: usize = 32;

/// Blinding factor size in bytes
pub const BLINDING_FACTOR_SIZE: usize = 32;

/// Rewind / private nonce size in bytes
pub const NONCE_SIZE: usize = 32;

/// Serialized Pedersen commitment size in bytes
pub const COMMITMENT_SIZE: usize = 33;

/// Compressed secp256k1 public key size in bytes
pub const COMPRESSED_PUBLIC_KEY_SIZE: usize = 33;

/// Uncompressed secp256k1 public key size in bytes
pub const UNCOMPRESSED_PUBLIC_KEY_SIZE: usize = 65;

/// Public key prefix size in bytes
pub const PUBLIC_KEY_PREFIX_SIZE: usize = 1;

/// Ed25519 public key size in bytes
pub const ED25519_PUBLIC_KEY_SIZE: usize = 32;

/// Ed25519 signature size in bytes
pub const ED25519_SIGNATURE_SIZE: usize = 64;

/// X25519 private key size in bytes
pub const X25519_PRIVATE_KEY_SIZE: usize = 32;

/// Maximum identifier derivation depth
pub const IDENTIFIER_MAXIMUM_DEPTH: usize = 4;

/// Serialized identifier size in bytes (depth byte + four path indices)
pub const IDENTIFIER_SIZE: usize = 1 + IDENTIFIER_MAXIMUM_DEPTH * 4;

/// Single-signer compact signature size in bytes
pub const SINGLE_SIGNER_COMPACT_SIGNATURE_SIZE: usize = 64;

/// Single-signer message size in bytes
pub const SINGLE_SIGNER_MESSAGE_SIZE: usize = 32;

/// Maximum bulletproof size in bytes
pub const BULLETPROOF_SIZE: usize = 675;

/// Proof message size in bytes
pub const PROOF_MESSAGE_SIZE: usize = 20;

/// Offset of the switch type byte within a proof message
pub const PROOF_MESSAGE_SWITCH_TYPE_INDEX: usize = 2;

/// Offset of the identifier within a proof message
pub const PROOF_MESSAGE_IDENTIFIER_INDEX: usize = 3;

/// AES-256-GCM authentication tag size in bytes
pub const ENCRYPTION_TAG_SIZE: usize = 16;

/// AES-256-GCM nonce size in bytes
pub const ENCRYPTION_NONCE_SIZE: usize = 12;

/// Even Pedersen commitment prefix
pub const EVEN_COMMITMENT_PREFIX: u8 = 0x08;

/// Odd Pedersen commitment prefix
pub const ODD_COMMITMENT_PREFIX: u8 = 0x09;

/// Even compressed public key prefix
pub const EVEN_COMPRESSED_PUBLIC_KEY_PREFIX: u8 = 0x02;

/// Odd compressed public key prefix
pub const ODD_COMPRESSED_PUBLIC_KEY_PREFIX: u8 = 0x03;

/// BIP-0044 purpose index
pub const BIP44_PURPOSE: u32 = 44;

/// Registered coin type (Grin)
pub const BIP44_COIN_TYPE: u32 = 592;

/// Tor address private key index
pub const TOR_ADDRESS_PRIVATE_KEY_INDEX: u32 = 0;

/// Value generator `H`, uncompressed
///
/// Second Pedersen generator from libsecp256k1-zkp, chosen with an
/// unknowable discrete log relative to `G`.
pub const GENERATOR_H: [u8; UNCOMPRESSED_PUBLIC_KEY_SIZE] = Decoder::Hex.decode(
    b"0450929b74c1a04954b78b4b6035e97a5e078a5a0f28ec96d547bfee9ace803ac0\
      31d3c6863973926e049e637cb1b5f40a36dac28af1766968c30c2313f3a38904",
);

/// Switch commitment generator `J`, uncompressed
///
/// Third generator from libsecp256k1-zkp, used for the switch commitment
/// blinding factor tweak.
pub const GENERATOR_J: [u8; UNCOMPRESSED_PUBLIC_KEY_SIZE] = Decoder::Hex.decode(
    b"04b860f56795fc03f3c21685383d1b5a2f2954f49b7e398b8d2a0193933621155f\
      a43f09d32caa8f53423f427403a56a3165a5a69a74cf56fc5901a2dca6c5c43a",
);

static_assertions::const_assert_eq!(IDENTIFIER_SIZE, 17);
static_assertions::const_assert_eq!(
    PROOF_MESSAGE_SIZE,
    PROOF_MESSAGE_IDENTIFIER_INDEX + IDENTIFIER_SIZE
);
