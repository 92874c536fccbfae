// Copyright (c) 2023-2024 The Ledger MW Project

//! Command engine
//!
//! [`Engine`] owns the app lock state and dispatches parsed request frames
//! to one handler per instruction. Handlers follow a fixed four-stage
//! shape: parse the request view, validate its fields, compute over device
//! secrets, then append exactly one response object to the shared response
//! buffer. A failed handler appends nothing.

use encdec::Encode;

use ledger_mw_apdu::{
    app_info::{AppFlags, AppInfoResp},
    ApduError, Instruction, Request, Response, MW_APDU_CLA, MW_PROTO_VERSION, RESPONSE_CAPACITY,
};

use crate::consts::{NONCE_SIZE, PROOF_MESSAGE_SIZE};
use crate::keys::Seed;

mod error;
pub use error::Error;

pub mod mw;
use mw::BlindingFactor;

mod address;
mod commitment;
mod tor_proof;

/// Application name reported by the info command
pub const APP_NAME: &str = "MimbleWimble";

/// Application version reported by the info command
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Platform driver abstraction
///
/// Binds the engine to device capabilities that cannot be expressed in
/// portable code, the protected wallet seed and the native bulletproof
/// prover. Everything else runs on software implementations.
pub trait Driver {
    /// Fetch the device-protected wallet seed
    fn wallet_seed(&self) -> Seed;

    /// Build a range proof for a committed value
    ///
    /// Writes the proof to `out` and returns its length. The proof must be
    /// deterministic for fixed inputs so chunked retrieval can recompute
    /// it per request.
    fn range_proof(
        &self,
        value: u64,
        blinding: &BlindingFactor,
        rewind_nonce: &[u8; NONCE_SIZE],
        private_nonce: &[u8; NONCE_SIZE],
        proof_message: &[u8; PROOF_MESSAGE_SIZE],
        out: &mut [u8],
    ) -> Result<usize, Error>;
}

/// Blanket [`Driver`] impl for references to drivers
impl<T: Driver> Driver for &T {
    fn wallet_seed(&self) -> Seed {
        <T as Driver>::wallet_seed(self)
    }

    fn range_proof(
        &self,
        value: u64,
        blinding: &BlindingFactor,
        rewind_nonce: &[u8; NONCE_SIZE],
        private_nonce: &[u8; NONCE_SIZE],
        proof_message: &[u8; PROOF_MESSAGE_SIZE],
        out: &mut [u8],
    ) -> Result<usize, Error> {
        <T as Driver>::range_proof(
            self,
            value,
            blinding,
            rewind_nonce,
            private_nonce,
            proof_message,
            out,
        )
    }
}

/// MimbleWimble command engine
pub struct Engine<DRV: Driver> {
    drv: DRV,
    unlocked: bool,
}

impl<DRV: Driver> Engine<DRV> {
    /// Create a new engine instance with the provided driver
    pub fn new(drv: DRV) -> Self {
        Self {
            drv,
            unlocked: false,
        }
    }

    /// Unlock the engine for key-bearing commands
    pub fn unlock(&mut self) {
        self.unlocked = true;
    }

    /// Lock the engine
    pub fn lock(&mut self) {
        self.unlocked = false;
    }

    /// Engine lock state
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Driver accessor, used by handlers for seed and prover access
    pub(crate) fn driver(&self) -> &DRV {
        &self.drv
    }

    /// Require the engine unlocked before touching key material
    pub(crate) fn require_unlocked(&self) -> Result<(), Error> {
        match self.unlocked {
            true => Ok(()),
            false => Err(Error::DeviceLocked),
        }
    }

    /// Handle one raw command frame, appending the response on success
    ///
    /// Failures leave the response buffer untouched, there is no partial
    /// success. Re-issuing a frame yields an identical response.
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn handle(&mut self, frame: &[u8], response: &mut Response) -> Result<(), Error> {
        let req = Request::parse(frame).map_err(|_| Error::MalformedRequest)?;

        if req.class != MW_APDU_CLA {
            return Err(Error::UnknownClass);
        }

        let instruction =
            Instruction::try_from(req.instruction).map_err(|_| Error::UnknownInstruction)?;

        #[cfg(feature = "log")]
        log::debug!("handling instruction: {:?}", instruction);

        let r = match instruction {
            Instruction::GetAppInfo => self.app_info(&req, response),
            Instruction::GetAddressPublicKey => self.get_address_public_key(&req, response),
            Instruction::GetCommitment => self.get_commitment(&req, response),
            Instruction::GetBulletproofComponents => {
                self.get_bulletproof_components(&req, response)
            }
            Instruction::GetTorTransactionSignature => {
                self.get_tor_transaction_signature(&req, response)
            }
        };

        #[cfg(feature = "log")]
        if let Err(e) = &r {
            log::error!("instruction {:?} failed: {:?}", instruction, e);
        }

        r
    }

    /// Fetch application information, available locked or unlocked
    fn app_info(&mut self, _req: &Request, response: &mut Response) -> Result<(), Error> {
        let mut flags = AppFlags::HAS_BULLETPROOF;
        if self.unlocked {
            flags |= AppFlags::UNLOCKED;
        }

        let info = AppInfoResp::new(MW_PROTO_VERSION, APP_NAME, APP_VERSION, flags);

        append_apdu(response, &info)
    }
}

/// Append an encoded APDU object to the response buffer
///
/// Pre-checks the object length against the remaining capacity so a
/// failure never leaves a partial write behind.
pub(crate) fn append_apdu<T: Encode<Error = ApduError>>(
    response: &mut Response,
    apdu: &T,
) -> Result<(), Error> {
    let n = apdu.encode_len().map_err(Error::from)?;

    if ledger_mw_apdu::response::will_response_overflow(response.len(), n) {
        return Err(Error::InvalidLength);
    }

    let mut buff = [0u8; RESPONSE_CAPACITY];
    let n = apdu.encode(&mut buff).map_err(Error::from)?;

    response.append(&buff[..n]).map_err(|_| Error::InvalidLength)
}
