// Copyright (c) 2023-2024 The Ledger MW Project

//! Prelude for APDU types

pub use crate::{
    address::{AddressPublicKeyReq, AddressPublicKeyResp, AddressType},
    app_info::{AppFlags, AppInfoReq, AppInfoResp},
    commitment::{CommitmentReq, CommitmentResp, COMMITMENT_SIZE, IDENTIFIER_SIZE},
    frame::Request,
    proof::{
        BulletproofComponentsReq, BulletproofComponentsResp, TorTransactionSignatureReq,
        TorTransactionSignatureResp, BULLETPROOF_CHUNK_SIZE, ED25519_SIGNATURE_SIZE,
    },
    response::{will_response_overflow, Response, ResponseFlags, RESPONSE_CAPACITY},
    status::Status,
    ApduError, ApduStatic, Instruction, MW_APDU_CLA, MW_PROTO_VERSION,
};
