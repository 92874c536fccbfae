// Copyright (c) 2023-2024 The Ledger MW Project

//! MimbleWimble hardware wallet core
//!
//! This provides a hardware-independent [Engine][engine::Engine] answering the
//! discrete request / response commands a host issues to a MimbleWimble
//! (Grin) wallet device, see [ledger_mw_apdu] for APDU objects and wire
//! encodings.
//!
//! Every command follows the same four stages: parse the request view,
//! validate its shape, drive the crypto primitives over device secrets, and
//! append the result to the shared response buffer. There is no partial
//! success: a failed handler appends nothing and surfaces exactly one
//! [`Error`][engine::Error] class, and every secret derived during a command
//! is wiped before the handler returns on _every_ exit path.
//!
//! Platform integration happens through the [`Driver`][engine::Driver]
//! trait, which carries the device-protected wallet seed and the native
//! bulletproof prover; all remaining curve and hash operations are backed by
//! vetted software implementations.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod consts;
pub mod engine;
pub mod helpers;
pub mod keys;
