// Copyright (c) 2023-2024 The Ledger MW Project

use ledger_mw_apdu::Status;

/// Engine error type
///
/// Every handler failure collapses to exactly one of these classes, which
/// map one-to-one onto wire status words via [`Error::status`].
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
pub enum Error {
    #[cfg_attr(feature = "thiserror", error("unknown command class"))]
    UnknownClass,

    #[cfg_attr(feature = "thiserror", error("unknown instruction"))]
    UnknownInstruction,

    #[cfg_attr(feature = "thiserror", error("device locked"))]
    DeviceLocked,

    #[cfg_attr(feature = "thiserror", error("malformed request"))]
    MalformedRequest,

    #[cfg_attr(feature = "thiserror", error("rejected by user"))]
    UserRejected,

    #[cfg_attr(feature = "thiserror", error("internal error"))]
    Internal,

    #[cfg_attr(feature = "thiserror", error("invalid parameters"))]
    InvalidParameters,

    #[cfg_attr(feature = "thiserror", error("invalid state"))]
    InvalidState,

    #[cfg_attr(feature = "thiserror", error("invalid length"))]
    InvalidLength,
}

impl Error {
    /// Map an engine error to its response status word
    pub fn status(&self) -> Status {
        match self {
            Error::UnknownClass => Status::UnknownClass,
            Error::UnknownInstruction => Status::UnknownInstruction,
            Error::DeviceLocked => Status::DeviceLocked,
            Error::MalformedRequest => Status::MalformedRequest,
            Error::UserRejected => Status::UserRejected,
            Error::Internal => Status::InternalError,
            Error::InvalidParameters => Status::InvalidParameters,
            Error::InvalidState => Status::InvalidState,
            Error::InvalidLength => Status::WrongLength,
        }
    }
}

impl From<ledger_mw_apdu::ApduError> for Error {
    fn from(e: ledger_mw_apdu::ApduError) -> Self {
        match e {
            ledger_mw_apdu::ApduError::InvalidLength => Error::InvalidLength,
            _ => Error::MalformedRequest,
        }
    }
}
