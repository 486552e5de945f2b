//! Error taxonomy shared by every component.
//!
//! Every error aborts the enclosing unit of work. `revert_data` gives the bytes a caller
//! observes on the wire; `Display` gives the human-readable `<Component>#<operation>: <CODE>`.

use core::fmt;

use alloy_primitives::Bytes;
use alloy_sol_types::{Revert, SolError};
use meta_relay_types::CounterScope;
use thiserror::Error;

/// Counter family a replay check failed against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplayScope {
    Contract,
    Signer,
    Asset,
    MetaTransactionNonce,
}

impl From<CounterScope> for ReplayScope {
    fn from(scope: CounterScope) -> Self {
        match scope {
            CounterScope::Contract => ReplayScope::Contract,
            CounterScope::Signer => ReplayScope::Signer,
            CounterScope::Asset => ReplayScope::Asset,
        }
    }
}

impl fmt::Display for ReplayScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ReplayScope::Contract => "ContractIndexVerifiable#_verifyContractIndex: CONTRACT_INDEX_MISMATCH",
            ReplayScope::Signer => "SignerIndexVerifiable#_verifySignerIndex: SIGNER_INDEX_MISMATCH",
            ReplayScope::Asset => "AssetIndexVerifiable#_verifyAssetIndex: ASSET_INDEX_MISMATCH",
            ReplayScope::MetaTransactionNonce => "NativeMetaTransaction#verifyNonce: NONCE_MISMATCH",
        };
        f.write_str(msg)
    }
}

/// Why a signature could not be parsed or recovered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SignatureFault {
    #[error("SignatureVerifier#recover: INVALID_SIGNATURE_LENGTH ({0} bytes)")]
    InvalidLength(usize),
    #[error("SignatureVerifier#recover: INVALID_SIGNATURE_V ({0})")]
    InvalidRecoveryId(u8),
    #[error("SignatureVerifier#recover: INVALID_SIGNATURE_S")]
    InvalidS,
    #[error("SignatureVerifier#recover: MALFORMED_SIGNATURE")]
    Malformed,
    #[error("SignatureVerifier#recover: UNRECOVERABLE_SIGNATURE")]
    Unrecoverable,
}

/// Lifecycle violations raised by the initialization guard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InitFault {
    #[error("Initializable: contract is already initialized")]
    AlreadyInitialized,
    #[error("Initializable: contract is already initializing")]
    AlreadyInitializing,
    #[error("Initializable: contract is not initializing")]
    NotInitializing,
    #[error("Initializable: contract is not initialized ({0})")]
    NotInitialized(&'static str),
    #[error("Initializable: {0} was already set up")]
    AlreadySetUp(&'static str),
    #[error("Initializable: {component} requires {dependency} to be set up first")]
    MissingDependency {
        component: &'static str,
        dependency: &'static str,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Caller lacks the administrative capability.
    #[error("Ownable: caller is not the owner")]
    Authorization,

    #[error("Ownable: new owner is the zero address")]
    ZeroOwner,

    #[error("{0}")]
    ReplayMismatch(ReplayScope),

    #[error("NativeMetaTransaction#executeMetaTransaction: SIGNER_AND_SIGNATURE_DO_NOT_MATCH")]
    SignerMismatch,

    #[error(transparent)]
    InvalidSignatureFormat(#[from] SignatureFault),

    #[error(transparent)]
    InitializationState(#[from] InitFault),

    /// The relayed call aborted; `data` is its revert payload, untouched.
    #[error("{}", describe_revert(.data))]
    DispatchFailure { data: Bytes },

    /// Application-level revert raised by a dispatch target.
    #[error("{}", describe_revert(.data))]
    Revert { data: Bytes },

    #[error("unknown function selector 0x{}", hex::encode(.0))]
    UnknownSelector([u8; 4]),

    #[error("malformed call arguments: {0}")]
    AbiDecode(String),
}

impl RelayError {
    /// Revert with a standard `Error(string)` reason.
    pub fn revert(reason: impl Into<String>) -> Self {
        let data = Revert {
            reason: reason.into(),
        }
        .abi_encode();
        RelayError::Revert { data: data.into() }
    }

    /// Revert with an empty payload.
    pub fn revert_silently() -> Self {
        RelayError::Revert { data: Bytes::new() }
    }

    /// Wrap the failure of a nested call, keeping its payload byte for byte.
    pub fn dispatch_failure(nested: &RelayError) -> Self {
        RelayError::DispatchFailure {
            data: nested.revert_data(),
        }
    }

    /// Bytes a caller of the failed unit of work observes.
    pub fn revert_data(&self) -> Bytes {
        match self {
            RelayError::DispatchFailure { data } | RelayError::Revert { data } => data.clone(),
            RelayError::UnknownSelector(_) | RelayError::AbiDecode(_) => Bytes::new(),
            other => Revert {
                reason: other.to_string(),
            }
            .abi_encode()
            .into(),
        }
    }

    /// Human-readable reason carried on the wire, if any.
    ///
    /// `None` means the failure carries no reason string at all.
    pub fn reason(&self) -> Option<String> {
        decode_reason(&self.revert_data())
    }
}

fn decode_reason(data: &[u8]) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    Revert::abi_decode(data, true).ok().map(|r| r.reason)
}

fn describe_revert(data: &Bytes) -> String {
    if data.is_empty() {
        return "call reverted without a reason".to_string();
    }
    match decode_reason(data) {
        Some(reason) => reason,
        None => format!("call reverted with custom data 0x{}", hex::encode(data)),
    }
}
