//! Delegated-execution authentication for an atomic-transaction ledger.
//!
//! Design notes:
//! - `replay` holds three independent replay-protection counter families (contract, signer,
//!   asset) with get/bump/verify per family.
//! - `meta_tx` verifies an EIP-712 signed intent, consumes a dedicated nonce and re-invokes the
//!   contract with the authenticated signer sealed onto the calldata.
//! - `context` is the single trust predicate that decides whether that sealed signer is the
//!   effective sender of a call.
//! - `host` runs each external invocation as one atomic unit of work.

pub mod context;
pub mod domain;
pub mod errors;
pub mod guards;
pub mod host;
pub mod meta_tx;
pub mod relay_auth;
pub mod replay;
pub mod utils;

pub use context::{decode_calls, effective_sender};
pub use domain::DomainSeparator;
pub use errors::{InitFault, RelayError, ReplayScope, SignatureFault};
pub use host::{Dispatch, Env, Ledger, Msg, Receipt};
pub use meta_tx::{execute_meta_transaction, MetaTransactional, NativeMetaTransaction};
pub use relay_auth::RelayAuth;
pub use replay::ReplayProtection;
