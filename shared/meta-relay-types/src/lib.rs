//! Shared types for the meta-relay ledger components (replay counters, meta-transactions) and
//! the off-ledger tooling that signs for them.

pub mod abi;
pub mod domain;
pub mod keys;
pub mod records;

pub use domain::{DomainParams, EIP712_DOMAIN_TYPE, META_TRANSACTION_TYPE};
pub use keys::{AssetKey, CounterKey, CounterScope};
pub use records::{ChangeRecord, Record};
