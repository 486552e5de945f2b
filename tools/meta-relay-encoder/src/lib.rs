//! Off-ledger counterpart of the meta-transaction dispatcher.
//!
//! Computes the same EIP-712 digest the ledger verifies (with an independent Keccak
//! implementation) and signs it with a secp256k1 key.

pub mod encoder;
pub mod types;


pub use encoder::{
    domain_separator, meta_transaction_digest, relayed_calldata, sign_digest,
    sign_meta_transaction, signer_address,
};
pub use types::SignedMetaTransaction;
