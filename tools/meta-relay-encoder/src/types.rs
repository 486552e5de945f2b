use alloy_primitives::{Address, FixedBytes, U256};
use meta_relay_types::DomainParams;

/// A meta-transaction ready to hand to a relayer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedMetaTransaction {
    /// Domain the signature is bound to.
    pub domain: DomainParams,
    /// Signer, passed to `executeMetaTransaction` as `userAddress`.
    pub from: Address,
    /// Dispatcher nonce the signature was computed against.
    pub nonce: U256,
    /// ABI-encoded call to relay (selector + args).
    pub function_data: Vec<u8>,
    /// EIP-712 digest that was signed.
    pub digest: FixedBytes<32>,
    /// ECDSA signature (r||s||v), v in {27, 28}.
    pub signature: Vec<u8>,
}
