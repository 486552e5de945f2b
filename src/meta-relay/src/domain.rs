//! EIP-712 domain separator.
//!
//! Built once during setup from `(name, version, chainId, verifyingContract)` and cached; every
//! signature verification reuses the cached value.

use alloy_primitives::{keccak256, Address, B256};
use meta_relay_types::{DomainParams, EIP712_DOMAIN_TYPE};

use crate::utils::bytes::{address_word, b256_word, concat_words, u64_word};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainSeparator {
    name_hash: B256,
    version_hash: B256,
    chain_id: u64,
    verifying_contract: Address,
    separator: B256,
}

impl DomainSeparator {
    pub fn build(name: &str, version: &str, verifying_contract: Address, chain_id: u64) -> Self {
        let name_hash = keccak256(name.as_bytes());
        let version_hash = keccak256(version.as_bytes());

        let buf = concat_words(&[
            &b256_word(keccak256(EIP712_DOMAIN_TYPE.as_bytes())),
            &b256_word(name_hash),
            &b256_word(version_hash),
            &u64_word(chain_id),
            &address_word(verifying_contract),
        ]);

        Self {
            name_hash,
            version_hash,
            chain_id,
            verifying_contract,
            separator: keccak256(buf),
        }
    }

    pub fn from_params(params: &DomainParams) -> Self {
        Self::build(
            &params.name,
            &params.version,
            params.verifying_contract,
            params.chain_id,
        )
    }

    pub fn separator(&self) -> B256 {
        self.separator
    }

    pub fn name_hash(&self) -> B256 {
        self.name_hash
    }

    pub fn version_hash(&self) -> B256 {
        self.version_hash
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn verifying_contract(&self) -> Address {
        self.verifying_contract
    }

    /// Final EIP-712 digest: keccak256("\x19\x01" || domainSeparator || structHash).
    pub fn hash_typed_data(&self, struct_hash: B256) -> B256 {
        let mut buf = Vec::with_capacity(2 + 32 + 32);
        buf.extend_from_slice(b"\x19\x01");
        buf.extend_from_slice(self.separator.as_slice());
        buf.extend_from_slice(struct_hash.as_slice());
        keccak256(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::U256;
    use alloy_sol_types::Eip712Domain;

    #[test]
    fn matches_alloy_eip712_domain() {
        let contract = Address::repeat_byte(0x5a);
        let ours = DomainSeparator::build("DummyNativeMetaTransaction", "1", contract, 31337);
        let reference = Eip712Domain::new(
            Some("DummyNativeMetaTransaction".into()),
            Some("1".into()),
            Some(U256::from(31337u64)),
            Some(contract),
            None,
        );
        assert_eq!(ours.separator(), reference.separator());
    }

    #[test]
    fn binds_chain_and_contract() {
        let a = DomainSeparator::build("n", "1", Address::repeat_byte(1), 1);
        let b = DomainSeparator::build("n", "1", Address::repeat_byte(1), 2);
        let c = DomainSeparator::build("n", "1", Address::repeat_byte(2), 1);
        assert_ne!(a.separator(), b.separator());
        assert_ne!(a.separator(), c.separator());
        assert_eq!(a.name_hash(), b.name_hash());
    }

    #[test]
    fn exposes_constituent_hashes() {
        let params = DomainParams::new("Name", "2", 5, Address::repeat_byte(9));
        let domain = DomainSeparator::from_params(&params);
        assert_eq!(domain.name_hash(), keccak256(b"Name"));
        assert_eq!(domain.version_hash(), keccak256(b"2"));
        assert_eq!(domain.chain_id(), 5);
        assert_eq!(domain.verifying_contract(), Address::repeat_byte(9));
    }
}
