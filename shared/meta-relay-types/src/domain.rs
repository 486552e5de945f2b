use alloy_primitives::Address;

/// EIP-712 domain type string.
pub const EIP712_DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

/// EIP-712 type string of the signed meta-transaction intent.
///
/// Off-ledger signers hash this independently; changing it invalidates every outstanding signature.
pub const META_TRANSACTION_TYPE: &str = "MetaTransaction(uint256 nonce,address from,bytes functionData)";

/// Parameters binding signatures to one deployment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DomainParams {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl DomainParams {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id,
            verifying_contract,
        }
    }
}
