use alloy_primitives::{Address, FixedBytes, U256};
use k256::{
    ecdsa::{RecoveryId, SigningKey},
    elliptic_curve::sec1::ToEncodedPoint,
    AffinePoint,
};
use meta_relay_types::{DomainParams, EIP712_DOMAIN_TYPE, META_TRANSACTION_TYPE};
use sha3::{Digest, Keccak256};

use crate::types::SignedMetaTransaction;

fn keccak256_bytes(bytes: &[u8]) -> FixedBytes<32> {
    let mut h = Keccak256::new();
    h.update(bytes);
    let out = h.finalize();
    let mut b = [0u8; 32];
    b.copy_from_slice(out.as_slice());
    FixedBytes(b)
}

fn address_padded(address: Address) -> [u8; 32] {
    let mut padded = [0u8; 32];
    padded[12..32].copy_from_slice(address.as_slice());
    padded
}

/// EIP-712 domain separator (must match the ledger-side `DomainSeparator`).
pub fn domain_separator(domain: &DomainParams) -> FixedBytes<32> {
    let mut domain_buf = Vec::with_capacity(32 * 5);
    domain_buf.extend_from_slice(keccak256_bytes(EIP712_DOMAIN_TYPE.as_bytes()).as_slice());
    domain_buf.extend_from_slice(keccak256_bytes(domain.name.as_bytes()).as_slice());
    domain_buf.extend_from_slice(keccak256_bytes(domain.version.as_bytes()).as_slice());
    domain_buf.extend_from_slice(&U256::from(domain.chain_id).to_be_bytes::<32>());
    domain_buf.extend_from_slice(&address_padded(domain.verifying_contract));
    keccak256_bytes(&domain_buf)
}

/// Digest a signer must sign to authorize `function_data` at `nonce`.
pub fn meta_transaction_digest(
    domain: &DomainParams,
    nonce: U256,
    from: Address,
    function_data: &[u8],
) -> FixedBytes<32> {
    let mut struct_buf = Vec::with_capacity(32 * 4);
    struct_buf.extend_from_slice(keccak256_bytes(META_TRANSACTION_TYPE.as_bytes()).as_slice());
    struct_buf.extend_from_slice(&nonce.to_be_bytes::<32>());
    struct_buf.extend_from_slice(&address_padded(from));
    struct_buf.extend_from_slice(keccak256_bytes(function_data).as_slice());
    let struct_hash = keccak256_bytes(&struct_buf);

    // keccak256("\x19\x01" || domainSeparator || structHash)
    let mut final_buf = Vec::with_capacity(2 + 32 + 32);
    final_buf.extend_from_slice(b"\x19\x01");
    final_buf.extend_from_slice(domain_separator(domain).as_slice());
    final_buf.extend_from_slice(struct_hash.as_slice());
    keccak256_bytes(&final_buf)
}

/// Sign a prehashed digest, producing a low-s `r || s || v` signature with v in {27, 28}.
pub fn sign_digest(
    digest: FixedBytes<32>,
    signing_key: &SigningKey,
) -> Result<[u8; 65], k256::ecdsa::Error> {
    let (mut signature, mut recovery_id) = signing_key.sign_prehash_recoverable(digest.as_slice())?;
    if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced());
    }

    let mut out = [0u8; 65];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64] = 27 + recovery_id.to_byte();
    Ok(out)
}

/// Sign `function_data` as a meta-transaction of `signing_key`'s address at `nonce`.
pub fn sign_meta_transaction(
    domain: &DomainParams,
    nonce: U256,
    function_data: &[u8],
    signing_key: &SigningKey,
) -> Result<SignedMetaTransaction, k256::ecdsa::Error> {
    let from = signer_address(signing_key);
    let digest = meta_transaction_digest(domain, nonce, from, function_data);
    let signature = sign_digest(digest, signing_key)?;
    Ok(SignedMetaTransaction {
        domain: domain.clone(),
        from,
        nonce,
        function_data: function_data.to_vec(),
        digest,
        signature: signature.to_vec(),
    })
}

/// Ethereum address of the key.
pub fn signer_address(signing_key: &SigningKey) -> Address {
    let affine: &AffinePoint = signing_key.verifying_key().as_ref();
    let encoded = affine.to_encoded_point(false);
    let hash = keccak256_bytes(&encoded.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Calldata the dispatcher sends to itself when relaying `function_data` for `signer`.
pub fn relayed_calldata(function_data: &[u8], signer: Address) -> Vec<u8> {
    let mut buf = Vec::with_capacity(function_data.len() + 20);
    buf.extend_from_slice(function_data);
    buf.extend_from_slice(signer.as_slice());
    buf
}
