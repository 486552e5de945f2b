//! Signature verifier.
//!
//! Recovers the signer of a 32-byte structured hash from a 65-byte `r || s || v` signature.
//! Pure: never reads or writes ledger state.

use alloy_primitives::{keccak256, Address, B256};
use k256::{
    ecdsa::{RecoveryId, Signature, VerifyingKey},
    elliptic_curve::sec1::ToEncodedPoint,
    AffinePoint,
};

use crate::errors::SignatureFault;

pub const SIGNATURE_LENGTH: usize = 65;

/// Recover the address that produced `signature` over `digest`.
///
/// Notes:
/// - `v` may be given as 27/28 or as the raw parity 0/1; anything else is a format error.
/// - High-`s` signatures are rejected so a signature has exactly one valid encoding.
pub fn ecrecover_address(digest: B256, signature: &[u8]) -> Result<Address, SignatureFault> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(SignatureFault::InvalidLength(signature.len()));
    }

    let v = signature[64];
    let parity = match v {
        27 | 28 => v - 27,
        0 | 1 => v,
        _ => return Err(SignatureFault::InvalidRecoveryId(v)),
    };
    let recovery_id = RecoveryId::from_byte(parity).ok_or(SignatureFault::InvalidRecoveryId(v))?;

    let sig = Signature::from_slice(&signature[..64]).map_err(|_| SignatureFault::Malformed)?;
    if sig.normalize_s().is_some() {
        return Err(SignatureFault::InvalidS);
    }

    let key = VerifyingKey::recover_from_prehash(digest.as_slice(), &sig, recovery_id)
        .map_err(|_| SignatureFault::Unrecoverable)?;
    Ok(public_key_address(&key))
}

/// Ethereum address of a secp256k1 public key: low 20 bytes of keccak256(x || y).
pub fn public_key_address(key: &VerifyingKey) -> Address {
    let affine: &AffinePoint = key.as_ref();
    let encoded = affine.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}
