//! Effective-sender extraction and call decoding.
//!
//! A relayed call arrives as `selector || fixed args || signer`, sent by this contract to
//! itself. The trailing signer is trusted only when the immediate caller is the contract's own
//! address (the dispatcher) and the calldata length is exactly the call's fixed encoding plus
//! one address. Anything else is a direct call and the immediate caller is the sender.

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{SolCall, SolInterface, SolType};

use crate::{
    errors::RelayError,
    host::{Env, Msg},
    utils::bytes::split_trailing_address,
};

/// Static ABI size of `C`'s arguments, or `None` when they contain dynamic types.
pub fn fixed_args_len<C: SolCall>() -> Option<usize> {
    <C::Parameters<'static> as SolType>::ENCODED_SIZE
}

/// Decode `msg` with the `sol!`-generated call enum `I`.
///
/// `None` when the selector belongs to none of `I`'s functions. A sealed signer suffix is
/// left undecoded; resolve it with `effective_sender`.
pub fn decode_calls<I: SolInterface>(msg: &Msg) -> Option<Result<I, RelayError>> {
    if msg.data.len() < 4 || !I::valid_selector(msg.selector()) {
        return None;
    }
    Some(I::abi_decode(&msg.data, false).map_err(|e| RelayError::AbiDecode(e.to_string())))
}

/// Calldata the dispatcher sends to itself on behalf of `signer`.
pub(crate) fn seal(function_data: &[u8], signer: Address) -> Bytes {
    let mut data = Vec::with_capacity(function_data.len() + 20);
    data.extend_from_slice(function_data);
    data.extend_from_slice(signer.as_slice());
    data.into()
}

/// Principal `msg` executes for when it targets function `C`.
pub fn effective_sender<C: SolCall>(env: &Env, msg: &Msg) -> Address {
    relayed_signer::<C>(env, msg).unwrap_or(msg.sender)
}

fn relayed_signer<C: SolCall>(env: &Env, msg: &Msg) -> Option<Address> {
    if msg.sender != env.contract_address {
        return None;
    }
    let expected = 4 + fixed_args_len::<C>()?;
    split_trailing_address(&msg.data, expected).map(|(_, signer)| signer)
}
