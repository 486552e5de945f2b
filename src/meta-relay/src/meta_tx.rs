//! Signature-verified meta-transaction dispatcher.
//!
//! Per invocation: `Received -> Verified -> Dispatched -> {Succeeded | Failed}`.
//!
//! 1. Verified: the EIP-712 digest of `MetaTransaction(nonce, from, keccak256(functionData))`
//!    under the cached domain separator must recover to the claimed signer.
//! 2. The signer's nonce is consumed *before* dispatch, so re-entering with the same signature
//!    fails verification. The consumption is part of the unit of work and rolls back with it.
//! 3. Dispatched: the contract calls itself with `functionData || signer`; the callee recovers
//!    the signer through `context::effective_sender`.
//! 4. Succeeded: the nested return bytes are passed back untouched.
//! 5. Failed: the contract is restored to its state before step 2 and the invocation fails
//!    with the nested revert payload, verbatim.

use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use alloy_sol_types::SolCall;
use meta_relay_types::{
    abi::INativeMetaTransaction::{self as abi, INativeMetaTransactionCalls as Call},
    Record, META_TRANSACTION_TYPE,
};
use tracing::{debug, warn};

use crate::{
    context::{decode_calls, seal},
    domain::DomainSeparator,
    errors::{InitFault, RelayError, ReplayScope},
    guards::InitWindow,
    host::{Dispatch, Env, Msg},
    replay::Counters,
    utils::{
        bytes::{address_word, b256_word, concat_words, u256_word},
        crypto::ecrecover_address,
    },
};

/// Struct hash of a `MetaTransaction` intent.
pub fn meta_transaction_struct_hash(nonce: U256, from: Address, function_data: &[u8]) -> B256 {
    keccak256(concat_words(&[
        &b256_word(keccak256(META_TRANSACTION_TYPE.as_bytes())),
        &u256_word(nonce),
        &address_word(from),
        &b256_word(keccak256(function_data)),
    ]))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NativeMetaTransaction {
    domain: Option<DomainSeparator>,
    nonces: Counters<Address>,
}

impl NativeMetaTransaction {
    pub const COMPONENT: &'static str = "NativeMetaTransaction";

    /// Setup: binds signatures to `(name, version)`, this chain and this contract.
    pub fn init(
        &mut self,
        window: &mut InitWindow<'_>,
        env: &Env,
        name: &str,
        version: &str,
    ) -> Result<(), RelayError> {
        window.enter(Self::COMPONENT, &[])?;
        self.domain = Some(DomainSeparator::build(
            name,
            version,
            env.contract_address,
            env.chain_id,
        ));
        Ok(())
    }

    pub fn domain(&self) -> Result<&DomainSeparator, RelayError> {
        self.domain
            .as_ref()
            .ok_or(RelayError::InitializationState(InitFault::NotInitialized(Self::COMPONENT)))
    }

    pub fn nonce(&self, user: Address) -> U256 {
        self.nonces.get(&user)
    }

    pub fn verify_nonce(&self, user: Address, expected: U256) -> Result<(), RelayError> {
        if self.nonce(user) != expected {
            return Err(RelayError::ReplayMismatch(ReplayScope::MetaTransactionNonce));
        }
        Ok(())
    }

    /// Digest `user` must sign to authorize `function_data` at `nonce`.
    pub fn intent_digest(
        &self,
        user: Address,
        nonce: U256,
        function_data: &[u8],
    ) -> Result<B256, RelayError> {
        let struct_hash = meta_transaction_struct_hash(nonce, user, function_data);
        Ok(self.domain()?.hash_typed_data(struct_hash))
    }

    /// Received -> Verified. Returns the nonce the signature was checked against.
    pub fn verify(
        &self,
        user: Address,
        function_data: &[u8],
        signature: &[u8],
    ) -> Result<U256, RelayError> {
        let nonce = self.nonce(user);
        let digest = self.intent_digest(user, nonce, function_data)?;
        let recovered = ecrecover_address(digest, signature)?;
        if recovered != user {
            warn!(%user, %recovered, %nonce, "meta-transaction signer mismatch");
            return Err(RelayError::SignerMismatch);
        }
        Ok(nonce)
    }

    fn consume_nonce(&mut self, user: Address) -> U256 {
        let (_, next) = self.nonces.bump(user);
        next
    }
}

/// A contract that embeds the dispatcher and can be re-entered by it.
///
/// `Clone` is the frame snapshot: a failed relayed call restores the contract to its state
/// before the nonce was consumed.
pub trait MetaTransactional: Dispatch + Clone {
    fn meta_transactions(&self) -> &NativeMetaTransaction;
    fn meta_transactions_mut(&mut self) -> &mut NativeMetaTransaction;
}

/// Verify, consume the nonce, re-invoke `contract` on behalf of `user`, and propagate the
/// nested result.
///
/// On failure the contract and journal are exactly as before the call, even when the caller
/// recovers from the error.
pub fn execute_meta_transaction<C: MetaTransactional>(
    contract: &mut C,
    env: &mut Env,
    relayer: Address,
    user: Address,
    function_data: Bytes,
    signature: &[u8],
) -> Result<Bytes, RelayError> {
    let nonce = contract.meta_transactions().verify(user, &function_data, signature)?;
    let frame = contract.clone();
    let checkpoint = env.checkpoint();

    contract.meta_transactions_mut().consume_nonce(user);
    debug!(%user, %relayer, %nonce, "meta-transaction verified; nonce consumed");
    env.emit(Record::MetaTransactionExecuted {
        user,
        relayer,
        function_data: function_data.clone(),
    });

    let nested = Msg::new(env.contract_address, seal(&function_data, user));
    match contract.dispatch(env, &nested) {
        Ok(output) => {
            debug!(%user, returned = output.len(), "relayed call succeeded");
            Ok(output)
        }
        Err(err) => {
            *contract = frame;
            env.rollback(checkpoint);
            warn!(%user, error = %err, "relayed call failed; frame reverted");
            Err(RelayError::dispatch_failure(&err))
        }
    }
}

/// ABI router for `INativeMetaTransaction`. Must be called by the outermost contract so the
/// relayed call re-enters its full router.
pub fn route<C: MetaTransactional>(
    contract: &mut C,
    env: &mut Env,
    msg: &Msg,
) -> Option<Result<Bytes, RelayError>> {
    decode_calls::<Call>(msg)
        .map(|decoded| decoded.and_then(|call| handle(contract, env, msg, call)))
}

fn handle<C: MetaTransactional>(
    contract: &mut C,
    env: &mut Env,
    msg: &Msg,
    call: Call,
) -> Result<Bytes, RelayError> {
    let output = match call {
        Call::executeMetaTransaction(call) => {
            let returned = execute_meta_transaction(
                contract,
                env,
                msg.sender,
                call.userAddress,
                call.functionData,
                &call.signature,
            )?;
            abi::executeMetaTransactionCall::abi_encode_returns(&(returned,))
        }
        Call::getNonce(call) => {
            let nonce = contract.meta_transactions().nonce(call.user);
            abi::getNonceCall::abi_encode_returns(&(nonce,))
        }
        Call::verifyNonce(call) => {
            contract.meta_transactions().verify_nonce(call.user, call.nonce)?;
            Vec::new()
        }
        Call::getDomainSeparator(_) => {
            let domain = contract.meta_transactions().domain()?;
            abi::getDomainSeparatorCall::abi_encode_returns(&(domain.separator(),))
        }
        Call::getDomainNameHash(_) => {
            let domain = contract.meta_transactions().domain()?;
            abi::getDomainNameHashCall::abi_encode_returns(&(domain.name_hash(),))
        }
        Call::getDomainVersionHash(_) => {
            let domain = contract.meta_transactions().domain()?;
            abi::getDomainVersionHashCall::abi_encode_returns(&(domain.version_hash(),))
        }
        Call::getChainId(_) => {
            abi::getChainIdCall::abi_encode_returns(&(U256::from(env.chain_id),))
        }
    };
    Ok(output.into())
}
