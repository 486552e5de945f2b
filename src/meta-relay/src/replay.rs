//! Replay-protection counter ledger.
//!
//! Three independent counter families:
//! - contract-wide, bumped only with the administrator capability;
//! - per signer, bumped by the signer itself;
//! - per (asset, id, signer), bumped by the signer itself.
//!
//! Counters start at zero, only ever grow by one per bump, and are never removed. Privileged
//! callers compare a value carried by a signed intent against the live counter with the
//! `verify_*` functions, which never mutate.

use std::collections::BTreeMap;

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use meta_relay_types::{
    abi::IReplayProtection::{self as abi, IReplayProtectionCalls as Call},
    AssetKey, ChangeRecord, CounterKey,
};
use tracing::debug;

use crate::{
    context::{decode_calls, effective_sender},
    errors::{RelayError, ReplayScope},
    guards::{AdminCapability, InitWindow, Ownable},
    host::{Env, Msg},
};

/// Zero-default counters keyed by `K`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Counters<K> {
    values: BTreeMap<K, U256>,
}

impl<K> Default for Counters<K> {
    fn default() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy> Counters<K> {
    pub fn get(&self, key: &K) -> U256 {
        self.values.get(key).copied().unwrap_or(U256::ZERO)
    }

    /// Returns `(previous, new)`.
    pub(crate) fn bump(&mut self, key: K) -> (U256, U256) {
        let previous = self.get(&key);
        let new = previous.saturating_add(U256::from(1u64));
        self.values.insert(key, new);
        (previous, new)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReplayProtection {
    contract: U256,
    signers: Counters<Address>,
    assets: Counters<AssetKey>,
}

impl ReplayProtection {
    pub const COMPONENT: &'static str = "ReplayProtection";

    /// Setup. The contract-wide counter is guarded by `Ownable`, so it must be set up first.
    pub fn init(&mut self, window: &mut InitWindow<'_>) -> Result<(), RelayError> {
        window.enter(Self::COMPONENT, &[Ownable::COMPONENT])
    }

    pub fn get(&self, key: &CounterKey) -> U256 {
        match key {
            CounterKey::Contract => self.contract,
            CounterKey::Signer(signer) => self.signers.get(signer),
            CounterKey::Asset(asset) => self.assets.get(asset),
        }
    }

    /// Succeeds iff `expected` equals the live counter. Never mutates.
    pub fn verify(&self, key: &CounterKey, expected: U256) -> Result<(), RelayError> {
        if self.get(key) != expected {
            return Err(RelayError::ReplayMismatch(ReplayScope::from(key.scope())));
        }
        Ok(())
    }

    // Contract scope.

    pub fn contract_index(&self) -> U256 {
        self.contract
    }

    pub fn bump_contract_index(&mut self, env: &mut Env, capability: &AdminCapability) -> U256 {
        let previous = self.contract;
        self.contract = previous.saturating_add(U256::from(1u64));
        record(env, CounterKey::Contract, previous, self.contract, capability.holder());
        self.contract
    }

    pub fn verify_contract_index(&self, expected: U256) -> Result<(), RelayError> {
        self.verify(&CounterKey::Contract, expected)
    }

    // Signer scope.

    pub fn signer_index(&self, signer: Address) -> U256 {
        self.signers.get(&signer)
    }

    /// Self-service: `caller` bumps its own counter.
    pub fn bump_signer_index(&mut self, env: &mut Env, caller: Address) -> U256 {
        self.bump_signer(env, caller, caller)
    }

    /// Administrator bumps `signer`'s counter; the administrator is recorded as the actor.
    pub fn bump_signer_index_for(
        &mut self,
        env: &mut Env,
        signer: Address,
        capability: &AdminCapability,
    ) -> U256 {
        self.bump_signer(env, signer, capability.holder())
    }

    pub fn verify_signer_index(&self, signer: Address, expected: U256) -> Result<(), RelayError> {
        self.verify(&CounterKey::Signer(signer), expected)
    }

    fn bump_signer(&mut self, env: &mut Env, signer: Address, actor: Address) -> U256 {
        let (previous, new) = self.signers.bump(signer);
        record(env, CounterKey::Signer(signer), previous, new, actor);
        new
    }

    // Asset scope.

    pub fn asset_index(&self, asset: Address, id: U256, signer: Address) -> U256 {
        self.assets.get(&AssetKey::new(asset, id, signer))
    }

    /// Self-service: `caller` bumps its own counter for `(asset, id)`.
    pub fn bump_asset_index(&mut self, env: &mut Env, asset: Address, id: U256, caller: Address) -> U256 {
        self.bump_asset(env, AssetKey::new(asset, id, caller), caller)
    }

    pub fn bump_asset_index_for(
        &mut self,
        env: &mut Env,
        key: AssetKey,
        capability: &AdminCapability,
    ) -> U256 {
        self.bump_asset(env, key, capability.holder())
    }

    pub fn verify_asset_index(&self, key: AssetKey, expected: U256) -> Result<(), RelayError> {
        self.verify(&CounterKey::Asset(key), expected)
    }

    fn bump_asset(&mut self, env: &mut Env, key: AssetKey, actor: Address) -> U256 {
        let (previous, new) = self.assets.bump(key);
        record(env, CounterKey::Asset(key), previous, new, actor);
        new
    }

    /// ABI router for `IReplayProtection`. `None` when the selector is not ours.
    ///
    /// Bumps resolve the effective sender, so signers can consume their own counters through
    /// the meta-transaction dispatcher.
    pub fn route(
        &mut self,
        ownable: &Ownable,
        env: &mut Env,
        msg: &Msg,
    ) -> Option<Result<Bytes, RelayError>> {
        decode_calls::<Call>(msg)
            .map(|decoded| decoded.and_then(|call| self.handle(ownable, env, msg, call)))
    }

    fn handle(
        &mut self,
        ownable: &Ownable,
        env: &mut Env,
        msg: &Msg,
        call: Call,
    ) -> Result<Bytes, RelayError> {
        let output = match call {
            Call::getContractIndex(_) => {
                abi::getContractIndexCall::abi_encode_returns(&(self.contract_index(),))
            }
            Call::bumpContractIndex(_) => {
                let sender = effective_sender::<abi::bumpContractIndexCall>(env, msg);
                let capability = ownable.require_owner(sender)?;
                self.bump_contract_index(env, &capability);
                Vec::new()
            }
            Call::verifyContractIndex(call) => {
                self.verify_contract_index(call.index)?;
                Vec::new()
            }
            Call::getSignerIndex(call) => {
                abi::getSignerIndexCall::abi_encode_returns(&(self.signer_index(call.signer),))
            }
            Call::bumpSignerIndex(_) => {
                let signer = effective_sender::<abi::bumpSignerIndexCall>(env, msg);
                self.bump_signer_index(env, signer);
                Vec::new()
            }
            Call::verifySignerIndex(call) => {
                self.verify_signer_index(call.signer, call.index)?;
                Vec::new()
            }
            Call::getAssetIndex(abi::getAssetIndexCall { asset, id, signer }) => {
                abi::getAssetIndexCall::abi_encode_returns(&(self.asset_index(asset, id, signer),))
            }
            Call::bumpAssetIndex(call) => {
                let signer = effective_sender::<abi::bumpAssetIndexCall>(env, msg);
                self.bump_asset_index(env, call.asset, call.id, signer);
                Vec::new()
            }
            Call::verifyAssetIndex(abi::verifyAssetIndexCall {
                asset,
                id,
                signer,
                index,
            }) => {
                self.verify_asset_index(AssetKey::new(asset, id, signer), index)?;
                Vec::new()
            }
        };
        Ok(output.into())
    }
}

fn record(env: &mut Env, key: CounterKey, previous: U256, new: U256, actor: Address) {
    debug!(?key, %previous, %new, %actor, "replay counter bumped");
    env.emit(ChangeRecord {
        key,
        previous,
        new,
        actor,
    });
}
