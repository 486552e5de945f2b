//! Deployable composition of the guards, the replay-protection ledger and the
//! meta-transaction dispatcher.
//!
//! Integrators embed `RelayAuth`, route their own selectors first, then call
//! `meta_tx::route(self, ..)` and `RelayAuth::route`, and implement `MetaTransactional` by
//! delegation so relayed calls re-enter the integrator's full router.

use alloy_primitives::{Address, Bytes};
use meta_relay_types::abi::IInitializable::{self, IInitializableCalls};
use tracing::info;

use crate::{
    context::{decode_calls, effective_sender},
    errors::RelayError,
    guards::{InitWindow, Lifecycle, Ownable},
    host::{Dispatch, Env, Msg},
    meta_tx::{self, MetaTransactional, NativeMetaTransaction},
    replay::ReplayProtection,
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelayAuth {
    lifecycle: Lifecycle,
    ownable: Ownable,
    replay: ReplayProtection,
    meta_tx: NativeMetaTransaction,
}

impl RelayAuth {
    /// One-shot setup. Build order: `Ownable -> ReplayProtection -> NativeMetaTransaction`.
    pub fn initialize(
        &mut self,
        env: &mut Env,
        deployer: Address,
        name: &str,
        version: &str,
    ) -> Result<(), RelayError> {
        let mut window = InitWindow::open(&mut self.lifecycle)?;
        self.ownable.init(&mut window, env, deployer)?;
        self.replay.init(&mut window)?;
        self.meta_tx.init(&mut window, env, name, version)?;
        window.close(env);
        info!(%deployer, name, version, contract = %env.contract_address, "relay auth initialized");
        Ok(())
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn ownable(&self) -> &Ownable {
        &self.ownable
    }

    pub fn replay(&self) -> &ReplayProtection {
        &self.replay
    }

    /// Mutable ledger access paired with the guard, for privileged composed operations.
    pub fn replay_mut(&mut self) -> (&Ownable, &mut ReplayProtection) {
        (&self.ownable, &mut self.replay)
    }

    pub fn meta_transactions(&self) -> &NativeMetaTransaction {
        &self.meta_tx
    }

    /// Routes `initialize`, `IOwnable` and `IReplayProtection`. `executeMetaTransaction` is
    /// routed by the outermost contract through `meta_tx::route`.
    pub fn route(&mut self, env: &mut Env, msg: &Msg) -> Option<Result<Bytes, RelayError>> {
        if let Some(decoded) = decode_calls::<IInitializableCalls>(msg) {
            return Some(decoded.and_then(|call| match call {
                IInitializableCalls::initialize(call) => {
                    let deployer = effective_sender::<IInitializable::initializeCall>(env, msg);
                    self.initialize(env, deployer, &call.name, &call.version)?;
                    Ok(Bytes::new())
                }
            }));
        }
        if let Some(out) = self.ownable.route(env, msg) {
            return Some(out);
        }
        self.replay.route(&self.ownable, env, msg)
    }
}

impl Dispatch for RelayAuth {
    fn dispatch(&mut self, env: &mut Env, msg: &Msg) -> Result<Bytes, RelayError> {
        if let Some(out) = meta_tx::route(self, env, msg) {
            return out;
        }
        self.route(env, msg)
            .unwrap_or_else(|| Err(RelayError::UnknownSelector(msg.selector())))
    }
}

impl MetaTransactional for RelayAuth {
    fn meta_transactions(&self) -> &NativeMetaTransaction {
        &self.meta_tx
    }

    fn meta_transactions_mut(&mut self) -> &mut NativeMetaTransaction {
        &mut self.meta_tx
    }
}
