#![allow(dead_code)]

use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::{sol, SolCall};
use k256::ecdsa::SigningKey;
use meta_relay::{
    context::{decode_calls, effective_sender},
    meta_tx::{self, execute_meta_transaction},
    Dispatch, Env, Ledger, MetaTransactional, Msg, NativeMetaTransaction, Receipt, RelayAuth,
    RelayError,
};
use meta_relay_encoder::{sign_meta_transaction, signer_address, SignedMetaTransaction};
use meta_relay_types::{
    abi::{IInitializable, INativeMetaTransaction},
    AssetKey, DomainParams,
};

pub const CHAIN_ID: u64 = 31337;
pub const CONTRACT: Address = Address::new([0xc0; 20]);
pub const DEPLOYER: Address = Address::new([0xde; 20]);
pub const RELAYER: Address = Address::new([0x9e; 20]);
pub const STRANGER: Address = Address::new([0x5e; 20]);
pub const NAME: &str = "DummyNativeMetaTransaction";
pub const VERSION: &str = "1";
pub const REVERT_REASON: &str = "ALWAYS_REVERTING_NEVER_INREVERTING";

sol! {
    interface ICounterTarget {
        function increaseCounter(uint256 amount) external;
        function counter() external view returns (uint256);
        function increaseCounterCaller() external view returns (address);
        function sum(uint256 a, uint256 b) external pure returns (uint256);
        function functionThatReverts() external;
        function functionThatRevertsSilently() external;
        function bumpAll(address asset, uint256 id, address signer) external;
        function relayAgain(address userAddress, bytes functionData, bytes signature) external;
        function mutateThenRevert() external;
        function relaySwallowingFailure(address userAddress, bytes functionData, bytes signature) external;
    }
}

use ICounterTarget::ICounterTargetCalls;

/// Integrator contract embedding `RelayAuth`.
#[derive(Clone, Debug, Default)]
pub struct CounterTarget {
    pub base: RelayAuth,
    pub counter: U256,
    pub increase_counter_caller: Address,
}

impl CounterTarget {
    fn route(&mut self, env: &mut Env, msg: &Msg) -> Option<Result<Bytes, RelayError>> {
        decode_calls::<ICounterTargetCalls>(msg)
            .map(|decoded| decoded.and_then(|call| self.handle(env, msg, call)))
    }

    fn handle(
        &mut self,
        env: &mut Env,
        msg: &Msg,
        call: ICounterTargetCalls,
    ) -> Result<Bytes, RelayError> {
        use ICounterTarget as t;
        use ICounterTargetCalls as Call;

        let output = match call {
            Call::increaseCounter(call) => {
                self.counter += call.amount;
                self.increase_counter_caller = effective_sender::<t::increaseCounterCall>(env, msg);
                Vec::new()
            }
            Call::counter(_) => t::counterCall::abi_encode_returns(&(self.counter,)),
            Call::increaseCounterCaller(_) => {
                t::increaseCounterCallerCall::abi_encode_returns(&(self.increase_counter_caller,))
            }
            Call::sum(call) => t::sumCall::abi_encode_returns(&(call.a + call.b,)),
            Call::functionThatReverts(_) => return Err(RelayError::revert(REVERT_REASON)),
            Call::functionThatRevertsSilently(_) => return Err(RelayError::revert_silently()),
            Call::bumpAll(t::bumpAllCall { asset, id, signer }) => {
                let sender = effective_sender::<t::bumpAllCall>(env, msg);
                let (ownable, replay) = self.base.replay_mut();
                let capability = ownable.require_owner(sender)?;
                replay.bump_contract_index(env, &capability);
                replay.bump_signer_index_for(env, signer, &capability);
                replay.bump_asset_index_for(env, AssetKey::new(asset, id, signer), &capability);
                Vec::new()
            }
            Call::relayAgain(call) => {
                return execute_meta_transaction(
                    self,
                    env,
                    msg.sender,
                    call.userAddress,
                    call.functionData,
                    &call.signature,
                );
            }
            Call::mutateThenRevert(_) => {
                self.counter += U256::from(1u64);
                return Err(RelayError::revert(REVERT_REASON));
            }
            Call::relaySwallowingFailure(call) => {
                let _ = execute_meta_transaction(
                    self,
                    env,
                    msg.sender,
                    call.userAddress,
                    call.functionData,
                    &call.signature,
                );
                Vec::new()
            }
        };
        Ok(output.into())
    }
}

impl Dispatch for CounterTarget {
    fn dispatch(&mut self, env: &mut Env, msg: &Msg) -> Result<Bytes, RelayError> {
        if let Some(out) = self.route(env, msg) {
            return out;
        }
        if let Some(out) = meta_tx::route(self, env, msg) {
            return out;
        }
        self.base
            .route(env, msg)
            .unwrap_or_else(|| Err(RelayError::UnknownSelector(msg.selector())))
    }
}

impl MetaTransactional for CounterTarget {
    fn meta_transactions(&self) -> &NativeMetaTransaction {
        MetaTransactional::meta_transactions(&self.base)
    }

    fn meta_transactions_mut(&mut self) -> &mut NativeMetaTransaction {
        self.base.meta_transactions_mut()
    }
}

pub fn deploy() -> Ledger<CounterTarget> {
    let mut ledger = Ledger::deploy(CHAIN_ID, CONTRACT, CounterTarget::default());
    let init = IInitializable::initializeCall {
        name: NAME.into(),
        version: VERSION.into(),
    };
    ledger
        .transact(DEPLOYER, init.abi_encode())
        .expect("initialize");
    ledger
}

pub fn user_key() -> SigningKey {
    SigningKey::from_slice(&[0x11; 32]).expect("valid key")
}

pub fn other_key() -> SigningKey {
    SigningKey::from_slice(&[0x22; 32]).expect("valid key")
}

pub fn address_of(key: &SigningKey) -> Address {
    signer_address(key)
}

pub fn domain() -> DomainParams {
    DomainParams::new(NAME, VERSION, CHAIN_ID, CONTRACT)
}

/// Sign `function_data` against the signer's current on-ledger nonce.
pub fn sign(
    ledger: &Ledger<CounterTarget>,
    key: &SigningKey,
    function_data: &[u8],
) -> SignedMetaTransaction {
    let nonce = ledger
        .state()
        .base
        .meta_transactions()
        .nonce(signer_address(key));
    sign_meta_transaction(&domain(), nonce, function_data, key).expect("signing")
}

pub fn execute_calldata(user: Address, function_data: &[u8], signature: &[u8]) -> Vec<u8> {
    INativeMetaTransaction::executeMetaTransactionCall {
        userAddress: user,
        functionData: function_data.to_vec().into(),
        signature: signature.to_vec().into(),
    }
    .abi_encode()
}

/// Submit `signed` through `RELAYER`.
pub fn relay(
    ledger: &mut Ledger<CounterTarget>,
    signed: &SignedMetaTransaction,
) -> Result<Receipt, RelayError> {
    ledger.transact(
        RELAYER,
        execute_calldata(signed.from, &signed.function_data, &signed.signature),
    )
}

/// Inner return bytes of a successful `executeMetaTransaction`.
pub fn return_data(receipt: &Receipt) -> Bytes {
    INativeMetaTransaction::executeMetaTransactionCall::abi_decode_returns(&receipt.output, true)
        .expect("executeMetaTransaction returns bytes")
        .returnData
}

pub fn nonce_of(ledger: &Ledger<CounterTarget>, user: Address) -> U256 {
    ledger.state().base.meta_transactions().nonce(user)
}
