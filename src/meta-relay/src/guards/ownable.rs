//! Single-administrator capability guard.
//!
//! Privileged operations take an `AdminCapability` instead of consulting an ambient "current
//! owner": the only way to obtain one is `Ownable::require_owner` with the actual caller.

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::SolCall;
use meta_relay_types::{
    abi::IOwnable::{self, IOwnableCalls},
    Record,
};

use crate::{
    context::{decode_calls, effective_sender},
    errors::RelayError,
    guards::InitWindow,
    host::{Env, Msg},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ownable {
    owner: Address,
}

/// Proof that `holder` is the administrator at the time it was issued.
#[derive(Debug, PartialEq, Eq)]
pub struct AdminCapability {
    holder: Address,
}

impl AdminCapability {
    pub fn holder(&self) -> Address {
        self.holder
    }
}

impl Ownable {
    pub const COMPONENT: &'static str = "Ownable";

    /// Setup: the deployer becomes the administrator.
    pub fn init(
        &mut self,
        window: &mut InitWindow<'_>,
        env: &mut Env,
        initial_owner: Address,
    ) -> Result<(), RelayError> {
        window.enter(Self::COMPONENT, &[])?;
        self.set_owner(env, initial_owner);
        Ok(())
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn require_owner(&self, caller: Address) -> Result<AdminCapability, RelayError> {
        if self.owner == Address::ZERO || caller != self.owner {
            return Err(RelayError::Authorization);
        }
        Ok(AdminCapability { holder: caller })
    }

    pub fn transfer_ownership(
        &mut self,
        env: &mut Env,
        capability: AdminCapability,
        new_owner: Address,
    ) -> Result<(), RelayError> {
        if capability.holder != self.owner {
            return Err(RelayError::Authorization);
        }
        if new_owner == Address::ZERO {
            return Err(RelayError::ZeroOwner);
        }
        self.set_owner(env, new_owner);
        Ok(())
    }

    fn set_owner(&mut self, env: &mut Env, new_owner: Address) {
        let previous_owner = self.owner;
        self.owner = new_owner;
        env.emit(Record::OwnershipTransferred {
            previous_owner,
            new_owner,
        });
    }

    /// ABI router for `IOwnable`. `None` when the selector is not ours.
    pub fn route(&mut self, env: &mut Env, msg: &Msg) -> Option<Result<Bytes, RelayError>> {
        decode_calls::<IOwnableCalls>(msg).map(|decoded| {
            decoded.and_then(|call| match call {
                IOwnableCalls::owner(_) => Ok(Bytes::from(IOwnable::ownerCall::abi_encode_returns(
                    &(self.owner,),
                ))),
                IOwnableCalls::transferOwnership(call) => {
                    let sender = effective_sender::<IOwnable::transferOwnershipCall>(env, msg);
                    let capability = self.require_owner(sender)?;
                    self.transfer_ownership(env, capability, call.newOwner)?;
                    Ok(Bytes::new())
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guards::Lifecycle;

    fn owned_by(owner: Address) -> (Ownable, Env) {
        let mut env = Env::new(1, Address::repeat_byte(0xcc));
        let mut lifecycle = Lifecycle::default();
        let mut window = InitWindow::open(&mut lifecycle).unwrap();
        let mut ownable = Ownable::default();
        ownable.init(&mut window, &mut env, owner).unwrap();
        window.close(&mut env);
        (ownable, env)
    }

    #[test]
    fn only_owner_gets_a_capability() {
        let owner = Address::repeat_byte(1);
        let (ownable, _) = owned_by(owner);
        assert_eq!(ownable.require_owner(owner).unwrap().holder(), owner);
        assert_eq!(
            ownable.require_owner(Address::repeat_byte(2)),
            Err(RelayError::Authorization)
        );
    }

    #[test]
    fn nobody_owns_an_uninitialized_guard() {
        let ownable = Ownable::default();
        assert_eq!(
            ownable.require_owner(Address::ZERO),
            Err(RelayError::Authorization)
        );
    }

    #[test]
    fn transfer_moves_the_capability() {
        let (old, new) = (Address::repeat_byte(1), Address::repeat_byte(2));
        let (mut ownable, mut env) = owned_by(old);
        let cap = ownable.require_owner(old).unwrap();
        ownable.transfer_ownership(&mut env, cap, new).unwrap();
        assert_eq!(ownable.owner(), new);
        assert!(ownable.require_owner(old).is_err());
        assert_eq!(
            env.records().last(),
            Some(&Record::OwnershipTransferred {
                previous_owner: old,
                new_owner: new
            })
        );
    }

    #[test]
    fn stale_capability_is_refused() {
        let (old, new) = (Address::repeat_byte(1), Address::repeat_byte(2));
        let (mut ownable, mut env) = owned_by(old);
        let first = ownable.require_owner(old).unwrap();
        let stale = ownable.require_owner(old).unwrap();
        ownable.transfer_ownership(&mut env, first, new).unwrap();

        assert_eq!(
            ownable.transfer_ownership(&mut env, stale, old),
            Err(RelayError::Authorization)
        );
        assert_eq!(ownable.owner(), new);
    }

    #[test]
    fn refuses_zero_owner() {
        let owner = Address::repeat_byte(1);
        let (mut ownable, mut env) = owned_by(owner);
        let cap = ownable.require_owner(owner).unwrap();
        assert_eq!(
            ownable.transfer_ownership(&mut env, cap, Address::ZERO),
            Err(RelayError::ZeroOwner)
        );
        assert_eq!(ownable.owner(), owner);
    }
}
