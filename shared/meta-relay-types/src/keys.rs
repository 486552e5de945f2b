use alloy_primitives::{Address, U256};

/// Granularity of a replay-protection counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CounterScope {
    /// One counter for the whole contract, bumped by the administrator.
    Contract,
    /// One counter per signer.
    Signer,
    /// One counter per (asset contract, asset id, signer).
    Asset,
}

/// Composite key of an asset-scoped counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetKey {
    pub asset: Address,
    pub id: U256,
    pub signer: Address,
}

impl AssetKey {
    pub const fn new(asset: Address, id: U256, signer: Address) -> Self {
        Self { asset, id, signer }
    }
}

/// Fully qualified counter key (scope plus the scope's own key).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CounterKey {
    Contract,
    Signer(Address),
    Asset(AssetKey),
}

impl CounterKey {
    pub fn scope(&self) -> CounterScope {
        match self {
            CounterKey::Contract => CounterScope::Contract,
            CounterKey::Signer(_) => CounterScope::Signer,
            CounterKey::Asset(_) => CounterScope::Asset,
        }
    }
}

impl From<AssetKey> for CounterKey {
    fn from(key: AssetKey) -> Self {
        CounterKey::Asset(key)
    }
}
