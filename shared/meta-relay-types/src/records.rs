use alloy_primitives::{Address, Bytes, U256};

use crate::keys::CounterKey;

/// Emitted on every successful counter bump.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeRecord {
    pub key: CounterKey,
    pub previous: U256,
    pub new: U256,
    /// Immediate (or effective, when relayed) caller that caused the bump.
    pub actor: Address,
}

/// Records published by a committed unit of work, in emission order.
///
/// Nothing on the ledger side reads these back; they exist for external indexers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    Counter(ChangeRecord),
    MetaTransactionExecuted {
        user: Address,
        relayer: Address,
        function_data: Bytes,
    },
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
    Initialized {
        version: u8,
    },
}

impl From<ChangeRecord> for Record {
    fn from(record: ChangeRecord) -> Self {
        Record::Counter(record)
    }
}
