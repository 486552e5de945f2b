//! Atomic ledger host.
//!
//! Models the account-based ledger the components run on: one external invocation is one
//! indivisible unit of work. A unit runs against a snapshot of the contract and its journal;
//! only a successful unit is committed, so a failure anywhere (including inside a relayed
//! call) leaves no trace.

use alloy_primitives::{Address, Bytes};
use meta_relay_types::Record;
use tracing::{debug, info_span};

use crate::errors::RelayError;

/// Execution environment of one unit of work.
#[derive(Debug)]
pub struct Env {
    pub chain_id: u64,
    pub contract_address: Address,
    journal: Vec<Record>,
}

impl Env {
    pub fn new(chain_id: u64, contract_address: Address) -> Self {
        Self {
            chain_id,
            contract_address,
            journal: Vec::new(),
        }
    }

    pub fn emit(&mut self, record: impl Into<Record>) {
        self.journal.push(record.into());
    }

    /// Records emitted so far in this unit.
    pub fn records(&self) -> &[Record] {
        &self.journal
    }

    pub(crate) fn checkpoint(&self) -> usize {
        self.journal.len()
    }

    pub(crate) fn rollback(&mut self, checkpoint: usize) {
        self.journal.truncate(checkpoint);
    }

    fn into_records(self) -> Vec<Record> {
        self.journal
    }
}

/// Incoming call: immediate caller plus raw calldata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Msg {
    pub sender: Address,
    pub data: Bytes,
}

impl Msg {
    pub fn new(sender: Address, data: impl Into<Bytes>) -> Self {
        Self {
            sender,
            data: data.into(),
        }
    }

    /// First four bytes of calldata (zero-padded when shorter).
    pub fn selector(&self) -> [u8; 4] {
        let mut selector = [0u8; 4];
        let n = self.data.len().min(4);
        selector[..n].copy_from_slice(&self.data[..n]);
        selector
    }
}

/// Selector-routed entrypoint of a contract.
pub trait Dispatch {
    fn dispatch(&mut self, env: &mut Env, msg: &Msg) -> Result<Bytes, RelayError>;
}

/// Outcome of a committed unit of work.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Receipt {
    pub output: Bytes,
    pub records: Vec<Record>,
}

/// A single contract deployed at `address` on chain `chain_id`.
#[derive(Clone, Debug)]
pub struct Ledger<C> {
    chain_id: u64,
    address: Address,
    state: C,
    records: Vec<Record>,
}

impl<C: Dispatch + Clone> Ledger<C> {
    pub fn deploy(chain_id: u64, address: Address, contract: C) -> Self {
        Self {
            chain_id,
            address,
            state: contract,
            records: Vec::new(),
        }
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Committed contract state.
    pub fn state(&self) -> &C {
        &self.state
    }

    /// Every committed record, in order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Execute one state-changing unit of work sent by `from`.
    pub fn transact(&mut self, from: Address, data: impl Into<Bytes>) -> Result<Receipt, RelayError> {
        let msg = Msg::new(from, data);
        let span = info_span!(
            "transact",
            from = %from,
            contract = %self.address,
            selector = %hex::encode(msg.selector())
        );
        let _enter = span.enter();

        let mut working = self.state.clone();
        let mut env = Env::new(self.chain_id, self.address);
        match working.dispatch(&mut env, &msg) {
            Ok(output) => {
                self.state = working;
                let records = env.into_records();
                self.records.extend(records.iter().cloned());
                debug!(records = records.len(), "unit of work committed");
                Ok(Receipt { output, records })
            }
            Err(err) => {
                debug!(error = %err, "unit of work reverted; nothing committed");
                Err(err)
            }
        }
    }

    /// Read-only execution; state changes are discarded even on success.
    pub fn call(&self, from: Address, data: impl Into<Bytes>) -> Result<Bytes, RelayError> {
        let msg = Msg::new(from, data);
        let mut scratch = self.state.clone();
        let mut env = Env::new(self.chain_id, self.address);
        scratch.dispatch(&mut env, &msg)
    }
}
