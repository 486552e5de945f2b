//! Shared utilities for the relay components.
//!
//! These helpers are small and deterministic; they never touch ledger state.

pub mod bytes;
pub mod crypto;
