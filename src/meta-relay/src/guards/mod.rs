//! Capability and initialization guards consumed by the relay components.

pub mod initializable;
pub mod ownable;

pub use initializable::{InitWindow, Lifecycle};
pub use ownable::{AdminCapability, Ownable};
