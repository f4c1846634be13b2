//! Shared types for the vault orchestration client.
//!
//! Every other crate in the workspace speaks in these types: chain
//! identifiers, the call/transaction shapes handed to the orchestrator, and
//! the receipt/log shapes handed back by providers.

pub mod chains;
pub mod common;
pub mod delivery;
pub mod transaction;

pub use chains::*;
pub use common::*;
pub use delivery::*;
pub use transaction::*;
