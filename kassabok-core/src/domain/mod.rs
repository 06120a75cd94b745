//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod rule;
mod transaction;
pub mod result;

pub use rule::CategoryRule;
pub use transaction::{OwnerId, Transaction, TxKind, OTHER_CATEGORY};
