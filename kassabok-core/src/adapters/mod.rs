//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies. The
//! bundled adapter keeps the ledger in memory with an optional JSON
//! snapshot on disk; a real deployment would put a database behind the
//! same trait.

pub mod memory;

pub use memory::MemoryStore;
