//! Adapters for the domain ports: stores, the simulated token ledger,
//! bridge backends and clocks.

pub mod bridge;
pub mod clock;
pub mod in_memory;
pub mod ledger;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
