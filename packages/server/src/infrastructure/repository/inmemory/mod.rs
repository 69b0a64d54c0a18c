//! インメモリ実装

pub mod snapshot;

pub use snapshot::InMemorySnapshotStore;
