//! InMemory 実装

mod store;

pub use store::InMemoryStore;
