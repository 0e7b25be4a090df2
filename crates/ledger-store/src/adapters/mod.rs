//! In-memory adapters for the store ports.

mod memory;

pub use memory::InMemoryStore;
