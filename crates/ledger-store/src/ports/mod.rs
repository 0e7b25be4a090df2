//! Outbound contracts of the store layer.

mod backing;
mod observer;

pub use backing::BackingStore;
pub use observer::EntityChangeObserver;
