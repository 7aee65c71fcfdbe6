//! The per-key coordination engine: entries, the shared in-flight state, and
//! the public `LoadingCache` façade built on top of them.

pub mod coordinator;
pub mod entry;
pub mod state;

pub use coordinator::LoadingCache;
pub use entry::EntryStatus;
