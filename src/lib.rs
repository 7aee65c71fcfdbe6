//! An async, concurrency-safe loading cache with single-flight coalescing,
//! staged freshness, and store-wins writes.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod cache;

mod config;
mod error;
mod loader;
mod _prelude {
	pub use std::{sync::Arc, time::Duration};

	pub use tokio::time::Instant;

	pub use crate::{Error, Result};
}
pub use crate::{
	cache::{EntryStatus, LoadingCache},
	config::{CacheConfig, CacheConfigBuilder},
	error::{Error, Result},
	loader::{CacheLoader, LoadResult},
};
