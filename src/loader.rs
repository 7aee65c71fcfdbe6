//! The loader collaborator and the result shape it produces.

// std
use std::future::Future;
// self
use crate::_prelude::*;

/// The outcome of a single `load` or `store` call: a value together with the
/// instant its producer considered it authoritative.
#[derive(Clone, Debug)]
pub struct LoadResult<V> {
	/// When the value was considered authoritative by its producer.
	pub timestamp: Instant,
	/// The produced value.
	pub value: V,
}
impl<V> LoadResult<V> {
	/// Build a [`LoadResult`] stamped with the current instant.
	pub fn now(value: V) -> Self {
		Self { timestamp: Instant::now(), value }
	}
}

/// An external collaborator that produces and persists values on behalf of a
/// [`crate::cache::LoadingCache`].
///
/// The cache calls [`load`](CacheLoader::load) at most once per coalescing
/// window per key, and calls [`store`](CacheLoader::store) once per
/// [`LoadingCache::set`](crate::cache::LoadingCache::set) invocation. Both
/// operations are native `async fn`s: `CacheLoader` is only ever used as a
/// generic bound on `LoadingCache<K, V, L>`, never behind a `dyn`, so no
/// boxing or `async_trait` dispatch is required.
pub trait CacheLoader<K, V>: Send + Sync + 'static
where
	K: Send + Sync + 'static,
	V: Send + Sync + 'static,
{
	/// The error type this loader's operations may fail with.
	type Error: std::error::Error + Send + Sync + 'static;

	/// Produce a value for `key`. Called at most once per coalescing window.
	fn load(
		&self,
		key: &K,
	) -> impl Future<Output = std::result::Result<LoadResult<V>, Self::Error>> + Send;

	/// Persist `value` for `key`, returning the authoritative stored result.
	fn store(
		&self,
		key: &K,
		value: V,
	) -> impl Future<Output = std::result::Result<LoadResult<V>, Self::Error>> + Send;
}
