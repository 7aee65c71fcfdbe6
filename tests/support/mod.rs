//! A `CacheLoader` test double standing in for the network boundary the
//! teacher's tests mock with `wiremock`: configurable per-call delay and a
//! scripted load/store outcome, with atomic call counters exposed through a
//! cheap, clonable handle so assertions can outlive the loader once it has
//! been moved into a `LoadingCache`.

// std
use std::sync::{
	Arc,
	atomic::{AtomicU32, Ordering},
};
// crates.io
use loading_cache::{CacheLoader, LoadResult};
use tokio::time::Duration;

/// The error type `RecordingLoader` fails its scripted outcomes with.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{0}")]
pub struct LoaderError(pub String);

#[derive(Clone)]
enum Outcome<V> {
	Value(V),
	Fail(String),
}

/// A cheap, clonable handle onto a [`RecordingLoader`]'s call counters,
/// obtained before the loader is moved into a `LoadingCache`.
#[derive(Clone)]
pub struct RecordingHandle {
	load_calls: Arc<AtomicU32>,
	store_calls: Arc<AtomicU32>,
}
impl RecordingHandle {
	/// Number of times `load` has been invoked so far.
	pub fn load_calls(&self) -> u32 {
		self.load_calls.load(Ordering::SeqCst)
	}

	/// Number of times `store` has been invoked so far.
	pub fn store_calls(&self) -> u32 {
		self.store_calls.load(Ordering::SeqCst)
	}
}

/// A `CacheLoader` whose `load`/`store` delay and outcome are fixed at
/// construction, used to drive the concrete scenarios in spec.md §8 under a
/// paused tokio clock.
pub struct RecordingLoader<V> {
	load_calls: Arc<AtomicU32>,
	store_calls: Arc<AtomicU32>,
	load_delay: Duration,
	store_delay: Duration,
	load_outcome: Outcome<V>,
	store_outcome: Option<String>,
}
impl<V> RecordingLoader<V>
where
	V: Clone + Send + Sync + 'static,
{
	/// A loader whose `load` always succeeds with `value` and whose `store`
	/// always succeeds with whatever value it is given.
	pub fn new(value: V) -> Self {
		Self {
			load_calls: Arc::new(AtomicU32::new(0)),
			store_calls: Arc::new(AtomicU32::new(0)),
			load_delay: Duration::ZERO,
			store_delay: Duration::ZERO,
			load_outcome: Outcome::Value(value),
			store_outcome: None,
		}
	}

	/// Delay every `load` call by `delay` before it settles.
	pub fn load_delay(mut self, delay: Duration) -> Self {
		self.load_delay = delay;

		self
	}

	/// Delay every `store` call by `delay` before it settles.
	pub fn store_delay(mut self, delay: Duration) -> Self {
		self.store_delay = delay;

		self
	}

	/// Make every `load` call fail with an error whose message is `tag`.
	pub fn failing_load(mut self, tag: impl Into<String>) -> Self {
		self.load_outcome = Outcome::Fail(tag.into());

		self
	}

	/// Make every `store` call fail with an error whose message is `tag`,
	/// instead of persisting the given value.
	pub fn failing_store(mut self, tag: impl Into<String>) -> Self {
		self.store_outcome = Some(tag.into());

		self
	}

	/// Obtain a handle onto this loader's call counters.
	pub fn handle(&self) -> RecordingHandle {
		RecordingHandle { load_calls: self.load_calls.clone(), store_calls: self.store_calls.clone() }
	}
}
impl<V> CacheLoader<String, V> for RecordingLoader<V>
where
	V: Clone + Send + Sync + 'static,
{
	type Error = LoaderError;

	async fn load(&self, _key: &String) -> std::result::Result<LoadResult<V>, Self::Error> {
		self.load_calls.fetch_add(1, Ordering::SeqCst);

		if !self.load_delay.is_zero() {
			tokio::time::sleep(self.load_delay).await;
		}

		match &self.load_outcome {
			Outcome::Value(value) => Ok(LoadResult::now(value.clone())),
			Outcome::Fail(tag) => Err(LoaderError(tag.clone())),
		}
	}

	async fn store(&self, _key: &String, value: V) -> std::result::Result<LoadResult<V>, Self::Error> {
		self.store_calls.fetch_add(1, Ordering::SeqCst);

		if !self.store_delay.is_zero() {
			tokio::time::sleep(self.store_delay).await;
		}

		match &self.store_outcome {
			None => Ok(LoadResult::now(value)),
			Some(tag) => Err(LoaderError(tag.clone())),
		}
	}
}
