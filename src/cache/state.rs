//! The value an entry holds once a load or store has succeeded, and the
//! freshness arithmetic performed against it.

// self
use crate::{_prelude::*, loader::LoadResult};

/// A successfully produced value together with the instant it was produced.
#[derive(Clone, Debug)]
pub struct Payload<V> {
	/// The cached value.
	pub value: V,
	/// When this value was considered authoritative by its producer.
	pub timestamp: Instant,
}
impl<V> Payload<V> {
	/// Age of this payload relative to `now`.
	pub fn age(&self, now: Instant) -> Duration {
		now.duration_since(self.timestamp)
	}

	/// Whether this payload is still within the refresh window (inclusive).
	pub fn is_fresh(&self, now: Instant, refresh_time: Duration) -> bool {
		self.age(now) <= refresh_time
	}

	/// Whether this payload has aged past the spoil threshold (exclusive).
	pub fn is_spoiled(&self, now: Instant, spoil_time: Duration) -> bool {
		self.age(now) > spoil_time
	}
}
impl<V> From<LoadResult<V>> for Payload<V> {
	fn from(result: LoadResult<V>) -> Self {
		Self { value: result.value, timestamp: result.timestamp }
	}
}
