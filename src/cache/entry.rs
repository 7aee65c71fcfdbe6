//! Per-key entry state: the last successful payload and, while a load or
//! store is in progress, the single shared [`Flight`] every waiter attaches
//! to.

// std
use std::sync::atomic::{AtomicBool, Ordering};
// crates.io
use tokio::sync::watch;
// self
use crate::{_prelude::*, cache::state::Payload, config::CacheConfig, loader::LoadResult};

/// The settle-once outcome of a [`Flight`]: either a produced value or the
/// error the cache surfaces to waiters.
pub(crate) type FlightOutcome<V> = std::result::Result<LoadResult<V>, Error>;

/// The single in-flight operation (a load or a store) currently producing a
/// new result for an entry's key.
///
/// Every caller that needs to wait for this operation's outcome subscribes
/// to [`Flight::subscribe`] before releasing the entry's lock, so no
/// settlement can be missed between observing the entry's state and
/// attaching as a waiter. Settlement is first-wins: whichever driver (the
/// load, or a racing store) calls [`Flight::try_settle`] successfully is the
/// one whose result is broadcast; see the coordinator for how a store and a
/// concurrent load race for this.
pub(crate) struct Flight<V> {
	store: AtomicBool,
	settled: AtomicBool,
	tx: watch::Sender<Option<FlightOutcome<V>>>,
}
impl<V> Flight<V>
where
	V: Clone + Send + Sync + 'static,
{
	fn new(store: bool) -> Arc<Self> {
		let (tx, _rx) = watch::channel(None);

		Arc::new(Self { store: AtomicBool::new(store), settled: AtomicBool::new(false), tx })
	}

	/// Start a new flight driven by a `load`.
	pub(crate) fn new_load() -> Arc<Self> {
		Self::new(false)
	}

	/// Start a new flight driven by a `store`.
	pub(crate) fn new_store() -> Arc<Self> {
		Self::new(true)
	}

	/// Upgrade this flight to be considered store-driven, so concurrent
	/// `get` callers wait on it rather than treating it as a background
	/// refresh they can bypass.
	pub(crate) fn mark_store(&self) {
		self.store.store(true, Ordering::Relaxed);
	}

	/// Whether this flight is (now) driven by a `store`.
	pub(crate) fn is_store(&self) -> bool {
		self.store.load(Ordering::Relaxed)
	}

	/// Attempt to be the driver that settles this flight. Only the first
	/// caller succeeds; later callers must discard their own outcome instead
	/// of broadcasting it.
	pub(crate) fn try_settle(&self) -> bool {
		self.settled.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire).is_ok()
	}

	/// Broadcast a settled outcome to every subscribed waiter.
	pub(crate) fn publish(&self, outcome: FlightOutcome<V>) {
		let _ = self.tx.send(Some(outcome));
	}

	/// Subscribe a new waiter to this flight's eventual outcome.
	pub(crate) fn subscribe(&self) -> watch::Receiver<Option<FlightOutcome<V>>> {
		self.tx.subscribe()
	}
}

/// The point-in-time bucket an entry falls into, per the cache's freshness
/// state machine.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EntryStatus {
	/// No payload, no in-flight operation.
	Empty,
	/// No usable payload yet; a load is in flight.
	Loading,
	/// Payload present and within `refresh_time`.
	Fresh,
	/// Payload present, older than `refresh_time` but not yet spoiled.
	Stale,
	/// Payload present and usable; a background refresh load is in flight.
	Refreshing,
	/// Payload present but older than `spoil_time`; must not be served.
	Spoiled,
	/// An explicit `set` is in flight for this key.
	Storing,
}

/// Per-key cache state: the last successful [`Payload`], if any, and the
/// [`Flight`] currently producing a new one, if any.
pub(crate) struct Entry<V> {
	pub(crate) payload: Option<Payload<V>>,
	pub(crate) flight: Option<Arc<Flight<V>>>,
}
impl<V> Entry<V>
where
	V: Clone + Send + Sync + 'static,
{
	pub(crate) fn new() -> Self {
		Self { payload: None, flight: None }
	}

	/// Snapshot this entry's [`EntryStatus`] at `now`.
	pub(crate) fn status(&self, now: Instant, config: &CacheConfig) -> EntryStatus {
		match (&self.payload, &self.flight) {
			(None, None) => EntryStatus::Empty,
			(None, Some(flight)) =>
				if flight.is_store() {
					EntryStatus::Storing
				} else {
					EntryStatus::Loading
				},
			(Some(payload), flight) if payload.is_spoiled(now, config.spoil_time) => match flight {
				Some(flight) if flight.is_store() => EntryStatus::Storing,
				Some(_) => EntryStatus::Loading,
				None => EntryStatus::Spoiled,
			},
			(Some(_), Some(flight)) =>
				if flight.is_store() {
					EntryStatus::Storing
				} else {
					EntryStatus::Refreshing
				},
			(Some(payload), None) =>
				if payload.is_fresh(now, config.refresh_time) {
					EntryStatus::Fresh
				} else {
					EntryStatus::Stale
				},
		}
	}

	/// Drop the cached payload, if any existed. Returns whether one existed.
	pub(crate) fn invalidate(&mut self) -> bool {
		self.payload.take().is_some()
	}
}
