//! The top-level façade: routes `get`/`set` calls to the entry for their
//! key, enforces freshness and timeout policy, and guarantees at most one
//! concurrent load per key.

// std
use std::{collections::HashMap, hash::Hash};
// crates.io
use tokio::sync::{Mutex, RwLock};
// self
use crate::{
	_prelude::*,
	cache::{
		entry::{Entry, EntryStatus, Flight, FlightOutcome},
		state::Payload,
	},
	config::CacheConfig,
	loader::CacheLoader,
};

/// An async, concurrency-safe loading cache.
///
/// `LoadingCache` collapses concurrent `get` calls for the same key onto a
/// single [`CacheLoader::load`] invocation, serves fresh and stale results
/// synchronously, refreshes stale results in the background, and races
/// explicit [`set`](LoadingCache::set) writes against in-flight loads so the
/// newer, authoritative value always wins.
pub struct LoadingCache<K, V, L> {
	loader: Arc<L>,
	config: CacheConfig,
	entries: RwLock<HashMap<K, Arc<Mutex<Entry<V>>>>>,
}
impl<K, V, L> LoadingCache<K, V, L>
where
	K: Clone + Eq + Hash + Send + Sync + 'static,
	V: Clone + Send + Sync + 'static,
	L: CacheLoader<K, V>,
{
	/// Construct a new cache over `loader`, governed by `config`.
	pub fn new(loader: L, config: CacheConfig) -> Self {
		Self { loader: Arc::new(loader), config, entries: RwLock::new(HashMap::new()) }
	}

	/// Number of keys currently tracked, regardless of freshness.
	pub async fn len(&self) -> usize {
		self.entries.read().await.len()
	}

	/// Whether no key has ever been referenced.
	pub async fn is_empty(&self) -> bool {
		self.entries.read().await.is_empty()
	}

	/// Snapshot the current [`EntryStatus`] for `key`, or `None` if the key
	/// has never been referenced.
	pub async fn status(&self, key: &K) -> Option<EntryStatus> {
		let entry_arc = self.entries.read().await.get(key).cloned()?;
		let entry = entry_arc.lock().await;

		Some(entry.status(Instant::now(), &self.config))
	}

	/// Drop the cached payload for `key`, if any. Returns whether a payload
	/// was present. Does not affect an in-flight load or store.
	pub async fn invalidate(&self, key: &K) -> bool {
		let Some(entry_arc) = self.entries.read().await.get(key).cloned() else {
			return false;
		};

		entry_arc.lock().await.invalidate()
	}

	async fn entry_for(&self, key: &K) -> Arc<Mutex<Entry<V>>> {
		if let Some(entry) = self.entries.read().await.get(key) {
			return entry.clone();
		}

		self.entries.write().await.entry(key.clone()).or_insert_with(|| Arc::new(Mutex::new(Entry::new()))).clone()
	}

	/// Fetch the value for `key`, loading it if necessary.
	///
	/// See the module-level freshness state machine: a fresh payload
	/// resolves immediately, a stale payload resolves immediately while a
	/// background refresh is kicked off, and an empty or spoiled entry waits
	/// on a load, bounded by `config.timeout`.
	#[tracing::instrument(skip(self, key))]
	pub async fn get(&self, key: K) -> Result<V> {
		let now = Instant::now();
		let entry_arc = self.entry_for(&key).await;

		enum Action<V> {
			Immediate(V),
			Wait(tokio::sync::watch::Receiver<Option<FlightOutcome<V>>>),
		}

		let action = {
			let mut entry = entry_arc.lock().await;

			match (entry.payload.clone(), entry.flight.clone()) {
				(Some(payload), None) if !payload.is_spoiled(now, self.config.spoil_time) =>
					if payload.is_fresh(now, self.config.refresh_time) {
						Action::Immediate(payload.value)
					} else {
						tracing::debug!("payload stale, starting background refresh");

						let flight = Flight::new_load();

						entry.flight = Some(flight.clone());
						self.spawn_load(entry_arc.clone(), key.clone(), flight);

						Action::Immediate(payload.value)
					},
				(Some(payload), Some(flight)) if !payload.is_spoiled(now, self.config.spoil_time) =>
					if flight.is_store() {
						Action::Wait(flight.subscribe())
					} else {
						Action::Immediate(payload.value)
					},
				(_, Some(flight)) => Action::Wait(flight.subscribe()),
				(_, None) => {
					tracing::debug!("no payload and no in-flight load, starting a cold load");

					let flight = Flight::new_load();

					entry.flight = Some(flight.clone());
					self.spawn_load(entry_arc.clone(), key.clone(), flight.clone());

					Action::Wait(flight.subscribe())
				},
			}
		};

		match action {
			Action::Immediate(value) => Ok(value),
			Action::Wait(mut rx) => {
				let outcome = tokio::time::timeout(self.config.timeout, async {
					rx.wait_for(|value| value.is_some()).await.map(|guard| guard.clone())
				})
				.await
				.map_err(|_| {
					tracing::warn!("get timed out waiting for in-flight result");

					Error::Timeout
				})?
				.map_err(|_| Error::Timeout)?
				.expect("watch only settles to Some before notifying waiters");

				outcome.map(|result| result.value)
			},
		}
	}

	/// Start a background load driver for `flight` and install its outcome
	/// into `entry_arc` when it settles, subject to the store-wins race: if
	/// a concurrent store settles the same flight first, this load's
	/// outcome — success or error — is discarded entirely.
	fn spawn_load(&self, entry_arc: Arc<Mutex<Entry<V>>>, key: K, flight: Arc<Flight<V>>) {
		let loader = self.loader.clone();
		let spoil_time = self.config.spoil_time;

		tokio::spawn(async move {
			let result = loader.load(&key).await;
			let mut entry = entry_arc.lock().await;

			match result {
				Ok(load_result) =>
					if flight.try_settle() {
						entry.payload = Some(Payload::from(load_result.clone()));
						flight.publish(Ok(load_result));
						Self::clear_if_current(&mut entry, &flight);
					} else {
						tracing::debug!("load settled after a concurrent store won the race, discarding");
					},
				Err(err) => {
					let err = Error::loader(err);

					if flight.try_settle() {
						tracing::warn!(error = %err, "suppressing load error, retaining prior payload unless spoiled");

						if entry.payload.as_ref().is_some_and(|payload| payload.is_spoiled(Instant::now(), spoil_time)) {
							entry.payload = None;
						}

						flight.publish(Err(err));
						Self::clear_if_current(&mut entry, &flight);
					}
				},
			}
		});
	}

	fn clear_if_current(entry: &mut Entry<V>, flight: &Arc<Flight<V>>) {
		if entry.flight.as_ref().is_some_and(|current| Arc::ptr_eq(current, flight)) {
			entry.flight = None;
		}
	}

	/// Persist `value` for `key` via the loader's `store` operation.
	///
	/// If a load is concurrently in flight for the same key, this store
	/// races it: whichever settles first is delivered to every waiter
	/// attached at that moment, and a store that settles second silently
	/// overwrites the payload installed by an earlier load without
	/// re-notifying already-satisfied waiters.
	#[tracing::instrument(skip(self, key, value))]
	pub async fn set(&self, key: K, value: V) -> Result<V> {
		let entry_arc = self.entry_for(&key).await;

		let (flight, created_here) = {
			let mut entry = entry_arc.lock().await;

			match entry.flight.clone() {
				Some(flight) => {
					flight.mark_store();

					(flight, false)
				},
				None => {
					let flight = Flight::new_store();

					entry.flight = Some(flight.clone());

					(flight, true)
				},
			}
		};

		match self.loader.store(&key, value).await {
			Ok(load_result) => {
				let mut entry = entry_arc.lock().await;
				let won = flight.try_settle();

				entry.payload = Some(Payload::from(load_result.clone()));

				if won {
					flight.publish(Ok(load_result.clone()));
					Self::clear_if_current(&mut entry, &flight);
				} else {
					tracing::debug!("store settled after a concurrent load already won the race, overwriting payload silently");
				}

				Ok(load_result.value)
			},
			Err(err) => {
				let err = Error::loader(err);

				if created_here {
					let mut entry = entry_arc.lock().await;

					if flight.try_settle() {
						flight.publish(Err(err.clone()));
						Self::clear_if_current(&mut entry, &flight);
					}
				}

				tracing::warn!(error = %err, "store failed");

				Err(err)
			},
		}
	}
}
