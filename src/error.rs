//! Crate-wide error types and `Result` alias.

// std
use std::sync::Arc;

/// Library-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the loading cache crate.
///
/// Loader errors are type-erased and stored behind an [`Arc`] so that the
/// same error instance can be cloned into every waiter sharing a settled
/// in-flight load or store, without requiring the loader's error type to
/// implement `Clone`.
#[derive(Clone, Debug, thiserror::Error)]
pub enum Error {
	/// The configured [`crate::config::CacheConfig`] failed validation.
	#[error("Configuration invalid for {field}: {reason}")]
	Config {
		/// Name of the offending configuration field.
		field: &'static str,
		/// Human-readable explanation of the violated constraint.
		reason: String,
	},
	/// The loader's `load` or `store` operation failed.
	#[error("Loader error: {0}")]
	Loader(#[source] Arc<dyn std::error::Error + Send + Sync>),
	/// A `get` call did not resolve within its configured timeout.
	///
	/// Distinguishable from [`Error::Loader`] so callers can retry or treat
	/// the two failure modes differently, per the cache's error taxonomy.
	#[error("Timed out waiting for a cache value")]
	Timeout,
}
impl Error {
	/// Wrap an arbitrary loader error in [`Error::Loader`].
	pub fn loader(err: impl std::error::Error + Send + Sync + 'static) -> Self {
		Self::Loader(Arc::new(err))
	}

	/// Whether this error is a timeout, as opposed to a loader failure.
	pub fn is_timeout(&self) -> bool {
		matches!(self, Self::Timeout)
	}
}
