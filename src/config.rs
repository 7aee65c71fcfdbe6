//! Cache-wide configuration.

// self
use crate::_prelude::*;

/// Immutable configuration for a [`crate::cache::LoadingCache`].
#[derive(Clone, Debug)]
pub struct CacheConfig {
	/// Age after which a cached result is considered stale: still served
	/// synchronously, but a background refresh is triggered.
	pub refresh_time: Duration,
	/// Age after which a cached result is considered spoiled and must no
	/// longer be served; callers block on a fresh load.
	pub spoil_time: Duration,
	/// Maximum time any single `get` call may wait before failing with
	/// [`crate::Error::Timeout`].
	pub timeout: Duration,
}
impl CacheConfig {
	/// Start building a [`CacheConfig`].
	pub fn builder() -> CacheConfigBuilder {
		CacheConfigBuilder::default()
	}

	/// Validate `refresh_time <= spoil_time` and `timeout > 0`.
	pub fn validate(&self) -> crate::Result<()> {
		if self.refresh_time > self.spoil_time {
			return Err(crate::Error::Config {
				field: "refresh_time",
				reason: "refresh_time must be <= spoil_time".into(),
			});
		}

		if self.timeout.is_zero() {
			return Err(crate::Error::Config {
				field: "timeout",
				reason: "timeout must be greater than zero".into(),
			});
		}

		Ok(())
	}
}

/// Fluent, validating builder for [`CacheConfig`].
#[derive(Clone, Debug, Default)]
pub struct CacheConfigBuilder {
	refresh_time: Option<Duration>,
	spoil_time: Option<Duration>,
	timeout: Option<Duration>,
}
impl CacheConfigBuilder {
	/// Set the refresh (staleness) threshold.
	pub fn refresh_time(mut self, refresh_time: Duration) -> Self {
		self.refresh_time = Some(refresh_time);

		self
	}

	/// Set the spoil threshold.
	pub fn spoil_time(mut self, spoil_time: Duration) -> Self {
		self.spoil_time = Some(spoil_time);

		self
	}

	/// Set the per-`get` timeout.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Validate and build the [`CacheConfig`].
	pub fn build(self) -> crate::Result<CacheConfig> {
		let config = CacheConfig {
			refresh_time: self.refresh_time.ok_or(crate::Error::Config {
				field: "refresh_time",
				reason: "refresh_time is required".into(),
			})?,
			spoil_time: self.spoil_time.ok_or(crate::Error::Config {
				field: "spoil_time",
				reason: "spoil_time is required".into(),
			})?,
			timeout: self.timeout.ok_or(crate::Error::Config {
				field: "timeout",
				reason: "timeout is required".into(),
			})?,
		};

		config.validate()?;

		Ok(config)
	}
}
