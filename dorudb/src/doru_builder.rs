use crate::doru::Doru;
use crate::doru_config::DoruConfig;
use crate::errors::{DoruError, DoruResult};
use std::path::Path;
use std::time::Duration;

/// Builder for opening a [`Doru`] store.
///
/// The first invalid setting is remembered and returned by
/// [`open`](DoruBuilder::open); later settings are ignored once an error has
/// been captured.
///
/// # Examples
///
/// ```rust,no_run
/// use dorudb::Doru;
/// use std::time::Duration;
///
/// # fn main() -> dorudb::errors::DoruResult<()> {
/// let db = Doru::builder()
///     .path("/var/lib/app/db")
///     .lock_attempts(100)
///     .lock_poll_interval(Duration::from_millis(10))
///     .open()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct DoruBuilder {
    error: Option<DoruError>,
    config: DoruConfig,
}

impl DoruBuilder {
    pub fn new() -> Self {
        DoruBuilder {
            error: None,
            config: DoruConfig::new(),
        }
    }

    /// Sets the store root directory. It is created on open if missing.
    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_path(path) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets how many times a busy file lock is retried before
    /// [`LockTimeout`](crate::errors::ErrorKind::LockTimeout).
    pub fn lock_attempts(mut self, attempts: u32) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_lock_attempts(attempts) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Sets the pause between two lock attempts.
    pub fn lock_poll_interval(mut self, interval: Duration) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.config.set_lock_poll_interval(interval) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Allows or forbids `count` to scan for non-indexed filters.
    pub fn count_scan_fallback(mut self, enabled: bool) -> Self {
        self.config.set_count_scan_fallback(enabled);
        self
    }

    /// Opens the store with the configured settings.
    ///
    /// # Errors
    ///
    /// The first configuration error captured by the builder, or any error
    /// raised while creating the root and discovering existing collections
    /// and indices.
    pub fn open(self) -> DoruResult<Doru> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Doru::initialize(self.config)
    }

    #[cfg(test)]
    pub(crate) fn config(&self) -> &DoruConfig {
        &self.config
    }
}
