use crate::common::{LockPolicy, DEFAULT_LOCK_ATTEMPTS, DEFAULT_LOCK_POLL_INTERVAL, DEFAULT_STORE_PATH};
use crate::errors::{DoruError, DoruResult, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings of an open store.
///
/// Built through [`DoruBuilder`](crate::DoruBuilder); setters validate their
/// input and report [`ErrorKind::InvalidConfiguration`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DoruConfig {
    path: PathBuf,
    lock_attempts: u32,
    lock_poll_interval: Duration,
    count_scan_fallback: bool,
}

impl DoruConfig {
    pub fn new() -> Self {
        DoruConfig {
            path: PathBuf::from(DEFAULT_STORE_PATH),
            lock_attempts: DEFAULT_LOCK_ATTEMPTS,
            lock_poll_interval: DEFAULT_LOCK_POLL_INTERVAL,
            count_scan_fallback: true,
        }
    }

    /// Root directory of the store.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock_attempts(&self) -> u32 {
        self.lock_attempts
    }

    pub fn lock_poll_interval(&self) -> Duration {
        self.lock_poll_interval
    }

    /// Whether `count` may scan the collection for filters no index can
    /// answer. When disabled such counts fail with
    /// [`ErrorKind::UnsupportedQuery`].
    pub fn count_scan_fallback(&self) -> bool {
        self.count_scan_fallback
    }

    pub fn lock_policy(&self) -> LockPolicy {
        LockPolicy::new(self.lock_attempts, self.lock_poll_interval)
    }

    pub(crate) fn set_path<P: AsRef<Path>>(&mut self, path: P) -> DoruResult<()> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            log::error!("Store path cannot be empty");
            return Err(DoruError::new(
                "Store path cannot be empty",
                ErrorKind::InvalidConfiguration,
            ));
        }
        self.path = path.to_path_buf();
        Ok(())
    }

    pub(crate) fn set_lock_attempts(&mut self, attempts: u32) -> DoruResult<()> {
        if attempts == 0 {
            log::error!("Lock attempts must be at least 1");
            return Err(DoruError::new(
                "Lock attempts must be at least 1",
                ErrorKind::InvalidConfiguration,
            ));
        }
        self.lock_attempts = attempts;
        Ok(())
    }

    pub(crate) fn set_lock_poll_interval(&mut self, interval: Duration) -> DoruResult<()> {
        if interval.is_zero() {
            log::error!("Lock poll interval must be positive");
            return Err(DoruError::new(
                "Lock poll interval must be positive",
                ErrorKind::InvalidConfiguration,
            ));
        }
        self.lock_poll_interval = interval;
        Ok(())
    }

    pub(crate) fn set_count_scan_fallback(&mut self, enabled: bool) {
        self.count_scan_fallback = enabled;
    }
}

impl Default for DoruConfig {
    fn default() -> Self {
        DoruConfig::new()
    }
}
