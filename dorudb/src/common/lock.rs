use crate::common::{DEFAULT_LOCK_ATTEMPTS, DEFAULT_LOCK_POLL_INTERVAL};
use crate::errors::{DoruError, DoruResult, ErrorKind};
use std::fs::File;
use std::thread;
use std::time::Duration;

/// The kind of advisory lock requested on a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    /// Many holders at once; used for reads.
    Shared,
    /// A single holder; used for writes.
    Exclusive,
}

/// Bounded polling policy for acquiring advisory file locks.
///
/// Locks are never waited on with a blocking call. Each attempt is a
/// non-blocking request; after `attempts` failed requests spaced by
/// `poll_interval` the caller gets a [`ErrorKind::LockTimeout`] error.
///
/// # Examples
///
/// ```rust
/// use dorudb::common::LockPolicy;
/// use std::time::Duration;
///
/// let policy = LockPolicy::new(10, Duration::from_millis(5));
/// assert_eq!(policy.budget(), Duration::from_millis(50));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockPolicy {
    attempts: u32,
    poll_interval: Duration,
}

impl LockPolicy {
    pub fn new(attempts: u32, poll_interval: Duration) -> Self {
        LockPolicy {
            attempts,
            poll_interval,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Worst-case time spent waiting before a timeout is reported.
    pub fn budget(&self) -> Duration {
        self.poll_interval * self.attempts
    }
}

impl Default for LockPolicy {
    fn default() -> Self {
        LockPolicy::new(DEFAULT_LOCK_ATTEMPTS, DEFAULT_LOCK_POLL_INTERVAL)
    }
}

/// An advisory lock held on an open file.
///
/// Locking is unix-only. On other targets acquiring always succeeds and no
/// lock is taken.
///
/// The lock is released when the guard is dropped. The guard borrows the file
/// so the descriptor cannot be closed while the lock is held.
pub struct FileLock<'a> {
    file: &'a File,
    mode: LockMode,
}

impl<'a> FileLock<'a> {
    /// Acquires `mode` on `file` following `policy`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::LockTimeout`] once the attempt budget is exhausted,
    /// or [`ErrorKind::IOError`] if the OS rejects the request for any reason
    /// other than contention.
    pub fn acquire(
        file: &'a File,
        mode: LockMode,
        policy: &LockPolicy,
        path: &str,
    ) -> DoruResult<FileLock<'a>> {
        let mut attempt = 0;
        loop {
            if try_lock(file, mode)? {
                return Ok(FileLock { file, mode });
            }

            attempt += 1;
            if attempt > policy.attempts() {
                log::warn!(
                    "{:?} lock on {} not granted after {} attempts",
                    mode,
                    path,
                    policy.attempts()
                );
                return Err(DoruError::new(
                    &format!(
                        "{} lock timeout exceeded on {}: {} ms",
                        match mode {
                            LockMode::Shared => "Read",
                            LockMode::Exclusive => "Write",
                        },
                        path,
                        policy.budget().as_millis()
                    ),
                    ErrorKind::LockTimeout,
                ));
            }
            log::debug!("{:?} lock on {} busy, attempt {}", mode, path, attempt);
            thread::sleep(policy.poll_interval());
        }
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

impl Drop for FileLock<'_> {
    fn drop(&mut self) {
        unlock(self.file);
    }
}

#[cfg(unix)]
fn try_lock(file: &File, mode: LockMode) -> DoruResult<bool> {
    use std::os::unix::io::AsRawFd;

    let operation = match mode {
        LockMode::Shared => libc::LOCK_SH,
        LockMode::Exclusive => libc::LOCK_EX,
    } | libc::LOCK_NB;

    // SAFETY: the descriptor is owned by `file`, which outlives this call.
    let rc = unsafe { libc::flock(file.as_raw_fd(), operation) };
    if rc == 0 {
        return Ok(true);
    }

    let err = std::io::Error::last_os_error();
    match err.raw_os_error() {
        Some(code) if code == libc::EWOULDBLOCK || code == libc::EINTR => Ok(false),
        _ => {
            log::error!("flock failed: {}", err);
            Err(DoruError::new(
                &format!("Failed to acquire lock: {}", err),
                ErrorKind::IOError,
            ))
        }
    }
}

#[cfg(unix)]
fn unlock(file: &File) {
    use std::os::unix::io::AsRawFd;

    // SAFETY: see `try_lock`.
    unsafe {
        libc::flock(file.as_raw_fd(), libc::LOCK_UN);
    }
}

#[cfg(not(unix))]
fn try_lock(_file: &File, _mode: LockMode) -> DoruResult<bool> {
    Ok(true)
}

#[cfg(not(unix))]
fn unlock(_file: &File) {}
