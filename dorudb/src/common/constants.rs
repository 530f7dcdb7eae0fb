use std::time::Duration;

/// Reserved document field holding the integer ID.
pub const DOC_ID: &str = "id";

/// Width of the zero-padded decimal document key on disk.
pub const DOC_KEY_WIDTH: usize = 10;

/// Largest document ID that fits in a key of [`DOC_KEY_WIDTH`] digits.
pub const MAX_DOC_ID: u64 = 9_999_999_999;

/// Separator between collection and field in an index file name.
pub const INDEX_NAME_SEPARATOR: char = '.';

/// Default number of non-blocking lock attempts before giving up.
pub const DEFAULT_LOCK_ATTEMPTS: u32 = 50;

/// Default sleep between two lock attempts.
pub const DEFAULT_LOCK_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Default store root, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = "db";

/// Owner-only permissions for collection directories.
#[cfg(unix)]
pub const COLLECTION_DIR_MODE: u32 = 0o700;
