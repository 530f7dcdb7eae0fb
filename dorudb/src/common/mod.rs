//! Shared constants, file locking and small helpers used across the engine.

mod constants;
mod lock;
mod util;

pub use constants::*;
pub use lock::*;
pub use util::*;
