//! Process-wide tracing setup shared by binaries and integration tests.

pub mod tracing;

pub use self::tracing::{LogFormat, LogSettings};

/// Initialize tracing from the environment.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init() {
    tracing::init(&LogSettings::from_env());
}
