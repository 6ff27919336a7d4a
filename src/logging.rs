//! Process logging setup
//!
//! Harness components never touch global logger state themselves; they emit
//! through `tracing` and take explicit per-run flags. Binaries and test
//! drivers that want human-readable output call [`init`] once at startup.

use tracing_subscriber::EnvFilter;

/// Install a process-wide formatted subscriber filtered by `RUST_LOG`.
///
/// Returns `false` when a subscriber is already installed, in which case the
/// existing one stays in place.
pub fn init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_rejected() {
        assert!(init());
        assert!(!init());
    }
}
