//! Cooperative cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable abort flag shared between a render strategy and whoever wants
/// to stop it.
///
/// Loads are relaxed on purpose: workers poll once per row or batch, and
/// observing the flag one poll late is an accepted race. There is no way to
/// clear a triggered flag, so pinning a strategy turns every later render
/// call into an immediate no-op.
#[derive(Clone, Debug, Default)]
pub struct AbortFlag {
    flag: Arc<AtomicBool>,
}

impl AbortFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Permanently set the flag.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
