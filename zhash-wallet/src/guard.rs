//! In-flight flags that release themselves

use std::sync::atomic::{AtomicBool, Ordering};

/// Holds a busy flag for as long as it lives
///
/// The flag is cleared on drop, so a cancelled future cannot leave it set.
pub(crate) struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    /// Set `flag`, or return `None` if it is already set
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
