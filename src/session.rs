//! Session handle: the explicit, possibly-absent MVCC context every public
//! operation takes instead of an ambient thread-local.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Opaque session identity plus a cooperative-cancellation flag. Passing
/// `None` where a `Session` is expected means "bypass MVCC" (every row is
/// visible) — used by schema-installation and recovery code paths that
/// sit above this core.
#[derive(Clone)]
pub struct Session {
    id: u64,
    interrupted: Arc<AtomicBool>,
}

impl Session {
    pub fn new(id: u64) -> Session {
        Session {
            id,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Request cooperative cancellation of any iterator currently running
    /// on this session.
    pub fn interrupt(&self) {
        self.interrupted.store(true, Ordering::Relaxed);
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::Relaxed)
    }
}
