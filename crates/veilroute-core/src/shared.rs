//! Thread-safe handle to a router.
//!
//! Every logical operation runs under one lock, so concurrent callers see
//! operations as if executed one at a time. Never hold the lock across an
//! await point.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::ConfidentialRouter;

#[derive(Clone)]
pub struct SharedRouter {
    inner: Arc<Mutex<ConfidentialRouter>>,
}

impl SharedRouter {
    #[must_use]
    pub fn new(router: ConfidentialRouter) -> Self {
        Self {
            inner: Arc::new(Mutex::new(router)),
        }
    }

    /// Run `f` with exclusive access to the router.
    pub fn execute<R>(&self, f: impl FnOnce(&mut ConfidentialRouter) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Run a read-only closure under the same lock.
    pub fn read<R>(&self, f: impl FnOnce(&ConfidentialRouter) -> R) -> R {
        let guard = self.inner.lock();
        f(&guard)
    }
}
