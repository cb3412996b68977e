//! Batch lifecycle: the process-wide CLOSED/OPEN switch and batch counter.
//!
//! ```text
//!            open (id += 1)
//!   ┌────────┐ ─────────────▶ ┌──────┐
//!   │ CLOSED │                │ OPEN │
//!   └────────┘ ◀───────────── └──────┘
//!               close
//! ```
//!
//! Batch id 1 is reserved for the initial closed state, so the first opened
//! batch is 2. Role and pause checks belong to the caller.

use veilroute_types::{BatchId, BatchPhase, Result, RouterEvent, VeilrouteError};

#[derive(Debug, Clone)]
pub struct BatchLifecycle {
    current: BatchId,
    phase: BatchPhase,
}

impl Default for BatchLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchLifecycle {
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: BatchId::INITIAL,
            phase: BatchPhase::Closed,
        }
    }

    /// Allocate the next batch id and open it.
    ///
    /// # Errors
    /// `BatchAlreadyOpen` if the current batch is open.
    pub fn open(&mut self) -> Result<RouterEvent> {
        if self.phase == BatchPhase::Open {
            return Err(VeilrouteError::BatchAlreadyOpen(self.current));
        }
        self.current = self.current.next();
        self.phase = BatchPhase::Open;
        tracing::debug!(batch_id = %self.current, "Batch opened");
        Ok(RouterEvent::BatchOpened {
            batch_id: self.current,
        })
    }

    /// # Errors
    /// `BatchAlreadyClosed` if no batch is open.
    pub fn close(&mut self) -> Result<RouterEvent> {
        if self.phase == BatchPhase::Closed {
            return Err(VeilrouteError::BatchAlreadyClosed(self.current));
        }
        self.phase = BatchPhase::Closed;
        tracing::debug!(batch_id = %self.current, "Batch closed");
        Ok(RouterEvent::BatchClosed {
            batch_id: self.current,
        })
    }

    /// The open batch id, for writers.
    ///
    /// # Errors
    /// `BatchNotOpen` while closed.
    pub fn require_open(&self) -> Result<BatchId> {
        if self.is_open() {
            Ok(self.current)
        } else {
            Err(VeilrouteError::BatchNotOpen(self.current))
        }
    }

    /// # Errors
    /// `InvalidBatchId` unless `batch_id` is the current batch.
    pub fn require_current(&self, batch_id: BatchId) -> Result<()> {
        if batch_id == self.current {
            Ok(())
        } else {
            Err(VeilrouteError::InvalidBatchId {
                requested: batch_id,
                current: self.current,
            })
        }
    }

    #[must_use]
    pub fn current_batch_id(&self) -> BatchId {
        self.current
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.phase == BatchPhase::Open
    }

    #[must_use]
    pub fn phase(&self) -> BatchPhase {
        self.phase
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed_at_reserved_id() {
        let lc = BatchLifecycle::new();
        assert_eq!(lc.current_batch_id(), BatchId(1));
        assert_eq!(lc.phase(), BatchPhase::Closed);
        assert!(!lc.is_open());
    }

    #[test]
    fn first_open_is_batch_two() {
        let mut lc = BatchLifecycle::new();
        let ev = lc.open().unwrap();
        assert_eq!(ev, RouterEvent::BatchOpened { batch_id: BatchId(2) });
        assert!(lc.is_open());
    }

    #[test]
    fn open_close_alternate_and_ids_advance_on_open_only() {
        let mut lc = BatchLifecycle::new();
        for expected in 2..6 {
            lc.open().unwrap();
            assert_eq!(lc.current_batch_id(), BatchId(expected));
            assert!(matches!(lc.open(), Err(VeilrouteError::BatchAlreadyOpen(_))));
            let ev = lc.close().unwrap();
            assert_eq!(ev, RouterEvent::BatchClosed { batch_id: BatchId(expected) });
            assert_eq!(lc.current_batch_id(), BatchId(expected));
            assert!(matches!(
                lc.close(),
                Err(VeilrouteError::BatchAlreadyClosed(_))
            ));
        }
    }

    #[test]
    fn require_open_and_current() {
        let mut lc = BatchLifecycle::new();
        assert!(matches!(lc.require_open(), Err(VeilrouteError::BatchNotOpen(_))));
        lc.open().unwrap();
        assert_eq!(lc.require_open().unwrap(), BatchId(2));
        assert!(lc.require_current(BatchId(2)).is_ok());
        assert!(matches!(
            lc.require_current(BatchId(1)),
            Err(VeilrouteError::InvalidBatchId {
                requested: BatchId(1),
                current: BatchId(2),
            })
        ));
    }
}
