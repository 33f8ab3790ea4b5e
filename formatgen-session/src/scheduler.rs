//! Generation scheduler.
//!
//! Owns the pending set and the flush state machine:
//!
//! ```text
//! Idle -> Accumulating -> FlushRequested -> Flushing -> Idle
//! ```
//!
//! The pending set and the state share one lock, so "check membership, then
//! insert" and every transition are single critical sections. Host
//! callbacks are made after the lock is released.

use crate::host::{HostEnvironment, HostMode};
use crate::pending::PendingSet;
use formatgen_schema::TypeRef;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchedulerState {
    /// Nothing pending.
    Idle,
    /// Types pending, no deferred flush registered.
    Accumulating,
    /// A deferred flush is registered with the host.
    FlushRequested,
    /// A flush is emitting a snapshot of the pending set.
    Flushing,
}

struct SchedulerInner {
    state: SchedulerState,
    pending: PendingSet,
    /// Types enqueued while flushing, which need a flush of their own.
    arrived_during_flush: bool,
}

/// Batches pending types and decides when they are flushed.
pub struct Scheduler {
    inner: Mutex<SchedulerInner>,
    host: Arc<dyn HostEnvironment>,
}

impl Scheduler {
    /// Creates an idle scheduler reporting to `host`.
    #[must_use]
    pub fn new(host: Arc<dyn HostEnvironment>) -> Self {
        Self {
            inner: Mutex::new(SchedulerInner {
                state: SchedulerState::Idle,
                pending: PendingSet::new(),
                arrived_during_flush: false,
            }),
            host,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.inner.lock().state
    }

    /// Returns true if `ty` is pending.
    #[must_use]
    pub fn contains(&self, ty: &TypeRef) -> bool {
        self.inner.lock().pending.contains(ty)
    }

    /// Returns the pending types in insertion order.
    #[must_use]
    pub fn pending(&self) -> Vec<TypeRef> {
        self.inner.lock().pending.snapshot()
    }

    /// Returns the number of pending types.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Adds `ty` to the pending set.
    ///
    /// # Returns
    /// `false` if the type was already pending.
    pub fn try_enqueue(&self, ty: TypeRef) -> bool {
        let mut inner = self.inner.lock();
        if inner.pending.contains(&ty) {
            return false;
        }
        debug!("Enqueue {}", ty);
        inner.pending.insert(ty);
        match inner.state {
            SchedulerState::Idle => {
                debug!("Scheduler: Idle -> Accumulating");
                inner.state = SchedulerState::Accumulating;
            }
            SchedulerState::Flushing => inner.arrived_during_flush = true,
            SchedulerState::Accumulating | SchedulerState::FlushRequested => {}
        }
        true
    }

    /// Asks for a flush at the host's next idle point.
    ///
    /// Registers at most one deferred trigger. While the host is not
    /// interactive the scheduler keeps accumulating; the mode change back to
    /// interactive flushes instead.
    ///
    /// # Returns
    /// `true` if a trigger was registered with the host.
    pub fn request_flush(&self) -> bool {
        {
            let mut inner = self.inner.lock();
            match inner.state {
                SchedulerState::Accumulating => {
                    if self.host.mode() != HostMode::Interactive {
                        debug!("Host not interactive, deferring flush request");
                        return false;
                    }
                    debug!("Scheduler: Accumulating -> FlushRequested");
                    inner.state = SchedulerState::FlushRequested;
                }
                SchedulerState::Flushing => {
                    inner.arrived_during_flush = true;
                    return false;
                }
                SchedulerState::Idle | SchedulerState::FlushRequested => return false,
            }
        }
        self.host.schedule_flush();
        true
    }

    /// Starts a flush and returns the snapshot to emit.
    ///
    /// Returns `None` if nothing is pending or another flush is running.
    pub fn begin_flush(&self) -> Option<Vec<TypeRef>> {
        self.begin(|_| true)
    }

    /// Starts a flush only if one was requested through the host.
    pub fn begin_requested_flush(&self) -> Option<Vec<TypeRef>> {
        self.begin(|state| state == SchedulerState::FlushRequested)
    }

    fn begin(&self, allowed: impl Fn(SchedulerState) -> bool) -> Option<Vec<TypeRef>> {
        let mut inner = self.inner.lock();
        if inner.state == SchedulerState::Flushing || !allowed(inner.state) {
            return None;
        }
        if inner.pending.is_empty() {
            inner.state = SchedulerState::Idle;
            return None;
        }
        debug!("Scheduler: {:?} -> Flushing ({} types)", inner.state, inner.pending.len());
        inner.state = SchedulerState::Flushing;
        inner.arrived_during_flush = false;
        Some(inner.pending.snapshot())
    }

    /// Ends a flush, removing the types that were generated.
    ///
    /// Failed types stay pending.
    ///
    /// # Returns
    /// `true` if types arrived during the flush and another flush was
    /// requested for them.
    pub fn finish_flush(&self, completed: &[TypeRef]) -> bool {
        let reschedule = {
            let mut inner = self.inner.lock();
            for ty in completed {
                inner.pending.remove(ty);
            }
            inner.state = if inner.pending.is_empty() {
                SchedulerState::Idle
            } else {
                SchedulerState::Accumulating
            };
            debug!("Scheduler: Flushing -> {:?}", inner.state);
            std::mem::take(&mut inner.arrived_during_flush)
                && inner.state == SchedulerState::Accumulating
        };
        reschedule && self.request_flush()
    }
}
