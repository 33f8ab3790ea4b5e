//! Host environment abstraction.
//!
//! The host owns the deferred "run at the next idle point" trigger and the
//! post-write notifications. [`ChannelHost`] delivers them as [`HostSignal`]s
//! over a crossbeam channel so an event loop (or a test) can observe them.

use crossbeam_channel::{Receiver, Sender, unbounded};
use parking_lot::RwLock;
use std::time::Duration;

/// Whether the host can currently act on a deferred flush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostMode {
    /// Editing; deferred triggers fire at the next idle point.
    Interactive,
    /// Running or compiling; flushes wait until control returns.
    NonInteractive,
}

/// Notification sent from a session to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostSignal {
    /// Call `on_idle` at the next idle point.
    ScheduleFlush,
    /// Files were written under the output root.
    RefreshFileIndex,
    /// Generated code must be recompiled.
    ReloadCompiledCode,
}

/// Callbacks a generation session uses to talk to its host.
pub trait HostEnvironment: Send + Sync {
    /// Returns the current host mode.
    fn mode(&self) -> HostMode;

    /// Registers a one-shot deferred flush trigger.
    fn schedule_flush(&self);

    /// Asks the host to rescan the file system.
    fn refresh_file_index(&self);

    /// Asks the host to reload compiled code.
    fn reload_compiled_code(&self);
}

/// Host that forwards every callback over a channel.
pub struct ChannelHost {
    mode: RwLock<HostMode>,
    sender: Sender<HostSignal>,
}

impl ChannelHost {
    /// Creates a host and the receiving end of its signals.
    #[must_use]
    pub fn new(mode: HostMode) -> (Self, HostEvents) {
        let (sender, receiver) = unbounded();
        (
            Self {
                mode: RwLock::new(mode),
                sender,
            },
            HostEvents { receiver },
        )
    }

    /// Sets the host mode.
    ///
    /// Callers forward the change to the session with `on_mode_changed`.
    pub fn set_mode(&self, mode: HostMode) {
        *self.mode.write() = mode;
    }

    fn signal(&self, signal: HostSignal) {
        if self.sender.send(signal).is_err() {
            tracing::debug!("Host receiver dropped, discarding {:?}", signal);
        }
    }
}

impl HostEnvironment for ChannelHost {
    fn mode(&self) -> HostMode {
        *self.mode.read()
    }

    fn schedule_flush(&self) {
        self.signal(HostSignal::ScheduleFlush);
    }

    fn refresh_file_index(&self) {
        self.signal(HostSignal::RefreshFileIndex);
    }

    fn reload_compiled_code(&self) {
        self.signal(HostSignal::ReloadCompiledCode);
    }
}

/// Receiving end of a [`ChannelHost`].
pub struct HostEvents {
    receiver: Receiver<HostSignal>,
}

impl HostEvents {
    /// Non-blocking receive.
    pub fn try_recv(&self) -> Option<HostSignal> {
        self.receiver.try_recv().ok()
    }

    /// Receive with timeout.
    ///
    /// # Returns
    /// `Some(signal)` if received within timeout, `None` otherwise.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<HostSignal> {
        self.receiver.recv_timeout(timeout).ok()
    }

    /// Drains all signals received so far.
    pub fn drain(&self) -> Vec<HostSignal> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of undelivered signals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    /// Returns true if no signals are waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}
