use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

use tokio::sync::Notify;

/// The player asked for the current position to be annotated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkRequested {
    pub position: f64,
}

struct MarkSlot {
    slot: Mutex<Option<MarkRequested>>,
    notify: Notify,
    senders: AtomicUsize,
}

impl MarkSlot {
    fn take(&self) -> Option<MarkRequested> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Single-slot channel: a mark sent before the previous one was received
/// replaces it.
pub fn mark_channel() -> (MarkSender, MarkReceiver) {
    let inner = Arc::new(MarkSlot {
        slot: Mutex::new(None),
        notify: Notify::new(),
        senders: AtomicUsize::new(1),
    });
    (
        MarkSender {
            inner: Arc::clone(&inner),
        },
        MarkReceiver { inner },
    )
}

pub struct MarkSender {
    inner: Arc<MarkSlot>,
}

impl MarkSender {
    pub fn send(&self, mark: MarkRequested) {
        *self
            .inner
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(mark);
        self.inner.notify.notify_one();
    }
}

impl Clone for MarkSender {
    fn clone(&self) -> Self {
        self.inner.senders.fetch_add(1, Ordering::AcqRel);
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Drop for MarkSender {
    fn drop(&mut self) {
        if self.inner.senders.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.notify.notify_one();
        }
    }
}

pub struct MarkReceiver {
    inner: Arc<MarkSlot>,
}

impl MarkReceiver {
    pub fn try_recv(&self) -> Option<MarkRequested> {
        self.inner.take()
    }

    /// Wait for the next mark. Returns `None` once every sender is gone and
    /// nothing is left in the slot.
    pub async fn recv(&mut self) -> Option<MarkRequested> {
        loop {
            if let Some(mark) = self.inner.take() {
                return Some(mark);
            }
            if self.inner.senders.load(Ordering::Acquire) == 0 {
                return None;
            }
            self.inner.notify.notified().await;
        }
    }
}
