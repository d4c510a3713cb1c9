//! Delivery of operation outcomes across execution contexts
//!
//! Network tasks run on the tokio runtime; completion callbacks must run on
//! the caller's own thread, and must never run at all once the caller is
//! gone. [`CallbackBridge`] carries exactly one [`Outcome`] from a worker
//! task to an [`OwnerContext`], or discards it if the context was dropped
//! mid-flight.

use std::sync::{Arc, Mutex, Weak};

use tokio::sync::mpsc;

use crate::twitch::Outcome;

type OwnerTask = Box<dyn FnOnce() + Send>;

/// A bridge slot that can be cleared when its owner goes away.
trait RevokeTarget: Send + Sync {
    fn revoke(&self);
}

struct OwnerShared {
    task_tx: mpsc::UnboundedSender<OwnerTask>,
    observers: Mutex<Vec<Weak<dyn RevokeTarget>>>,
}

/// The caller-side execution context that completion callbacks run on.
///
/// The owning code drains the queue from its own thread or event loop via
/// [`dispatch_pending`](OwnerContext::dispatch_pending) or
/// [`dispatch_next`](OwnerContext::dispatch_next). Dropping the context
/// revokes every bridge bound to it: outcomes still in flight are discarded
/// instead of being delivered to a dead owner, and already-queued callbacks
/// are dropped unexecuted.
pub struct OwnerContext {
    shared: Arc<OwnerShared>,
    task_rx: mpsc::UnboundedReceiver<OwnerTask>,
}

impl OwnerContext {
    pub fn new() -> Self {
        let (task_tx, task_rx) = mpsc::unbounded_channel();
        Self {
            shared: Arc::new(OwnerShared {
                task_tx,
                observers: Mutex::new(Vec::new()),
            }),
            task_rx,
        }
    }

    /// Returns a handle used to bind bridges to this context
    pub fn handle(&self) -> OwnerHandle {
        OwnerHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Runs every callback queued so far and returns how many ran
    pub fn dispatch_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(task) = self.task_rx.try_recv() {
            task();
            ran += 1;
        }
        ran
    }

    /// Waits for the next queued callback and runs it
    pub async fn dispatch_next(&mut self) {
        if let Some(task) = self.task_rx.recv().await {
            task();
        }
    }
}

impl Default for OwnerContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for OwnerContext {
    fn drop(&mut self) {
        let observers = std::mem::take(&mut *self.shared.observers.lock().unwrap());
        for slot in observers {
            if let Some(slot) = slot.upgrade() {
                slot.revoke();
            }
        }
    }
}

/// Cheap handle used to bind a [`CallbackBridge`] to an [`OwnerContext`]
#[derive(Clone)]
pub struct OwnerHandle {
    shared: Arc<OwnerShared>,
}

struct BridgeTarget<T> {
    task_tx: mpsc::UnboundedSender<OwnerTask>,
    callback: Box<dyn FnOnce(Outcome<T>) + Send>,
}

struct BridgeSlot<T> {
    target: Mutex<Option<BridgeTarget<T>>>,
}

impl<T: Send + 'static> RevokeTarget for BridgeSlot<T> {
    fn revoke(&self) {
        // clear-only under the lock; dispatch never happens here
        self.target.lock().unwrap().take();
    }
}

/// Single-use carrier for one operation's outcome.
///
/// Constructed bound to an owner before the asynchronous task starts.
/// [`deliver`](CallbackBridge::deliver) consumes the bridge, so a second
/// delivery is unrepresentable; dropping an undelivered bridge counts as its
/// one discard.
pub struct CallbackBridge<T> {
    slot: Arc<BridgeSlot<T>>,
}

impl<T: Send + 'static> CallbackBridge<T> {
    /// Binds a callback to the owner. The callback runs on the owner's
    /// context, or never runs if the owner is dropped first.
    pub fn new<F>(owner: &OwnerHandle, callback: F) -> Self
    where
        F: FnOnce(Outcome<T>) + Send + 'static,
    {
        let slot = Arc::new(BridgeSlot {
            target: Mutex::new(Some(BridgeTarget {
                task_tx: owner.shared.task_tx.clone(),
                callback: Box::new(callback),
            })),
        });

        let weak: Weak<dyn RevokeTarget> = Arc::downgrade(&slot) as Weak<dyn RevokeTarget>;
        let mut observers = owner.shared.observers.lock().unwrap();
        observers.retain(|observer| observer.strong_count() > 0);
        observers.push(weak);

        Self { slot }
    }

    /// Hands the outcome to the owner's context, or discards it if the owner
    /// no longer exists.
    pub fn deliver(self, outcome: Outcome<T>) {
        // The lock guards only the liveness check and take; it is released
        // before the cross-context handoff.
        let target = self.slot.target.lock().unwrap().take();

        match target {
            Some(BridgeTarget { task_tx, callback }) => {
                if task_tx.send(Box::new(move || callback(outcome))).is_err() {
                    tracing::debug!("owner context shut down, discarding outcome");
                }
            }
            None => tracing::debug!("owner gone, discarding outcome"),
        }
    }
}
