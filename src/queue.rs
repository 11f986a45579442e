//! Blocking FIFO hand-off between one producer and one consumer.
//!
//! A [`MessageQueue`] owns one list inside a shared [`Arena`] and adds the
//! two synchronization pieces the list itself does not have: a mutex (the
//! same one guarding the arena pools, since the list lives in the arena)
//! and a not-empty signal for the consumer to park on.
//!
//! Ordering comes from the list engine: `push` prepends at the head and
//! `pop` trims from the tail, so the oldest message always leaves first.
//!
//! The not-empty signal is only raised when the queue goes from empty to
//! non-empty. That is sufficient because each queue has exactly one
//! consumer; multiple consumers would need a signal on every push.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use tokio::sync::Notify;

use crate::{
    arena::{Arena, ListId, ListPoolExhausted, PoolExhausted},
    list::Disposer,
};

/// The arena all queues of one session allocate from. The mutex is the
/// process-wide pool lock; it doubles as each queue's list lock because a
/// list is only ever touched through its owning queue.
pub type SharedArena<T> = Arc<Mutex<Arena<T>>>;

/// FIFO queue between exactly one producer task and one consumer task.
pub struct MessageQueue<T> {
    arena: SharedArena<T>,
    list: ListId,
    not_empty: Notify,
    closed: AtomicBool,
}

impl<T> MessageQueue<T> {
    /// Draws a fresh list from the shared arena. Failing to get a header is
    /// a setup error; the caller treats it as fatal.
    pub fn new(arena: SharedArena<T>) -> Result<Self, ListPoolExhausted> {
        let list = arena.lock().unwrap().create_list()?;
        Ok(Self {
            arena,
            list,
            not_empty: Notify::new(),
            closed: AtomicBool::new(false),
        })
    }

    /// Messages currently waiting.
    pub fn len(&self) -> usize {
        let arena = self.arena.lock().unwrap();
        arena.len(self.list)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enqueues a message. On pool exhaustion the message comes back in the
    /// error and nothing is queued; the producer reports and drops it.
    pub fn push(&self, item: T) -> Result<(), PoolExhausted<T>> {
        let became_nonempty = {
            let mut arena = self.arena.lock().unwrap();
            arena.push_front(self.list, item)?;
            arena.len(self.list) == 1
        };
        if became_nonempty {
            self.not_empty.notify_one();
        }
        Ok(())
    }

    /// Dequeues the oldest message, suspending while the queue is empty.
    /// Returns `None` once the queue has been closed and drained.
    pub async fn pop(&self) -> Option<T> {
        loop {
            {
                let mut arena = self.arena.lock().unwrap();
                if let Some(item) = arena.pop_back(self.list) {
                    return Some(item);
                }
            }
            if self.closed.load(Ordering::Acquire) {
                return None;
            }
            self.not_empty.notified().await;
        }
    }

    /// Wakes a consumer blocked in [`MessageQueue::pop`] and makes further
    /// empty pops return `None`. The cooperative replacement for cancelling
    /// a thread mid-wait: no lock is held across the hand-off.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.not_empty.notify_one();
    }

    /// Closes the queue, runs every undelivered message through `disposer`,
    /// and returns the underlying list to the arena.
    ///
    /// Takes the queue by value: both worker tasks must have finished with
    /// their handles by the time the session tears the queue down.
    pub fn shutdown(self, disposer: &mut impl Disposer<T>) {
        self.close();
        let mut arena = self.arena.lock().unwrap();
        arena.destroy_list(self.list, disposer);
    }
}
