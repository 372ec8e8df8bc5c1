use crate::sync::{Mutex, MutexGuard};
use std::collections::VecDeque;
use std::fmt;

type OnChange<T> = Box<dyn Fn(&T) + Send + Sync>;

/// A value guarded by a short critical section that announces every write.
///
/// Writes are committed under the cell's lock and queued for delivery in
/// commit order. Delivery happens with the lock released, so the callback may
/// read the cell, or write it again; a nested write is queued behind the one
/// being delivered instead of recursing. Whichever writer finds the queue idle
/// drains it, which means a callback can run on a different writer thread
/// than the one that committed its value.
pub struct AtomicStateCell<T> {
    inner: Mutex<CellState<T>>,
    on_change: OnChange<T>,
}

struct CellState<T> {
    value: T,
    pending: VecDeque<T>,
    delivering: bool,
}

impl<T: Clone> AtomicStateCell<T> {
    pub fn new<F>(initial: T, on_change: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        Self {
            inner: Mutex::new(CellState {
                value: initial,
                pending: VecDeque::new(),
                delivering: false,
            }),
            on_change: Box::new(on_change),
        }
    }

    pub fn read(&self) -> T {
        self.lock().value.clone()
    }

    /// Commits `value` and delivers every queued notification.
    pub fn write(&self, value: T) {
        let state = self.commit_locked(value);
        self.drain(state);
    }

    /// Commits `value` and queues its notification without delivering it.
    ///
    /// Lets a caller commit while holding one of its own locks and deliver
    /// with [`AtomicStateCell::flush`] once that lock is released. Any
    /// concurrent writer may deliver it first.
    pub fn commit(&self, value: T) {
        drop(self.commit_locked(value));
    }

    /// Delivers queued notifications unless another thread already is.
    pub fn flush(&self) {
        let state = self.lock();
        self.drain(state);
    }

    fn commit_locked(&self, value: T) -> MutexGuard<'_, CellState<T>> {
        let mut state = self.lock();
        state.value = value.clone();
        state.pending.push_back(value);
        state
    }

    fn drain<'a>(&'a self, mut state: MutexGuard<'a, CellState<T>>) {
        if state.delivering || state.pending.is_empty() {
            return;
        }
        state.delivering = true;

        let guard = DeliveryGuard { cell: self };
        loop {
            let next = state.pending.pop_front();
            let Some(next) = next else {
                break;
            };
            drop(state);
            (self.on_change)(&next);
            state = self.lock();
        }
        state.delivering = false;
        drop(state);
        drop(guard);
    }

    fn lock(&self) -> MutexGuard<'_, CellState<T>> {
        self.inner.lock().expect("state cell mutex poisoned")
    }
}

// Releases the delivery slot if a callback unwinds, so later writers drain
// whatever is still queued.
struct DeliveryGuard<'a, T> {
    cell: &'a AtomicStateCell<T>,
}

impl<T> Drop for DeliveryGuard<'_, T> {
    fn drop(&mut self) {
        if !std::thread::panicking() {
            return;
        }
        if let Ok(mut state) = self.cell.inner.lock() {
            state.delivering = false;
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for AtomicStateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.lock() {
            Ok(state) => f.debug_struct("AtomicStateCell").field("value", &state.value).finish(),
            Err(_) => f.debug_struct("AtomicStateCell").field("value", &"<poisoned>").finish(),
        }
    }
}
