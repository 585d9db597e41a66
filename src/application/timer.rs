use futures::channel::oneshot;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

/// Time source for the polling loops.
#[allow(async_fn_in_trait)]
pub trait Timer {
    async fn sleep(&self, duration: Duration);
    fn now_ms(&self) -> u64;
}

/// Deterministic timer: sleeps resolve only when `advance` moves time past their deadline.
#[derive(Clone, Default)]
pub struct ManualTimer {
    inner: Rc<RefCell<ManualTimerState>>,
}

#[derive(Default)]
struct ManualTimerState {
    now_ms: u64,
    sleepers: Vec<(u64, oneshot::Sender<()>)>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward and wake every sleeper whose deadline has passed.
    pub fn advance(&self, duration: Duration) {
        let due = {
            let mut state = self.inner.borrow_mut();
            state.now_ms += duration.as_millis() as u64;
            let now = state.now_ms;
            let (due, pending): (Vec<_>, Vec<_>) =
                state.sleepers.drain(..).partition(|(deadline, _)| *deadline <= now);
            state.sleepers = pending;
            due
        };
        for (_, waker) in due {
            let _ = waker.send(());
        }
    }

    pub fn pending_sleepers(&self) -> usize {
        self.inner.borrow().sleepers.len()
    }
}

impl Timer for ManualTimer {
    async fn sleep(&self, duration: Duration) {
        let (tx, rx) = oneshot::channel();
        {
            let mut state = self.inner.borrow_mut();
            let deadline = state.now_ms + duration.as_millis() as u64;
            state.sleepers.push((deadline, tx));
        }
        let _ = rx.await;
    }

    fn now_ms(&self) -> u64 {
        self.inner.borrow().now_ms
    }
}
