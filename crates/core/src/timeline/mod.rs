use std::{collections::BTreeSet, time::Duration};

/// Handle of a requested animation frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameHandle(pub u64);

/// Host frame scheduling (`requestAnimationFrame` and friends).
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancelling an unknown or already fired handle is a no-op.
    fn cancel_frame(&mut self, handle: FrameHandle);
}

/// Deterministic scheduler: frames fire only when [`take_due`] is called.
///
/// [`take_due`]: ManualFrameScheduler::take_due
#[derive(Debug, Default)]
pub struct ManualFrameScheduler {
    next_id: u64,
    pending: BTreeSet<FrameHandle>,
    requested: usize,
    cancelled: usize,
}

impl ManualFrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains every pending request, oldest first.
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.contains(&handle)
    }

    /// Total number of frame requests made so far.
    pub fn requested(&self) -> usize {
        self.requested
    }

    pub fn cancelled(&self) -> usize {
        self.cancelled
    }
}

impl FrameScheduler for ManualFrameScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        let handle = FrameHandle(self.next_id);
        self.next_id += 1;
        self.requested += 1;
        self.pending.insert(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if self.pending.remove(&handle) {
            self.cancelled += 1;
        }
    }
}

/// Trailing-edge debounce over host timestamps in milliseconds.
///
/// Each [`trigger`](Self::trigger) replaces the pending deadline, so a burst
/// collapses into one firing once the quiet window has passed.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<f64>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn trigger(&mut self, now_ms: f64) {
        self.deadline = Some(now_ms + self.window.as_millis() as f64);
    }

    /// Returns `true` once when the deadline has been reached.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_frames_never_fire() {
        let mut scheduler = ManualFrameScheduler::new();
        let first = scheduler.request_frame();
        let second = scheduler.request_frame();
        scheduler.cancel_frame(first);
        scheduler.cancel_frame(first);

        assert_eq!(scheduler.take_due(), vec![second]);
        assert_eq!(scheduler.cancelled(), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn bursts_collapse_into_one_trailing_fire() {
        let mut debouncer = Debouncer::new(Duration::from_millis(180));
        debouncer.trigger(0.0);
        debouncer.trigger(100.0);
        debouncer.trigger(150.0);

        assert!(!debouncer.poll(200.0));
        assert!(debouncer.poll(330.0));
        assert!(!debouncer.poll(400.0));
        assert!(!debouncer.is_armed());
    }
}
