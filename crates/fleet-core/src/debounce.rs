use chrono::{DateTime, Duration, Utc};

pub const SEARCH_DEBOUNCE_MS: i64 = 150;

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingValue<T> {
    value: T,
    due_at: DateTime<Utc>,
}

/// Trailing-edge debounce. Every `set` restarts the quiet window; `poll`
/// publishes the latest input once the window has elapsed. The clock is
/// supplied by the caller so the owning event loop decides when timers fire.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    current: T,
    pending: Option<PendingValue<T>>,
}

impl<T: Clone + PartialEq> Debouncer<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            current: initial,
            pending: None,
        }
    }

    pub fn with_delay_ms(initial: T, delay_ms: i64) -> Self {
        Self::new(initial, Duration::milliseconds(delay_ms))
    }

    pub fn set(&mut self, value: T, now: DateTime<Utc>) {
        self.pending = Some(PendingValue {
            value,
            due_at: now + self.delay,
        });
    }

    /// Returns the newly published value when the quiet window has elapsed.
    /// A pending value equal to the current one is dropped without emitting.
    pub fn poll(&mut self, now: DateTime<Utc>) -> Option<&T> {
        let due = matches!(&self.pending, Some(pending) if pending.due_at <= now);
        if !due {
            return None;
        }
        let pending = self.pending.take()?;
        if pending.value == self.current {
            return None;
        }
        self.current = pending.value;
        Some(&self.current)
    }

    pub fn value(&self) -> &T {
        &self.current
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops any pending value so nothing is published after teardown.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
