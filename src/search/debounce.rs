//! Search input debouncing.
//!
//! Each edit schedules a parse-and-notify after a quiet period; an edit that
//! arrives while one is pending replaces it. The [`Debouncer`] is a plain state
//! machine over millisecond timestamps supplied by a [`Clock`], so the host
//! decides how timers are driven (Zellij `Timer` events in the plugin, a
//! [`ManualClock`] in tests).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Default quiet period before a search edit is applied.
pub const DEFAULT_DEBOUNCE_MS: u64 = 300;

/// Monotonic millisecond time source.
pub trait Clock: fmt::Debug + Send + Sync {
    /// Milliseconds since an arbitrary fixed origin.
    fn now_ms(&self) -> u64;
}

/// [`Clock`] backed by [`Instant`].
#[derive(Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Hand-driven [`Clock`] for tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Moves the clock forward by `ms`.
    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    /// Sets the clock to an absolute value.
    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pending {
    value: String,
    due_ms: u64,
}

/// Coalesces rapid search edits into one delayed notification.
///
/// # Example
///
/// ```rust
/// use listgrid::search::Debouncer;
///
/// let mut debouncer = Debouncer::new(300);
/// debouncer.schedule("a", 0);
/// debouncer.schedule("ab", 100);
/// debouncer.schedule("abc", 200);
///
/// assert_eq!(debouncer.poll(400), None);
/// assert_eq!(debouncer.poll(500), Some("abc".to_string()));
/// assert_eq!(debouncer.poll(900), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    delay_ms: u64,
    pending: Option<Pending>,
    generation: u64,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl Debouncer {
    #[must_use]
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
            generation: 0,
        }
    }

    #[must_use]
    pub const fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Number of schedules so far. Bumps on every [`Debouncer::schedule`].
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Replaces any pending value with `value`, due `delay_ms` after `now_ms`.
    ///
    /// Returns the new generation.
    pub fn schedule(&mut self, value: impl Into<String>, now_ms: u64) -> u64 {
        self.generation += 1;
        self.pending = Some(Pending {
            value: value.into(),
            due_ms: now_ms.saturating_add(self.delay_ms),
        });
        self.generation
    }

    /// Takes the pending value if it is due at `now_ms`.
    pub fn poll(&mut self, now_ms: u64) -> Option<String> {
        if self.pending.as_ref()?.due_ms > now_ms {
            return None;
        }
        self.pending.take().map(|p| p.value)
    }

    /// Milliseconds until the pending value is due, if any.
    #[must_use]
    pub fn time_until_due(&self, now_ms: u64) -> Option<u64> {
        self.pending
            .as_ref()
            .map(|p| p.due_ms.saturating_sub(now_ms))
    }

    /// Drops the pending value. Returns whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rapid_edits_collapse_into_last_value() {
        let mut debouncer = Debouncer::new(300);
        let mut fired = Vec::new();

        for (i, value) in ["s", "st", "sta", "stat"].into_iter().enumerate() {
            let now = i as u64 * 50;
            debouncer.schedule(value, now);
            fired.extend(debouncer.poll(now));
        }
        for now in (150..1000).step_by(50) {
            fired.extend(debouncer.poll(now));
        }

        assert_eq!(fired, vec!["stat".to_string()]);
        assert_eq!(debouncer.generation(), 4);
    }

    #[test]
    fn separate_quiet_periods_fire_separately() {
        let mut debouncer = Debouncer::new(100);
        debouncer.schedule("a", 0);
        assert_eq!(debouncer.poll(100), Some("a".to_string()));
        debouncer.schedule("b", 500);
        assert_eq!(debouncer.time_until_due(550), Some(50));
        assert_eq!(debouncer.poll(600), Some("b".to_string()));
    }

    #[test]
    fn cancel_prevents_late_fire() {
        let mut debouncer = Debouncer::new(100);
        debouncer.schedule("query", 0);
        assert!(debouncer.cancel());
        assert_eq!(debouncer.poll(1_000), None);
        assert!(!debouncer.cancel());
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::default();
        clock.advance(120);
        clock.advance(30);
        assert_eq!(clock.now_ms(), 150);
        clock.set(10);
        assert_eq!(clock.now_ms(), 10);
    }
}
