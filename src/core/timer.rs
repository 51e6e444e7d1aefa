// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Clocks and cancellable deadlines
//!
//! The engine never sleeps. Deferred work (sequence idle reset, the short
//! reset after a completed sequence) is stored as a `Deadline` and run by
//! the engine itself before it dispatches the next event, or when the host
//! calls `Engine::poll`. Timers therefore never run concurrently with a
//! dispatch.
//!
//! Time comes from an injected `Clock`, so tests can use `ManualClock`
//! and move time forward explicitly.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of monotonic time, measured from an arbitrary origin
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock backed by `Instant`
#[derive(Clone, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock
///
/// Clones share the same time, so a test can keep one handle while the
/// engine owns another.
///
/// ```
/// use keytrap::core::timer::{Clock, ManualClock};
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance(Duration::from_millis(250));
/// assert_eq!(clock.now(), Duration::from_millis(250));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// A single cancellable scheduled task
///
/// Arming replaces any pending deadline. A deadline fires at most once.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Deadline {
    at: Option<Duration>,
}

impl Deadline {
    /// Schedule the deadline `after` from `now`, cancelling any pending one
    pub fn arm(&mut self, now: Duration, after: Duration) {
        self.at = Some(now + after);
    }

    /// Cancel the pending deadline, if any
    pub fn cancel(&mut self) {
        self.at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.at.is_some()
    }

    /// When the deadline is due, if armed
    pub fn due_at(&self) -> Option<Duration> {
        self.at
    }

    /// Consume the deadline if it is due at `now`
    pub fn take_due(&mut self, now: Duration) -> bool {
        match self.at {
            Some(at) if at <= now => {
                self.at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_fires_once() {
        let mut deadline = Deadline::default();
        deadline.arm(Duration::ZERO, Duration::from_secs(1));

        assert!(!deadline.take_due(Duration::from_millis(999)));
        assert!(deadline.take_due(Duration::from_secs(1)));
        assert!(!deadline.take_due(Duration::from_secs(5)));
    }

    #[test]
    fn test_rearm_replaces_pending() {
        let mut deadline = Deadline::default();
        deadline.arm(Duration::ZERO, Duration::from_secs(1));
        deadline.arm(Duration::from_millis(800), Duration::from_secs(1));

        assert!(!deadline.take_due(Duration::from_millis(1500)));
        assert!(deadline.take_due(Duration::from_millis(1800)));
    }

    #[test]
    fn test_cancel() {
        let mut deadline = Deadline::default();
        deadline.arm(Duration::ZERO, Duration::from_millis(10));
        deadline.cancel();

        assert!(!deadline.is_armed());
        assert!(!deadline.take_due(Duration::from_secs(1)));
    }
}
