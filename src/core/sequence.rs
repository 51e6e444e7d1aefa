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

//! src/core/sequence.rs
//!
//! Sequence progress tracking
//!
//! Every registered sequence has a level: how many of its steps have been
//! typed so far (0 = not started). Several sequences may share a prefix
//! and progress together.
//!
//! # Resets
//! - A non-modifier event of the expected phase resets every sequence it
//!   did not advance ("h e a r t" does not complete "h a t").
//! - Every advance re-arms an idle deadline; when it expires all levels
//!   go back to 0.
//! - A completed sequence drops to 0 at once, and a short settle deadline
//!   resets everything shortly after.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use crate::core::timer::Deadline;
use crate::core::types::Phase;

/// Per-engine sequence state
#[derive(Clone, Debug)]
pub struct SequenceTracker {
    levels: HashMap<String, usize>,

    /// Phase of the next step of the sequences in progress
    expected: Option<Phase>,

    idle: Deadline,
    settle: Deadline,
    timeout: Duration,
    settle_delay: Duration,

    /// Character whose next up event must not fire anything
    ignore_next_up: Option<String>,

    /// The previous down event advanced a sequence
    ignore_next_press: bool,
}

impl SequenceTracker {
    pub fn new(timeout: Duration, settle_delay: Duration) -> Self {
        Self {
            levels: HashMap::new(),
            expected: None,
            idle: Deadline::default(),
            settle: Deadline::default(),
            timeout,
            settle_delay,
            ignore_next_up: None,
            ignore_next_press: false,
        }
    }

    /// Start tracking a sequence at level 0
    pub fn register(&mut self, sequence: &str) {
        self.levels.insert(sequence.to_string(), 0);
    }

    /// Stop tracking a sequence
    pub fn forget(&mut self, sequence: &str) {
        self.levels.remove(sequence);
    }

    /// Current level of a sequence (0 for unknown sequences)
    pub fn level(&self, sequence: &str) -> usize {
        self.levels.get(sequence).copied().unwrap_or(0)
    }

    /// Phase the next step of an in-progress sequence listens on
    pub fn expected_phase(&self) -> Option<Phase> {
        self.expected
    }

    /// True when at least one sequence is part-way through
    pub fn in_progress(&self) -> bool {
        self.levels.values().any(|level| *level > 0)
    }

    /// Record that a non-final step of `sequence` matched
    pub fn advance(&mut self, sequence: &str, next_phase: Phase, now: Duration) {
        self.expected = Some(next_phase);
        let level = self.levels.entry(sequence.to_string()).or_insert(0);
        *level += 1;
        tracing::trace!(sequence, level = *level, "sequence advanced");

        self.idle.arm(now, self.timeout);
    }

    /// Record that the final step of `sequence` fired
    pub fn complete(&mut self, sequence: &str, now: Duration) {
        if let Some(level) = self.levels.get_mut(sequence) {
            *level = 0;
        }
        tracing::trace!(sequence, "sequence completed");

        self.settle.arm(now, self.settle_delay);
    }

    /// Reset every sequence not in `keep`
    ///
    /// Clears the expected phase when nothing is left in progress.
    pub fn reset_except(&mut self, keep: &HashSet<String>) {
        let mut active = false;

        for (sequence, level) in self.levels.iter_mut() {
            if keep.contains(sequence) {
                active |= *level > 0;
                continue;
            }
            *level = 0;
        }

        if !active {
            self.expected = None;
        }
    }

    /// Reset every sequence
    pub fn reset_all(&mut self) {
        self.reset_except(&HashSet::new());
    }

    /// Run due deadlines; returns true if anything was reset
    pub fn poll(&mut self, now: Duration) -> bool {
        let settled = self.settle.take_due(now);
        let idled = self.idle.take_due(now);

        if settled || idled {
            tracing::trace!(settled, idled, "sequence deadline reached, resetting");
            self.reset_all();
        }

        settled || idled
    }

    /// Earliest pending deadline, if any
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.idle.due_at(), self.settle.due_at()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Swallow the next up event for `character`
    pub fn suppress_next_up(&mut self, character: &str) {
        self.ignore_next_up = Some(character.to_string());
    }

    /// Consume the up suppression if it is for `character`
    pub fn take_suppressed_up(&mut self, character: &str) -> bool {
        if self.ignore_next_up.as_deref() == Some(character) {
            self.ignore_next_up = None;
            return true;
        }
        false
    }

    pub fn ignore_next_press(&self) -> bool {
        self.ignore_next_press
    }

    pub fn set_ignore_next_press(&mut self, ignore: bool) {
        self.ignore_next_press = ignore;
    }

    /// Drop all sequences, flags and pending deadlines
    pub fn clear(&mut self) {
        self.levels.clear();
        self.expected = None;
        self.idle.cancel();
        self.settle.cancel();
        self.ignore_next_up = None;
        self.ignore_next_press = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> SequenceTracker {
        SequenceTracker::new(Duration::from_secs(1), Duration::from_millis(10))
    }

    #[test]
    fn test_advance_and_level() {
        let mut t = tracker();
        t.register("g i");

        t.advance("g i", Phase::Press, Duration::ZERO);
        assert_eq!(t.level("g i"), 1);
        assert_eq!(t.expected_phase(), Some(Phase::Press));
        assert!(t.in_progress());
    }

    #[test]
    fn test_reset_except_keeps_advanced() {
        let mut t = tracker();
        t.register("g i");
        t.register("g t");
        t.advance("g i", Phase::Press, Duration::ZERO);
        t.advance("g t", Phase::Press, Duration::ZERO);

        let keep: HashSet<String> = ["g i".to_string()].into_iter().collect();
        t.reset_except(&keep);

        assert_eq!(t.level("g i"), 1);
        assert_eq!(t.level("g t"), 0);
        assert_eq!(t.expected_phase(), Some(Phase::Press));
    }

    #[test]
    fn test_reset_all_clears_expected() {
        let mut t = tracker();
        t.register("g i");
        t.advance("g i", Phase::Press, Duration::ZERO);

        t.reset_all();
        assert_eq!(t.level("g i"), 0);
        assert_eq!(t.expected_phase(), None);
    }

    #[test]
    fn test_idle_deadline_resets() {
        let mut t = tracker();
        t.register("g i");
        t.advance("g i", Phase::Press, Duration::ZERO);

        assert!(!t.poll(Duration::from_millis(900)));
        assert_eq!(t.level("g i"), 1);

        assert!(t.poll(Duration::from_millis(1000)));
        assert_eq!(t.level("g i"), 0);
    }

    #[test]
    fn test_advance_rearms_idle() {
        let mut t = tracker();
        t.register("a b c");
        t.advance("a b c", Phase::Press, Duration::ZERO);
        t.advance("a b c", Phase::Press, Duration::from_millis(800));

        assert!(!t.poll(Duration::from_millis(1500)));
        assert_eq!(t.level("a b c"), 2);
        assert_eq!(t.next_deadline(), Some(Duration::from_millis(1800)));
    }

    #[test]
    fn test_complete_resets_level_and_arms_settle() {
        let mut t = tracker();
        t.register("g i");
        t.advance("g i", Phase::Press, Duration::ZERO);
        t.complete("g i", Duration::from_millis(100));

        assert_eq!(t.level("g i"), 0);
        assert_eq!(t.next_deadline(), Some(Duration::from_millis(110)));
    }

    #[test]
    fn test_up_suppression_is_single_use() {
        let mut t = tracker();
        t.suppress_next_up("i");

        assert!(!t.take_suppressed_up("x"));
        assert!(t.take_suppressed_up("i"));
        assert!(!t.take_suppressed_up("i"));
    }
}
