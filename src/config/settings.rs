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

//! Engine settings

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::keys::Platform;

/// Default idle window between two steps of a sequence
pub const DEFAULT_SEQUENCE_TIMEOUT_MS: u64 = 1000;

/// Default delay of the reset that follows a completed sequence
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 10;

/// Tunables of one engine instance
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Idle time after which partially typed sequences are forgotten
    pub sequence_timeout_ms: u64,

    /// Delay of the full reset after a sequence completes
    pub settle_delay_ms: u64,

    /// Platform used to resolve `mod` and hint glyphs
    pub platform: Platform,
}

impl EngineConfig {
    pub fn sequence_timeout(&self) -> Duration {
        Duration::from_millis(self.sequence_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Same settings for another platform (builder pattern)
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sequence_timeout_ms: DEFAULT_SEQUENCE_TIMEOUT_MS,
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            platform: Platform::current(),
        }
    }
}
