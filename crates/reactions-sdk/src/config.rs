// Copyright 2026 The Matrix.org Foundation C.I.C.
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

//! Configuration of the [`ReactionSettingsService`](crate::ReactionSettingsService).

/// Settings for the reactions service.
///
/// # Examples
///
/// ```
/// use reactions_sdk::config::ReactionSettingsConfig;
///
/// let config = ReactionSettingsConfig::new().confirm_after_push(false);
/// assert!(!config.confirms_after_push());
/// ```
#[derive(Clone, Debug)]
pub struct ReactionSettingsConfig {
    confirm_after_push: bool,
    update_channel_capacity: usize,
}

impl Default for ReactionSettingsConfig {
    fn default() -> Self {
        Self { confirm_after_push: true, update_channel_capacity: 32 }
    }
}

impl ReactionSettingsConfig {
    /// Create a new default `ReactionSettingsConfig`.
    #[must_use]
    pub fn new() -> Self {
        Default::default()
    }

    /// Whether to read the record back from the server after every successful
    /// push.
    ///
    /// Some servers deliver an outdated copy of the record right after a write;
    /// reading it again gives the shared record cache a chance to converge on
    /// the fresh one. Enabled by default.
    #[must_use]
    pub fn confirm_after_push(mut self, enabled: bool) -> Self {
        self.confirm_after_push = enabled;
        self
    }

    /// Set the capacity of the channel delivering
    /// [`ReconciliationUpdate`](crate::reconciliation::ReconciliationUpdate)s.
    ///
    /// Subscribers lagging behind by more than that miss updates. Must be
    /// greater than zero; defaults to 32.
    #[must_use]
    pub fn update_channel_capacity(mut self, capacity: usize) -> Self {
        self.update_channel_capacity = capacity.max(1);
        self
    }

    /// Whether the record is read back after every successful push.
    pub fn confirms_after_push(&self) -> bool {
        self.confirm_after_push
    }

    /// The capacity of the update channel.
    pub fn channel_capacity(&self) -> usize {
        self.update_channel_capacity
    }
}
