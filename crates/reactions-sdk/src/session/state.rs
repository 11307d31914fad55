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

use tracing::warn;

use crate::{
    catalog::ReactionCatalog,
    identifiers::{ChatId, ReactionId, ReactionSet},
};

/// The enabled reactions of a chat, as edited in one session.
///
/// The `baseline` is the set last confirmed as stored on the server, the
/// `working` set is what the user is editing. Only a successful push moves the
/// baseline, and only the [`ToggleController`](super::ToggleController) edits
/// the working set.
#[derive(Clone, Debug)]
pub struct ChatReactionConfig {
    chat_id: ChatId,
    baseline: ReactionSet,
    working: ReactionSet,
}

impl ChatReactionConfig {
    /// Start editing from the enabled reactions the server has for this chat.
    ///
    /// Reactions that aren't part of the catalog can't be enabled, so they're
    /// dropped from both sets.
    pub(crate) fn new(
        chat_id: ChatId,
        enabled: impl IntoIterator<Item = ReactionId>,
        catalog: &ReactionCatalog,
    ) -> Self {
        let mut baseline = ReactionSet::new();

        for reaction in enabled {
            if catalog.contains(reaction.as_str()) {
                baseline.insert(reaction);
            } else {
                warn!(%chat_id, %reaction, "enabled reaction isn't in the catalog, dropping it");
            }
        }

        Self { chat_id, working: baseline.clone(), baseline }
    }

    /// The chat being configured.
    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    /// The enabled reactions last confirmed by the server.
    pub fn baseline(&self) -> &ReactionSet {
        &self.baseline
    }

    /// The enabled reactions, as currently edited.
    pub fn working(&self) -> &ReactionSet {
        &self.working
    }

    /// Whether reactions are enabled at all in the chat, i.e. the state of the
    /// master switch.
    pub fn master_enabled(&self) -> bool {
        !self.working.is_empty()
    }

    /// Whether the given reaction is enabled in the working set.
    pub fn is_enabled(&self, reaction: &str) -> bool {
        self.working.contains(reaction)
    }

    pub(super) fn working_mut(&mut self) -> &mut ReactionSet {
        &mut self.working
    }

    /// Record that `pushed` is now stored on the server.
    pub(super) fn confirm(&mut self, pushed: ReactionSet) {
        self.baseline = pushed;
    }
}
