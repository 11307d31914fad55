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

//! Comparison of the baseline and working sets of an edit session.
//!
//! The order in which reactions are listed carries no meaning for syncing:
//! two collections holding the same reactions are equal, whatever their
//! order, and duplicates are ignored.

use crate::{
    identifiers::{ReactionId, ReactionSet},
    session::ChatReactionConfig,
};

/// Whether the working set of the session differs from its baseline, i.e.
/// whether it needs to be pushed.
pub fn is_dirty(config: &ChatReactionConfig) -> bool {
    !same_reactions(config.baseline(), config.working())
}

/// Whether two collections hold the same reactions, ignoring order and
/// duplicates.
pub fn same_reactions<'a>(
    left: impl IntoIterator<Item = &'a ReactionId>,
    right: impl IntoIterator<Item = &'a ReactionId>,
) -> bool {
    normalized(left) == normalized(right)
}

fn normalized<'a>(reactions: impl IntoIterator<Item = &'a ReactionId>) -> Vec<&'a ReactionId> {
    let mut reactions: Vec<_> = reactions.into_iter().collect();
    reactions.sort_unstable();
    reactions.dedup();
    reactions
}

/// The reactions enabled and disabled between two sets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReactionSetDiff {
    /// Reactions present in the new set only, in their order there.
    pub added: Vec<ReactionId>,

    /// Reactions present in the old set only, in their order there.
    pub removed: Vec<ReactionId>,
}

impl ReactionSetDiff {
    /// Whether both sets hold the same reactions.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compute what changed from `old` to `new`.
pub fn diff(old: &ReactionSet, new: &ReactionSet) -> ReactionSetDiff {
    ReactionSetDiff {
        added: new.difference(old).cloned().collect(),
        removed: old.difference(new).cloned().collect(),
    }
}
