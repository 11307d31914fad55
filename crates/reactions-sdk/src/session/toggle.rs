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

use eyeball::{SharedObservable, Subscriber};
use tracing::{debug, warn};

use super::ChatReactionConfig;
use crate::{
    catalog::ReactionCatalog,
    error::{Error, Result},
    identifiers::ReactionId,
};

/// The position of the "enable reactions" master switch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MasterSwitch {
    /// Reactions are disabled in the chat.
    Off,

    /// At least one reaction is enabled in the chat.
    On,
}

impl MasterSwitch {
    fn of(config: &ChatReactionConfig) -> Self {
        if config.master_enabled() {
            Self::On
        } else {
            Self::Off
        }
    }

    fn flipped(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }

    /// Whether the switch is on.
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

/// What a toggle did to the working set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToggleOutcome {
    /// Whether the toggled reaction is enabled afterwards. For the master
    /// switch, whether the switch is on afterwards.
    pub enabled: bool,

    /// The master switch transition the toggle caused, if any.
    pub transition: Option<MasterSwitch>,
}

enum Edit<'a> {
    Reaction(&'a ReactionId),
    Master,
}

/// Applies the user's edits to the working set of a [`ChatReactionConfig`],
/// keeping the master switch in line with it.
///
/// The master switch is on exactly when at least one reaction is enabled.
/// Switching it on enables the whole catalog, switching it off disables every
/// reaction; there's no memory of a previous selection. The selection list is
/// visible when the switch is on, which is published through
/// [`Self::subscribe_selection_set_visible`].
#[derive(Debug)]
pub struct ToggleController {
    catalog: ReactionCatalog,
    selection_set_visible: SharedObservable<bool>,
}

impl ToggleController {
    pub(crate) fn new(catalog: ReactionCatalog, config: &ChatReactionConfig) -> Self {
        Self { catalog, selection_set_visible: SharedObservable::new(config.master_enabled()) }
    }

    /// The catalog edits are checked against.
    pub fn catalog(&self) -> &ReactionCatalog {
        &self.catalog
    }

    /// Whether the selection list is currently visible.
    pub fn selection_set_visible(&self) -> bool {
        self.selection_set_visible.get()
    }

    /// Subscribe to the visibility of the selection list; a value is
    /// published on every master switch transition.
    pub fn subscribe_selection_set_visible(&self) -> Subscriber<bool> {
        self.selection_set_visible.subscribe()
    }

    /// Enable the reaction if it's disabled, disable it otherwise.
    ///
    /// Disabling the last enabled reaction switches the master switch off;
    /// enabling a reaction while the switch is off switches it on, which
    /// enables the whole catalog.
    pub fn toggle_one(
        &self,
        config: &mut ChatReactionConfig,
        reaction: &ReactionId,
    ) -> Result<ToggleOutcome> {
        if !self.catalog.contains(reaction.as_str()) {
            return Err(Error::InvalidArgument { reaction: reaction.clone() });
        }

        let transition = self.apply(config, Edit::Reaction(reaction));

        Ok(ToggleOutcome { enabled: config.is_enabled(reaction.as_str()), transition })
    }

    /// Flip the master switch.
    pub fn toggle_all(&self, config: &mut ChatReactionConfig) -> ToggleOutcome {
        let transition = self.apply(config, Edit::Master);

        ToggleOutcome { enabled: config.master_enabled(), transition }
    }

    /// The single transition function for every edit.
    ///
    /// A reaction edit may cascade into a master switch transition, never the
    /// other way around.
    fn apply(&self, config: &mut ChatReactionConfig, edit: Edit<'_>) -> Option<MasterSwitch> {
        let before = MasterSwitch::of(config);

        let target = match edit {
            Edit::Reaction(reaction) => {
                let working = config.working_mut();
                if !working.shift_remove(reaction) {
                    working.insert(reaction.clone());
                }
                MasterSwitch::of(config)
            }
            Edit::Master => before.flipped(),
        };

        if target == before {
            return None;
        }

        match target {
            MasterSwitch::On => *config.working_mut() = self.catalog.all(),
            MasterSwitch::Off => config.working_mut().clear(),
        }

        let reached = MasterSwitch::of(config);
        if reached != target {
            warn!(chat_id = %config.chat_id(), "the reactions catalog is empty, nothing to enable");
            return None;
        }

        debug!(chat_id = %config.chat_id(), switch = ?reached, "master switch flipped");
        self.selection_set_visible.set(reached.is_on());

        Some(reached)
    }
}
