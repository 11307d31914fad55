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

//! Edit sessions.
//!
//! A [`ReactionsEditSession`] is opened when the user starts editing the
//! enabled reactions of a chat. Edits only touch the local working set; the
//! accumulated change is pushed once, by [`ReactionsEditSession::flush`], when
//! the user is done.

use std::{fmt, sync::Arc};

use eyeball::Subscriber;
use tokio::task::spawn;
use tracing::{debug, instrument};

mod state;
mod toggle;

pub use self::{
    state::ChatReactionConfig,
    toggle::{MasterSwitch, ToggleController, ToggleOutcome},
};
use crate::{
    catalog::ReactionCatalog,
    client::{ChatRecord, PeerKind},
    diff::{diff, is_dirty},
    error::{PushError, Result},
    identifiers::{ChatId, ReactionId, SequenceNumber},
    service::{ChatClaim, ServiceInner},
};

/// The result of [`ReactionsEditSession::flush`].
#[derive(Clone, Debug)]
pub enum FlushOutcome {
    /// Nothing changed, nothing was sent.
    Clean,

    /// The working set was pushed and is now the baseline.
    Pushed {
        /// The sequence number of the push.
        sequence: SequenceNumber,
    },

    /// The push failed. The baseline is untouched, and the edit isn't retried.
    PushFailed(Arc<PushError>),
}

/// An open edit session of a chat's enabled reactions.
///
/// Only one session can be open per chat at a time; the chat is released when
/// the session is dropped.
pub struct ReactionsEditSession {
    service: Arc<ServiceInner>,
    config: ChatReactionConfig,
    toggles: ToggleController,
    peer_kind: PeerKind,
    _claim: ChatClaim,
}

#[cfg(not(tarpaulin_include))]
impl fmt::Debug for ReactionsEditSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionsEditSession")
            .field("config", &self.config)
            .field("peer_kind", &self.peer_kind)
            .finish_non_exhaustive()
    }
}

impl ReactionsEditSession {
    pub(crate) fn new(
        service: Arc<ServiceInner>,
        claim: ChatClaim,
        catalog: ReactionCatalog,
        record: ChatRecord,
    ) -> Self {
        let config = ChatReactionConfig::new(record.chat_id, record.available_reactions, &catalog);
        let toggles = ToggleController::new(catalog, &config);

        debug!(
            chat_id = %config.chat_id(),
            peer_kind = ?record.peer_kind,
            size = config.working().len(),
            "opened a reactions edit session"
        );

        Self { service, config, toggles, peer_kind: record.peer_kind, _claim: claim }
    }

    /// The chat being edited.
    pub fn chat_id(&self) -> ChatId {
        self.config.chat_id()
    }

    /// The kind of the chat being edited.
    pub fn peer_kind(&self) -> PeerKind {
        self.peer_kind
    }

    /// The baseline and working sets.
    pub fn config(&self) -> &ChatReactionConfig {
        &self.config
    }

    /// The catalog this session edits against.
    pub fn catalog(&self) -> &ReactionCatalog {
        self.toggles.catalog()
    }

    /// The state of the master switch.
    pub fn master_enabled(&self) -> bool {
        self.config.master_enabled()
    }

    /// Whether a reaction is enabled in the working set.
    pub fn is_enabled(&self, reaction: &str) -> bool {
        self.config.is_enabled(reaction)
    }

    /// Whether there's something to push.
    pub fn is_dirty(&self) -> bool {
        is_dirty(&self.config)
    }

    /// Toggle a single reaction, see [`ToggleController::toggle_one`].
    pub fn toggle_one(&mut self, reaction: &ReactionId) -> Result<ToggleOutcome> {
        self.toggles.toggle_one(&mut self.config, reaction)
    }

    /// Flip the master switch, see [`ToggleController::toggle_all`].
    pub fn toggle_all(&mut self) -> ToggleOutcome {
        self.toggles.toggle_all(&mut self.config)
    }

    /// Subscribe to the visibility of the selection list.
    pub fn subscribe_selection_set_visible(&self) -> Subscriber<bool> {
        self.toggles.subscribe_selection_set_visible()
    }

    /// Push the working set to the server if it differs from the baseline.
    ///
    /// Call this once, when the user leaves the edit screen. Calling it again
    /// without edits in between is a no-op.
    ///
    /// The push runs in a background task: if this future is dropped, the push
    /// still completes, and still updates the shared record cache, but this
    /// session's baseline isn't moved.
    ///
    /// Server failures don't make this fail; they're logged and reported as
    /// [`FlushOutcome::PushFailed`].
    #[instrument(skip(self), fields(chat_id = %self.chat_id()))]
    pub async fn flush(&mut self) -> Result<FlushOutcome> {
        if !self.is_dirty() {
            debug!("nothing changed, not pushing the enabled reactions");
            return Ok(FlushOutcome::Clean);
        }

        let chat_id = self.chat_id();
        let claim = self.service.claim_push(chat_id)?;
        let sequence = self.service.next_sequence();
        let enabled = self.config.working().clone();
        let changes = diff(self.config.baseline(), &enabled);

        debug!(
            %sequence,
            size = enabled.len(),
            added = ?changes.added,
            removed = ?changes.removed,
            "pushing the enabled reactions"
        );

        let push = spawn(self.service.clone().push(chat_id, enabled.clone(), sequence, claim));

        match push.await? {
            Ok(_) => {
                self.config.confirm(enabled);
                Ok(FlushOutcome::Pushed { sequence })
            }
            Err(error) => Ok(FlushOutcome::PushFailed(Arc::new(error))),
        }
    }
}
