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

//! The boundary with the server storing the enabled reactions of each chat.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::{FetchError, PushError},
    identifiers::{ChatId, ReactionId, ReactionSet},
};

/// The kind of chat a record belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerKind {
    /// A basic group.
    Group,

    /// A group backed by a channel.
    Supergroup,

    /// A broadcast channel.
    Channel,
}

/// The server's view of a chat's enabled reactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRecord {
    /// The chat this record describes.
    pub chat_id: ChatId,

    /// The kind of chat.
    pub peer_kind: PeerKind,

    /// The enabled reactions, in the order the server lists them.
    ///
    /// An empty list means reactions are disabled in this chat.
    pub available_reactions: Vec<ReactionId>,

    /// A revision of the record maintained by the server, if it sends one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<u64>,
}

impl ChatRecord {
    /// Create a record without a server revision.
    pub fn new(
        chat_id: ChatId,
        peer_kind: PeerKind,
        available_reactions: impl IntoIterator<Item = ReactionId>,
    ) -> Self {
        Self {
            chat_id,
            peer_kind,
            available_reactions: available_reactions.into_iter().collect(),
            revision: None,
        }
    }

    /// The enabled reactions as a set, duplicates removed.
    pub fn enabled(&self) -> ReactionSet {
        self.available_reactions.iter().cloned().collect()
    }
}

/// The server's acknowledgement of a push.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ack {
    /// The revision of the record after the write, if the server sends one.
    pub revision: Option<u64>,
}

/// Writes and reads the enabled reactions of a chat on the server.
///
/// Implementations are in charge of timeouts. Both methods are only ever
/// called from background tasks.
#[async_trait]
pub trait SyncClient: fmt::Debug + Send + Sync {
    /// Replace the enabled reactions of the chat with `enabled`.
    ///
    /// This isn't a delta: the whole set is sent.
    async fn push(&self, chat_id: ChatId, enabled: &ReactionSet) -> Result<Ack, PushError>;

    /// Read the current record of the chat.
    async fn fetch(&self, chat_id: ChatId) -> Result<ChatRecord, FetchError>;
}
