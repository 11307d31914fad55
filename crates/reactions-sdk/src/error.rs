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

//! Error conditions.

use as_variant::as_variant;
use thiserror::Error;
use tokio::task::JoinError;

use crate::identifiers::{ChatId, ReactionId};

/// Result type of the reactions SDK.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Internal representation of errors.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A reaction outside of the catalog was toggled.
    ///
    /// This is a programming error: only reactions from the catalog are ever
    /// presented to the user.
    #[error("the reaction {reaction} isn't part of the reactions catalog")]
    InvalidArgument {
        /// The offending reaction.
        reaction: ReactionId,
    },

    /// The reactions catalog couldn't be loaded.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The record of a chat couldn't be read when opening an edit session.
    #[error("couldn't load the reactions of chat {chat_id}")]
    Fetch {
        /// The chat whose record was requested.
        chat_id: ChatId,

        /// The underlying failure.
        #[source]
        source: FetchError,
    },

    /// The server answered with the record of another chat.
    #[error("requested the record of chat {expected}, got the one of chat {received}")]
    MismatchedRecord {
        /// The chat whose record was requested.
        expected: ChatId,

        /// The chat the returned record belongs to.
        received: ChatId,
    },

    /// A push for this chat hasn't completed yet.
    ///
    /// Returned when flushing, and when opening a session for the chat.
    #[error("a push of the enabled reactions of chat {0} is already in flight")]
    PushAlreadyInFlight(ChatId),

    /// Another edit session is open for this chat.
    #[error("an edit session is already open for chat {0}")]
    SessionAlreadyOpen(ChatId),

    /// A background task failed to complete.
    #[error(transparent)]
    TaskJoin(#[from] JoinError),
}

/// A failure while talking to the server.
#[derive(Clone, Debug, Error)]
pub enum RequestError {
    /// The request didn't reach the server, or the response didn't come back.
    #[error("network error: {0}")]
    Network(String),

    /// The server refused the request.
    #[error("the server refused the request ({code}): {message}")]
    Remote {
        /// The error code, as sent by the server.
        code: i32,

        /// The error message, as sent by the server.
        message: String,
    },

    /// The request timed out.
    #[error("the request timed out")]
    Timeout,
}

impl RequestError {
    /// If `self` is a [`RequestError::Remote`], returns the error code sent by
    /// the server.
    pub fn remote_code(&self) -> Option<i32> {
        as_variant!(self, Self::Remote { code, .. } => *code)
    }
}

/// Writing the enabled reactions of a chat failed.
#[derive(Clone, Debug, Error)]
#[error("failed to push the enabled reactions: {0}")]
pub struct PushError(#[from] pub RequestError);

/// Reading the record of a chat failed.
#[derive(Clone, Debug, Error)]
#[error("failed to fetch the chat record: {0}")]
pub struct FetchError(#[from] pub RequestError);

/// Loading the reactions catalog failed.
#[derive(Clone, Debug, Error)]
pub enum CatalogError {
    /// The request failed.
    #[error("failed to load the reactions catalog: {0}")]
    Request(#[from] RequestError),

    /// The server answered with an empty catalog.
    ///
    /// This isn't cached: the next access retries the request.
    #[error("the server returned an empty reactions catalog")]
    Empty,
}
