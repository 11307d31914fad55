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

//! Identifiers used throughout the crate.

use std::{borrow::Borrow, fmt};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// A set of reactions, keeping the order in which they were inserted.
///
/// Two sets holding the same reactions in a different order are the same set
/// as far as syncing is concerned, see [`crate::diff`].
pub type ReactionSet = IndexSet<ReactionId>;

/// The identifier of a reaction, unique within the
/// [`ReactionCatalog`](crate::catalog::ReactionCatalog).
///
/// On the wire this is usually the emoji itself.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionId(String);

impl ReactionId {
    /// Create a new reaction identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier, as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ReactionId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ReactionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ReactionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ReactionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// The identifier of the chat whose enabled reactions are being configured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(i64);

impl ChatId {
    /// Create a new chat identifier.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A local, monotonically increasing number attached to every push.
///
/// Records read from the server carry the sequence number of the push that
/// triggered the read, so that reads overtaken by a more recent push can be
/// told apart from fresh ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceNumber(u64);

impl SequenceNumber {
    /// The sequence number preceding any push.
    pub const ZERO: Self = Self(0);

    /// Create a sequence number from its raw value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw value.
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
