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

use once_cell::sync::Lazy;
use serde_json::{json, Value as JsonValue};

/// A private group with only `x` enabled.
pub static GROUP_RECORD_X: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "chat_id": 7,
        "peer_kind": "group",
        "available_reactions": ["x"],
    })
});

/// A private group with reactions disabled.
pub static GROUP_RECORD_NONE: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "chat_id": 7,
        "peer_kind": "group",
        "available_reactions": [],
    })
});

/// A private group with the whole `x`, `y`, `z` catalog enabled, listed out of
/// catalog order.
pub static GROUP_RECORD_ALL: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "chat_id": 7,
        "peer_kind": "group",
        "available_reactions": ["z", "x", "y"],
    })
});

/// A channel carrying a server revision.
pub static CHANNEL_RECORD: Lazy<JsonValue> = Lazy::new(|| {
    json!({
        "chat_id": 42,
        "peer_kind": "channel",
        "available_reactions": ["x", "y"],
        "revision": 3,
    })
});
