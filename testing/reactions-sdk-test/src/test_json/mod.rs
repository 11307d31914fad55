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

//! Test data for the reactions SDK crates.
//!
//! Exporting each static allows all the test data to have a single source of
//! truth.

use once_cell::sync::Lazy;
use serde_json::{json, Value as JsonValue};

pub mod records;

pub use records::{CHANNEL_RECORD, GROUP_RECORD_ALL, GROUP_RECORD_NONE, GROUP_RECORD_X};

/// The three-item catalog used by most scenarios: `x`, `y` and `z`.
pub static CATALOG_XYZ: Lazy<JsonValue> = Lazy::new(|| {
    json!([
        { "reaction": "x", "title": "Thumbs Up", "static_icon": "icon:x" },
        { "reaction": "y", "title": "Heart", "static_icon": "icon:y" },
        { "reaction": "z", "title": "Fire", "static_icon": "icon:z" },
    ])
});

/// A catalog shaped like the production one, with emoji identifiers.
pub static CATALOG_EMOJI: Lazy<JsonValue> = Lazy::new(|| {
    json!([
        { "reaction": "👍", "title": "Thumbs Up", "static_icon": "doc:5046265382221365341" },
        { "reaction": "👎", "title": "Thumbs Down", "static_icon": "doc:5046265382221365342" },
        { "reaction": "❤", "title": "Red Heart", "static_icon": "doc:5046265382221365343" },
        { "reaction": "🔥", "title": "Fire", "static_icon": "doc:5046265382221365344" },
        { "reaction": "🎉", "title": "Party Popper", "static_icon": "doc:5046265382221365345" },
        { "reaction": "😁", "title": "Beaming Face", "static_icon": "doc:5046265382221365346" },
    ])
});

/// An empty catalog response.
pub static CATALOG_EMPTY: Lazy<JsonValue> = Lazy::new(|| json!([]));
