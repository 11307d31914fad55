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

#![doc = include_str!("../README.md")]
#![warn(missing_debug_implementations)]

pub mod catalog;
pub mod client;
pub mod config;
pub mod diff;
pub mod error;
pub mod identifiers;
pub mod reconciliation;
mod service;
pub mod session;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

pub use self::{
    catalog::{CatalogEntry, CatalogSource, ReactionCatalog, ReactionCatalogCache},
    client::{ChatRecord, PeerKind, SyncClient},
    config::ReactionSettingsConfig,
    error::{Error, Result},
    identifiers::{ChatId, ReactionId, ReactionSet, SequenceNumber},
    service::ReactionSettingsService,
    session::{FlushOutcome, ReactionsEditSession},
};

#[cfg(test)]
reactions_sdk_test::init_tracing_for_tests!();
