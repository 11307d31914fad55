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

//! The catalog of reactions a chat can enable.
//!
//! The catalog is the same for every chat, and is read from the server once
//! per process, through a [`ReactionCatalogCache`]. Until the first
//! successful load, the cache is in the "not loaded" state, and consumers
//! must cope with it.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use indexmap::{map::Entry, IndexMap};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;
use tracing::{info, instrument, warn};

use crate::{
    error::CatalogError,
    identifiers::{ReactionId, ReactionSet},
};

/// An opaque reference to the static icon of a reaction.
///
/// Decoding and caching the icon is up to the rendering layer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconRef(String);

impl IconRef {
    /// Create a new icon reference.
    pub fn new(icon: impl Into<String>) -> Self {
        Self(icon.into())
    }

    /// The reference, as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One reaction of the catalog, with its display metadata.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// The identifier of the reaction.
    pub reaction: ReactionId,

    /// A human readable title.
    pub title: String,

    /// The icon shown next to the title.
    pub static_icon: IconRef,
}

impl CatalogEntry {
    /// Create a new catalog entry.
    pub fn new(
        reaction: impl Into<ReactionId>,
        title: impl Into<String>,
        static_icon: IconRef,
    ) -> Self {
        Self { reaction: reaction.into(), title: title.into(), static_icon }
    }
}

/// The ordered, immutable list of reactions a chat can enable.
///
/// Cloning is shallow, and thus is cheap to do.
#[derive(Clone, Default, PartialEq)]
pub struct ReactionCatalog {
    entries: Arc<IndexMap<ReactionId, CatalogEntry>>,
}

#[cfg(not(tarpaulin_include))]
impl fmt::Debug for ReactionCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.keys()).finish()
    }
}

impl ReactionCatalog {
    /// Build a catalog from the entries sent by the server, keeping their
    /// order.
    ///
    /// Identifiers must be unique; if one appears twice, the first entry wins.
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut map = IndexMap::new();

        for entry in entries {
            match map.entry(entry.reaction.clone()) {
                Entry::Vacant(vacant) => {
                    vacant.insert(entry);
                }
                Entry::Occupied(_) => {
                    warn!(reaction = %entry.reaction, "duplicate reaction in the catalog");
                }
            }
        }

        Self { entries: Arc::new(map) }
    }

    /// Number of reactions in the catalog.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog has no reactions at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the given reaction is part of the catalog.
    pub fn contains(&self, reaction: &str) -> bool {
        self.entries.contains_key(reaction)
    }

    /// Get the entry of a reaction, to display its title or icon.
    pub fn get(&self, reaction: &str) -> Option<&CatalogEntry> {
        self.entries.get(reaction)
    }

    /// The entries, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    /// The reaction identifiers, in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = &ReactionId> {
        self.entries.keys()
    }

    /// Every reaction of the catalog, in catalog order; that's what a chat
    /// enables when all reactions are switched on.
    pub fn all(&self) -> ReactionSet {
        self.entries.keys().cloned().collect()
    }
}

/// The remote source of the reactions catalog.
#[async_trait]
pub trait CatalogSource: fmt::Debug + Send + Sync {
    /// Read the list of available reactions from the server.
    async fn available_reactions(&self) -> Result<Vec<CatalogEntry>, CatalogError>;
}

/// A read-through cache of the [`ReactionCatalog`], shared by all the edit
/// sessions.
///
/// The catalog is requested on first access, and kept for the lifetime of
/// the cache. A failed or empty load leaves the cache not loaded, so the next
/// access tries again; concurrent first accesses share a single request.
pub struct ReactionCatalogCache {
    source: Arc<dyn CatalogSource>,
    catalog: OnceCell<ReactionCatalog>,
}

#[cfg(not(tarpaulin_include))]
impl fmt::Debug for ReactionCatalogCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionCatalogCache")
            .field("catalog", &self.catalog.get())
            .finish_non_exhaustive()
    }
}

impl ReactionCatalogCache {
    /// Create a new, not loaded cache, reading from the given source.
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self { source, catalog: OnceCell::new() }
    }

    /// Whether the catalog has been loaded already.
    pub fn is_loaded(&self) -> bool {
        self.catalog.initialized()
    }

    /// The catalog, if it has been loaded already.
    ///
    /// This never hits the network; use [`Self::load`] for that.
    pub fn get(&self) -> Option<&ReactionCatalog> {
        self.catalog.get()
    }

    /// Get the catalog, requesting it from the server if it isn't loaded yet.
    pub async fn load(&self) -> Result<&ReactionCatalog, CatalogError> {
        self.catalog.get_or_try_init(|| self.request_catalog()).await
    }

    #[instrument(skip_all)]
    async fn request_catalog(&self) -> Result<ReactionCatalog, CatalogError> {
        let entries = self.source.available_reactions().await.inspect_err(|error| {
            warn!(%error, "couldn't load the reactions catalog");
        })?;

        if entries.is_empty() {
            warn!("the server returned an empty reactions catalog, not caching it");
            return Err(CatalogError::Empty);
        }

        let catalog = ReactionCatalog::new(entries);
        info!(size = catalog.len(), "loaded the reactions catalog");

        Ok(catalog)
    }
}
