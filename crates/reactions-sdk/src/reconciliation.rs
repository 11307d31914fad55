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

//! Reconciliation of server records with the shared record cache.
//!
//! After a successful push, the record of the chat is read back from the
//! server, to refresh the copy other parts of the application display. That
//! read may race with the server's own propagation, and some servers answer
//! it with the record as it was *before* the push: a stale echo.
//!
//! Every push gets a [`SequenceNumber`], and every record read from the server
//! carries the sequence number of the push that triggered the read. A record
//! only makes it into the shared cache if its sequence number is at least the
//! one of the record already cached for that chat, and, when the server sends
//! revisions, if its revision isn't older.
//!
//! The read back of a push carries the same sequence number as the push
//! itself, so on its own the sequence number can't tell the stale echo apart.
//! A read back that disagrees with the set its push just cached is discarded
//! too, unless the server vouches for it with a newer revision.
//!
//! Anything discarded is logged and counted.
//!
//! All the writes to the cache go through a single background task, fed by a
//! channel.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, RwLock,
    },
};

use tokio::{
    sync::{broadcast, mpsc},
    task::{spawn, JoinHandle},
};
use tracing::{debug, trace, warn};

use crate::{
    client::ChatRecord,
    diff::same_reactions,
    identifiers::{ChatId, ReactionSet, SequenceNumber},
};

/// Where a [`RecordCandidate`] comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordOrigin {
    /// The set that was just pushed successfully.
    Push,

    /// A read issued right after a successful push.
    ConfirmatoryFetch,

    /// A read not triggered by a push.
    UnsolicitedFetch,
}

/// A version of a chat's enabled reactions, waiting to be reconciled with the
/// shared cache.
#[derive(Clone, Debug)]
pub struct RecordCandidate {
    /// The chat.
    pub chat_id: ChatId,

    /// The enabled reactions.
    pub enabled: ReactionSet,

    /// The sequence number this version is tagged with.
    pub sequence: SequenceNumber,

    /// The server revision, if known.
    pub revision: Option<u64>,

    /// Where this version comes from.
    pub origin: RecordOrigin,
}

impl RecordCandidate {
    /// Tag a record read from the server.
    pub fn from_record(record: ChatRecord, sequence: SequenceNumber, origin: RecordOrigin) -> Self {
        Self {
            chat_id: record.chat_id,
            enabled: record.enabled(),
            sequence,
            revision: record.revision,
            origin,
        }
    }
}

/// The cached copy of a chat's enabled reactions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CachedRecord {
    /// The enabled reactions.
    pub enabled: ReactionSet,

    /// The sequence number of the version that was applied.
    pub sequence: SequenceNumber,

    /// The server revision of the version that was applied, if known.
    pub revision: Option<u64>,

    /// Where the version that was applied comes from.
    pub origin: RecordOrigin,
}

impl CachedRecord {
    /// Whether `candidate` is older than this record.
    fn is_newer_than(&self, candidate: &RecordCandidate) -> bool {
        if candidate.sequence < self.sequence {
            return true;
        }

        match (candidate.revision, self.revision) {
            (Some(revision), Some(current)) if revision < current => return true,
            (Some(revision), Some(current)) if revision > current => return false,
            _ => {}
        }

        // The server answered the read back with the record from before the push.
        candidate.origin == RecordOrigin::ConfirmatoryFetch
            && self.origin == RecordOrigin::Push
            && candidate.sequence == self.sequence
            && !same_reactions(&candidate.enabled, &self.enabled)
    }
}

/// The cache of chat records shared with the rest of the application.
///
/// Cloning is shallow, and thus is cheap to do.
#[derive(Clone, Debug, Default)]
pub(crate) struct SharedRecordCache {
    records: Arc<RwLock<BTreeMap<ChatId, CachedRecord>>>,
}

impl SharedRecordCache {
    /// Get the cached record of a chat, if any.
    pub(crate) fn get(&self, chat_id: ChatId) -> Option<CachedRecord> {
        self.records.read().unwrap().get(&chat_id).cloned()
    }
}

/// An update of the shared record cache.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconciliationUpdate {
    /// A chat's record was updated in the shared cache.
    RecordUpdated {
        /// The chat.
        chat_id: ChatId,

        /// Its enabled reactions.
        enabled: ReactionSet,

        /// The sequence number of the applied version.
        sequence: SequenceNumber,
    },

    /// A record older than the cached one was discarded.
    StaleEchoDiscarded {
        /// The chat.
        chat_id: ChatId,

        /// The sequence number the discarded record was tagged with.
        sequence: SequenceNumber,

        /// The sequence number of the cached record it lost against.
        current: SequenceNumber,
    },
}

/// What the handler did with a candidate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ReconcileDecision {
    /// The candidate replaced the cached record.
    Applied,

    /// The candidate was older than the cached record, and was dropped.
    StaleEcho,
}

/// Counters of the decisions taken by the handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconciliationStats {
    /// Number of applied candidates.
    pub applied: u64,

    /// Number of discarded stale echoes.
    pub stale_echoes: u64,
}

#[derive(Debug, Default)]
struct StatsCounters {
    applied: AtomicU64,
    stale_echoes: AtomicU64,
}

/// Decides whether records may overwrite the shared cache.
///
/// Only the crate feeds it; the rest of the application reads its results
/// through the `ReactionSettingsService`.
#[derive(Clone, Debug)]
pub(crate) struct ReconciliationHandler {
    cache: SharedRecordCache,
    update_sender: broadcast::Sender<ReconciliationUpdate>,
    stats: Arc<StatsCounters>,
}

impl ReconciliationHandler {
    /// Create a handler writing into an empty cache.
    pub(crate) fn new(channel_capacity: usize) -> Self {
        let (update_sender, _) = broadcast::channel(channel_capacity);

        Self { cache: SharedRecordCache::default(), update_sender, stats: Default::default() }
    }

    /// The cache this handler writes into.
    pub(crate) fn cache(&self) -> &SharedRecordCache {
        &self.cache
    }

    /// Subscribe to the updates of the shared cache.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<ReconciliationUpdate> {
        self.update_sender.subscribe()
    }

    /// A snapshot of the decision counters.
    pub(crate) fn stats(&self) -> ReconciliationStats {
        ReconciliationStats {
            applied: self.stats.applied.load(Ordering::Relaxed),
            stale_echoes: self.stats.stale_echoes.load(Ordering::Relaxed),
        }
    }

    /// Apply the candidate to the shared cache, unless it's older than the
    /// cached record.
    ///
    /// Must only be called from a single task at a time.
    pub(crate) fn reconcile(&self, candidate: RecordCandidate) -> ReconcileDecision {
        let mut records = self.cache.records.write().unwrap();

        let RecordCandidate { chat_id, sequence, revision, origin, .. } = candidate;

        if let Some(current) = records.get(&chat_id) {
            if current.is_newer_than(&candidate) {
                warn!(
                    %chat_id,
                    %sequence,
                    current = %current.sequence,
                    ?revision,
                    ?origin,
                    "discarding a stale echo of the enabled reactions"
                );

                let current = current.sequence;
                drop(records);

                self.stats.stale_echoes.fetch_add(1, Ordering::Relaxed);
                let _ = self.update_sender.send(ReconciliationUpdate::StaleEchoDiscarded {
                    chat_id,
                    sequence,
                    current,
                });

                return ReconcileDecision::StaleEcho;
            }
        }

        let enabled = candidate.enabled;
        debug!(%chat_id, %sequence, ?origin, size = enabled.len(), "updating the cached record");

        records.insert(
            chat_id,
            CachedRecord { enabled: enabled.clone(), sequence, revision, origin },
        );
        drop(records);

        self.stats.applied.fetch_add(1, Ordering::Relaxed);
        // No receivers is fine: nobody displays this chat right now.
        let _ = self.update_sender.send(ReconciliationUpdate::RecordUpdated {
            chat_id,
            enabled,
            sequence,
        });

        ReconcileDecision::Applied
    }

    /// Spawn the task applying the candidates sent over `receiver`, in order.
    ///
    /// The task stops once every sender is dropped.
    pub(crate) fn spawn(
        self,
        mut receiver: mpsc::UnboundedReceiver<RecordCandidate>,
    ) -> JoinHandle<()> {
        spawn(async move {
            while let Some(candidate) = receiver.recv().await {
                trace!(chat_id = %candidate.chat_id, "received a record candidate");
                self.reconcile(candidate);
            }

            debug!("reconciliation task stopped");
        })
    }
}
