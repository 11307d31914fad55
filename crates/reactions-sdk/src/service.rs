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

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use tokio::{
    sync::{broadcast, mpsc},
    task::{spawn, JoinHandle},
};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    catalog::{CatalogSource, ReactionCatalogCache},
    client::{Ack, ChatRecord, SyncClient},
    config::ReactionSettingsConfig,
    error::{Error, PushError, Result},
    identifiers::{ChatId, ReactionSet, SequenceNumber},
    reconciliation::{
        CachedRecord, ReconciliationHandler, ReconciliationStats, ReconciliationUpdate,
        RecordCandidate, RecordOrigin,
    },
    session::ReactionsEditSession,
};

/// Entry point for editing the enabled reactions of chats.
///
/// It owns the [`ReactionCatalogCache`], hands out [`ReactionsEditSession`]s,
/// and maintains the shared cache of chat records, kept up to date with the
/// results of pushes and reads.
///
/// This is cheap to clone. It must be created from within a Tokio runtime, as
/// it spawns the task reconciling server records.
#[derive(Clone)]
pub struct ReactionSettingsService {
    inner: Arc<ServiceInner>,
}

#[cfg(not(tarpaulin_include))]
impl fmt::Debug for ReactionSettingsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactionSettingsService").finish_non_exhaustive()
    }
}

impl ReactionSettingsService {
    /// Create a new service talking to the given server.
    pub fn new(
        client: Arc<dyn SyncClient>,
        catalog_source: Arc<dyn CatalogSource>,
        config: ReactionSettingsConfig,
    ) -> Self {
        let reconciliation = ReconciliationHandler::new(config.channel_capacity());
        let (candidate_sender, candidate_receiver) = mpsc::unbounded_channel();

        // The task stops by itself once the service and its background tasks are
        // gone, since they hold the only senders.
        drop(reconciliation.clone().spawn(candidate_receiver));

        Self {
            inner: Arc::new(ServiceInner {
                client,
                catalog: ReactionCatalogCache::new(catalog_source),
                config,
                reconciliation,
                candidate_sender,
                next_sequence: AtomicU64::new(0),
                confirmed: Default::default(),
                pushes_in_flight: Default::default(),
                open_sessions: Default::default(),
            }),
        }
    }

    /// The reactions catalog cache.
    pub fn catalog(&self) -> &ReactionCatalogCache {
        &self.inner.catalog
    }

    /// The configuration this service was created with.
    pub fn config(&self) -> &ReactionSettingsConfig {
        &self.inner.config
    }

    /// Open an edit session for a chat, reading its current record from the
    /// server.
    ///
    /// The record read here also refreshes the shared record cache.
    #[instrument(skip(self))]
    pub async fn open_session(&self, chat_id: ChatId) -> Result<ReactionsEditSession> {
        let claim = self.inner.claim_session(chat_id)?;
        let catalog = self.inner.catalog.load().await?.clone();

        // Tag the read before issuing it, so a push confirmed meanwhile wins.
        let sequence = self.inner.confirmed_sequence(chat_id);
        let record = self
            .inner
            .client
            .fetch(chat_id)
            .await
            .map_err(|source| Error::Fetch { chat_id, source })?;

        if record.chat_id != chat_id {
            return Err(Error::MismatchedRecord { expected: chat_id, received: record.chat_id });
        }

        self.inner.submit(RecordCandidate::from_record(
            record.clone(),
            sequence,
            RecordOrigin::UnsolicitedFetch,
        ));

        Ok(ReactionsEditSession::new(self.inner.clone(), claim, catalog, record))
    }

    /// Open an edit session from a record the caller already has, e.g. the one
    /// displayed by the chat info screen.
    #[instrument(skip_all, fields(chat_id = %record.chat_id))]
    pub async fn open_session_with_record(
        &self,
        record: ChatRecord,
    ) -> Result<ReactionsEditSession> {
        let claim = self.inner.claim_session(record.chat_id)?;
        let catalog = self.inner.catalog.load().await?.clone();

        Ok(ReactionsEditSession::new(self.inner.clone(), claim, catalog, record))
    }

    /// Read the record of a chat from the server, and reconcile it with the
    /// shared cache.
    ///
    /// This returns immediately; the returned handle resolves once the read is
    /// done and its result is queued for reconciliation. Failures are logged.
    pub fn refresh_record(&self, chat_id: ChatId) -> JoinHandle<()> {
        let sequence = self.inner.confirmed_sequence(chat_id);
        self.inner.spawn_fetch(chat_id, sequence, RecordOrigin::UnsolicitedFetch)
    }

    /// Subscribe to the updates of the shared record cache.
    pub fn subscribe_updates(&self) -> broadcast::Receiver<ReconciliationUpdate> {
        self.inner.reconciliation.subscribe()
    }

    /// Get the shared cached record of a chat, if any.
    pub fn cached_record(&self, chat_id: ChatId) -> Option<CachedRecord> {
        self.inner.reconciliation.cache().get(chat_id)
    }

    /// Counters of the reconciliation decisions so far.
    pub fn reconciliation_stats(&self) -> ReconciliationStats {
        self.inner.reconciliation.stats()
    }

    /// Whether a push for this chat is in flight.
    pub fn is_push_in_flight(&self, chat_id: ChatId) -> bool {
        self.inner.pushes_in_flight.is_claimed(chat_id)
    }
}

pub(crate) struct ServiceInner {
    client: Arc<dyn SyncClient>,
    catalog: ReactionCatalogCache,
    config: ReactionSettingsConfig,
    reconciliation: ReconciliationHandler,

    /// Feeds the reconciliation task.
    candidate_sender: mpsc::UnboundedSender<RecordCandidate>,

    /// The last sequence number handed out.
    next_sequence: AtomicU64,

    /// Highest sequence number of a successful push, per chat.
    confirmed: Mutex<BTreeMap<ChatId, SequenceNumber>>,

    pushes_in_flight: ChatClaims,
    open_sessions: ChatClaims,
}

impl ServiceInner {
    fn claim_session(&self, chat_id: ChatId) -> Result<ChatClaim> {
        // The record read for the session could predate the push.
        if self.pushes_in_flight.is_claimed(chat_id) {
            return Err(Error::PushAlreadyInFlight(chat_id));
        }

        self.open_sessions.claim(chat_id).ok_or(Error::SessionAlreadyOpen(chat_id))
    }

    pub(crate) fn claim_push(&self, chat_id: ChatId) -> Result<ChatClaim> {
        self.pushes_in_flight.claim(chat_id).ok_or(Error::PushAlreadyInFlight(chat_id))
    }

    pub(crate) fn next_sequence(&self) -> SequenceNumber {
        SequenceNumber::new(self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn confirmed_sequence(&self, chat_id: ChatId) -> SequenceNumber {
        self.confirmed.lock().unwrap().get(&chat_id).copied().unwrap_or_default()
    }

    fn submit(&self, candidate: RecordCandidate) {
        if self.candidate_sender.send(candidate).is_err() {
            debug!("the reconciliation task is gone, dropping the record");
        }
    }

    /// Push the enabled reactions of a chat, and on success feed the shared
    /// cache and read the record back.
    ///
    /// The claim is released once the server has answered the push.
    #[instrument(skip(self, enabled, claim), fields(size = enabled.len()))]
    pub(crate) async fn push(
        self: Arc<Self>,
        chat_id: ChatId,
        enabled: ReactionSet,
        sequence: SequenceNumber,
        claim: ChatClaim,
    ) -> Result<Ack, PushError> {
        let result = self.client.push(chat_id, &enabled).await;

        match &result {
            Ok(ack) => {
                info!("pushed the enabled reactions");

                {
                    let mut confirmed = self.confirmed.lock().unwrap();
                    let entry = confirmed.entry(chat_id).or_default();
                    *entry = (*entry).max(sequence);
                }

                self.submit(RecordCandidate {
                    chat_id,
                    enabled,
                    sequence,
                    revision: ack.revision,
                    origin: RecordOrigin::Push,
                });

                if self.config.confirms_after_push() {
                    drop(self.spawn_fetch(chat_id, sequence, RecordOrigin::ConfirmatoryFetch));
                }
            }

            Err(error) => {
                error!(%error, "couldn't push the enabled reactions, the edit is lost");
            }
        }

        drop(claim);
        result
    }

    fn spawn_fetch(
        self: &Arc<Self>,
        chat_id: ChatId,
        sequence: SequenceNumber,
        origin: RecordOrigin,
    ) -> JoinHandle<()> {
        let this = self.clone();

        spawn(async move {
            match this.client.fetch(chat_id).await {
                Ok(record) if record.chat_id != chat_id => {
                    warn!(%chat_id, received = %record.chat_id, "got the record of another chat");
                }

                Ok(record) => {
                    let peer_kind = record.peer_kind;
                    debug!(%chat_id, %sequence, ?origin, ?peer_kind, "read the chat record");
                    this.submit(RecordCandidate::from_record(record, sequence, origin));
                }

                Err(error) => {
                    warn!(%chat_id, %error, ?origin, "couldn't read the chat record");
                }
            }
        })
    }
}

/// A set of chats some exclusive operation is running for.
#[derive(Debug, Default)]
struct ChatClaims {
    claimed: Arc<Mutex<BTreeSet<ChatId>>>,
}

impl ChatClaims {
    fn claim(&self, chat_id: ChatId) -> Option<ChatClaim> {
        if !self.claimed.lock().unwrap().insert(chat_id) {
            return None;
        }

        Some(ChatClaim { claimed: self.claimed.clone(), chat_id })
    }

    fn is_claimed(&self, chat_id: ChatId) -> bool {
        self.claimed.lock().unwrap().contains(&chat_id)
    }
}

/// Releases the chat from its [`ChatClaims`] when dropped.
#[derive(Debug)]
pub(crate) struct ChatClaim {
    claimed: Arc<Mutex<BTreeSet<ChatId>>>,
    chat_id: ChatId,
}

impl Drop for ChatClaim {
    fn drop(&mut self) {
        self.claimed.lock().unwrap().remove(&self.chat_id);
    }
}
