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

//! Helpers to test code built on the reactions SDK, without a server.

use std::{
    collections::{BTreeMap, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::{
    catalog::{CatalogEntry, CatalogSource, IconRef},
    client::{Ack, ChatRecord, PeerKind, SyncClient},
    error::{CatalogError, FetchError, PushError, RequestError},
    identifiers::{ChatId, ReactionId, ReactionSet},
};

/// Build catalog entries for the given identifiers, with made up metadata.
pub fn catalog_entries(ids: &[&str]) -> Vec<CatalogEntry> {
    ids.iter()
        .map(|id| {
            CatalogEntry::new(*id, format!("Reaction {id}"), IconRef::new(format!("icon:{id}")))
        })
        .collect()
}

/// A planned answer of the mock to a push.
#[derive(Debug)]
enum PushResponse {
    Fail(PushError),
    Gated(oneshot::Receiver<Result<(), PushError>>),
}

/// A planned answer of the mock to a fetch.
#[derive(Debug)]
enum FetchResponse {
    Ready(Result<ChatRecord, FetchError>),
    Gated(oneshot::Receiver<Result<ChatRecord, FetchError>>),
}

#[derive(Debug, Default)]
struct MockState {
    catalog: Vec<CatalogEntry>,
    catalog_responses: VecDeque<Result<Vec<CatalogEntry>, CatalogError>>,
    catalog_requests: usize,

    records: BTreeMap<ChatId, ChatRecord>,
    push_responses: VecDeque<PushResponse>,
    fetch_responses: VecDeque<FetchResponse>,

    pushes: Vec<(ChatId, Vec<ReactionId>)>,
    fetches: Vec<ChatId>,
}

/// An in-memory server, implementing both [`SyncClient`] and
/// [`CatalogSource`].
///
/// By default, pushes replace the stored record of the chat and fetches return
/// it. The next responses can be overridden, or gated behind a
/// [`oneshot::Sender`] to control when they complete.
#[derive(Debug, Default)]
pub struct MockSyncClient {
    state: Mutex<MockState>,
}

impl MockSyncClient {
    /// Create a mock with an empty catalog and no records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the catalog returned when no response is queued.
    pub fn set_catalog(&self, entries: Vec<CatalogEntry>) {
        self.state.lock().unwrap().catalog = entries;
    }

    /// Queue a response to the next catalog request.
    pub fn queue_catalog_response(&self, response: Result<Vec<CatalogEntry>, CatalogError>) {
        self.state.lock().unwrap().catalog_responses.push_back(response);
    }

    /// The number of catalog requests received so far.
    pub fn catalog_requests(&self) -> usize {
        self.state.lock().unwrap().catalog_requests
    }

    /// Store the record of a chat.
    pub fn set_record(&self, record: ChatRecord) {
        self.state.lock().unwrap().records.insert(record.chat_id, record);
    }

    /// The stored record of a chat.
    pub fn record(&self, chat_id: ChatId) -> Option<ChatRecord> {
        self.state.lock().unwrap().records.get(&chat_id).cloned()
    }

    /// Make the next push fail with the given error.
    pub fn fail_next_push(&self, error: RequestError) {
        self.state.lock().unwrap().push_responses.push_back(PushResponse::Fail(error.into()));
    }

    /// Hold the next push until the returned sender is used.
    ///
    /// Sending `Ok(())` applies the push to the stored record. Dropping the
    /// sender fails the push with a network error.
    pub fn gate_next_push(&self) -> oneshot::Sender<Result<(), PushError>> {
        let (sender, receiver) = oneshot::channel();
        self.state.lock().unwrap().push_responses.push_back(PushResponse::Gated(receiver));
        sender
    }

    /// Answer the next fetch with the given response, instead of the stored
    /// record.
    pub fn respond_next_fetch(&self, response: Result<ChatRecord, FetchError>) {
        self.state.lock().unwrap().fetch_responses.push_back(FetchResponse::Ready(response));
    }

    /// Hold the next fetch until the returned sender is used.
    ///
    /// Dropping the sender fails the fetch with a network error.
    pub fn gate_next_fetch(&self) -> oneshot::Sender<Result<ChatRecord, FetchError>> {
        let (sender, receiver) = oneshot::channel();
        self.state.lock().unwrap().fetch_responses.push_back(FetchResponse::Gated(receiver));
        sender
    }

    /// Every push received so far, in order.
    pub fn pushes(&self) -> Vec<(ChatId, Vec<ReactionId>)> {
        self.state.lock().unwrap().pushes.clone()
    }

    /// Every fetch received so far, in order.
    pub fn fetches(&self) -> Vec<ChatId> {
        self.state.lock().unwrap().fetches.clone()
    }

    fn store_push(&self, chat_id: ChatId, enabled: &ReactionSet) -> Ack {
        let mut state = self.state.lock().unwrap();
        let record = state
            .records
            .entry(chat_id)
            .or_insert_with(|| ChatRecord::new(chat_id, PeerKind::Group, Vec::new()));

        record.available_reactions = enabled.iter().cloned().collect();
        if let Some(revision) = &mut record.revision {
            *revision += 1;
        }

        Ack { revision: record.revision }
    }
}

fn dropped_gate() -> RequestError {
    RequestError::Network("the gate was dropped".to_owned())
}

#[async_trait]
impl SyncClient for MockSyncClient {
    async fn push(&self, chat_id: ChatId, enabled: &ReactionSet) -> Result<Ack, PushError> {
        let response = {
            let mut state = self.state.lock().unwrap();
            state.pushes.push((chat_id, enabled.iter().cloned().collect()));
            state.push_responses.pop_front()
        };

        match response {
            None => Ok(self.store_push(chat_id, enabled)),
            Some(PushResponse::Fail(error)) => Err(error),
            Some(PushResponse::Gated(receiver)) => {
                receiver.await.unwrap_or_else(|_| Err(dropped_gate().into()))?;
                Ok(self.store_push(chat_id, enabled))
            }
        }
    }

    async fn fetch(&self, chat_id: ChatId) -> Result<ChatRecord, FetchError> {
        let response = {
            let mut state = self.state.lock().unwrap();
            state.fetches.push(chat_id);

            match state.fetch_responses.pop_front() {
                Some(response) => response,
                None => {
                    let record = state.records.get(&chat_id).cloned().ok_or_else(|| {
                        let message = "CHAT_ID_INVALID".to_owned();
                        FetchError(RequestError::Remote { code: 400, message })
                    });
                    FetchResponse::Ready(record)
                }
            }
        };

        match response {
            FetchResponse::Ready(result) => result,
            FetchResponse::Gated(receiver) => {
                receiver.await.unwrap_or_else(|_| Err(dropped_gate().into()))
            }
        }
    }
}

#[async_trait]
impl CatalogSource for MockSyncClient {
    async fn available_reactions(&self) -> Result<Vec<CatalogEntry>, CatalogError> {
        let mut state = self.state.lock().unwrap();
        state.catalog_requests += 1;

        match state.catalog_responses.pop_front() {
            Some(response) => response,
            None => Ok(state.catalog.clone()),
        }
    }
}
