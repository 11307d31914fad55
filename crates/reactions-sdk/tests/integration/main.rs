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

use std::{sync::Arc, time::Duration};

use reactions_sdk::{
    config::ReactionSettingsConfig,
    reconciliation::ReconciliationUpdate,
    test_utils::MockSyncClient,
    CatalogEntry, ChatRecord, ReactionId, ReactionSet, ReactionSettingsService,
};
use reactions_sdk_test::test_json;
use serde_json::Value as JsonValue;
use tokio::{sync::broadcast, time::timeout};

mod flush;
mod reconciliation;

reactions_sdk_test::init_tracing_for_tests!();

fn catalog(json: &JsonValue) -> Vec<CatalogEntry> {
    serde_json::from_value(json.clone()).unwrap()
}

fn record(json: &JsonValue) -> ChatRecord {
    serde_json::from_value(json.clone()).unwrap()
}

fn reactions(ids: &[&str]) -> Vec<ReactionId> {
    ids.iter().copied().map(ReactionId::from).collect()
}

fn set(ids: &[&str]) -> ReactionSet {
    ids.iter().copied().map(ReactionId::from).collect()
}

/// A server with the `x`, `y`, `z` catalog, storing the given record.
fn mock_client(record_json: &JsonValue) -> Arc<MockSyncClient> {
    let client = Arc::new(MockSyncClient::new());
    client.set_catalog(catalog(&test_json::CATALOG_XYZ));
    client.set_record(record(record_json));
    client
}

fn new_service(
    client: &Arc<MockSyncClient>,
    config: ReactionSettingsConfig,
) -> ReactionSettingsService {
    ReactionSettingsService::new(client.clone(), client.clone(), config)
}

async fn next_update(
    updates: &mut broadcast::Receiver<ReconciliationUpdate>,
) -> ReconciliationUpdate {
    timeout(Duration::from_secs(5), updates.recv())
        .await
        .expect("no reconciliation update received")
        .expect("the update channel was closed")
}
