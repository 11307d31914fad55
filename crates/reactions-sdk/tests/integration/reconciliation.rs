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

use assert_matches::assert_matches;
use reactions_sdk::{
    config::ReactionSettingsConfig,
    error::{FetchError, RequestError},
    reconciliation::{ReconciliationStats, ReconciliationUpdate, RecordOrigin},
    ChatId, ChatRecord, FlushOutcome, PeerKind, ReactionId, SequenceNumber,
};
use reactions_sdk_test::test_json;
use similar_asserts::assert_eq;

use crate::{mock_client, new_service, next_update, reactions, record, set};

#[tokio::test]
async fn test_straggling_read_back_of_an_older_push_is_discarded() {
    let client = mock_client(&test_json::GROUP_RECORD_X);
    let service = new_service(&client, ReactionSettingsConfig::new());
    let mut updates = service.subscribe_updates();
    let mut session = service.open_session(ChatId::new(7)).await.unwrap();

    // Hold the read back of the first push.
    let first_read_back = client.gate_next_fetch();

    session.toggle_one(&ReactionId::from("y")).unwrap();
    assert_matches!(
        session.flush().await,
        Ok(FlushOutcome::Pushed { sequence }) => assert_eq!(sequence, SequenceNumber::new(1))
    );

    session.toggle_one(&ReactionId::from("x")).unwrap();
    session.toggle_one(&ReactionId::from("z")).unwrap();
    assert_matches!(
        session.flush().await,
        Ok(FlushOutcome::Pushed { sequence }) => assert_eq!(sequence, SequenceNumber::new(2))
    );

    // The first read back finally comes back, with the set of the first push.
    let stale = ChatRecord::new(ChatId::new(7), PeerKind::Group, reactions(&["x", "y"]));
    first_read_back.send(Ok(stale)).unwrap();

    loop {
        if let ReconciliationUpdate::StaleEchoDiscarded { chat_id, sequence, current } =
            next_update(&mut updates).await
        {
            assert_eq!(chat_id, ChatId::new(7));
            assert_eq!(sequence, SequenceNumber::new(1));
            assert_eq!(current, SequenceNumber::new(2));
            break;
        }
    }

    let cached = service.cached_record(ChatId::new(7)).unwrap();
    assert_eq!(cached.enabled, set(&["y", "z"]));
    assert_eq!(cached.sequence, SequenceNumber::new(2));
    assert_eq!(service.reconciliation_stats().stale_echoes, 1);
}

#[tokio::test]
async fn test_read_back_answered_with_the_previous_record_is_discarded() {
    let client = mock_client(&test_json::GROUP_RECORD_X);
    let service = new_service(&client, ReactionSettingsConfig::new());
    let mut updates = service.subscribe_updates();
    let mut session = service.open_session(ChatId::new(7)).await.unwrap();

    let read_back = client.gate_next_fetch();

    session.toggle_one(&ReactionId::from("y")).unwrap();
    assert_matches!(
        session.flush().await,
        Ok(FlushOutcome::Pushed { sequence }) => assert_eq!(sequence, SequenceNumber::new(1))
    );

    // The server doesn't send revisions, and still answers with the record
    // from before the push.
    read_back.send(Ok(record(&test_json::GROUP_RECORD_X))).unwrap();

    assert_matches!(
        next_update(&mut updates).await,
        ReconciliationUpdate::RecordUpdated { sequence, .. } => {
            assert_eq!(sequence, SequenceNumber::ZERO);
        }
    );
    assert_matches!(
        next_update(&mut updates).await,
        ReconciliationUpdate::RecordUpdated { enabled, sequence, .. } => {
            assert_eq!(enabled, set(&["x", "y"]));
            assert_eq!(sequence, SequenceNumber::new(1));
        }
    );
    assert_matches!(
        next_update(&mut updates).await,
        ReconciliationUpdate::StaleEchoDiscarded { chat_id, sequence, current } => {
            assert_eq!(chat_id, ChatId::new(7));
            assert_eq!(sequence, SequenceNumber::new(1));
            assert_eq!(current, SequenceNumber::new(1));
        }
    );

    let cached = service.cached_record(ChatId::new(7)).unwrap();
    assert_eq!(cached.enabled, set(&["x", "y"]));
    assert_eq!(cached.origin, RecordOrigin::Push);
    assert_eq!(service.reconciliation_stats(), ReconciliationStats { applied: 2, stale_echoes: 1 });
}

#[tokio::test]
async fn test_read_back_with_an_older_revision_is_discarded() {
    let client = mock_client(&test_json::CHANNEL_RECORD);
    let service = new_service(&client, ReactionSettingsConfig::new());
    let mut updates = service.subscribe_updates();
    let mut session = service.open_session(ChatId::new(42)).await.unwrap();

    assert_matches!(
        next_update(&mut updates).await,
        ReconciliationUpdate::RecordUpdated { sequence, .. } => {
            assert_eq!(sequence, SequenceNumber::ZERO);
        }
    );

    let read_back = client.gate_next_fetch();

    session.toggle_one(&ReactionId::from("z")).unwrap();
    assert_matches!(session.flush().await, Ok(FlushOutcome::Pushed { .. }));

    assert_matches!(
        next_update(&mut updates).await,
        ReconciliationUpdate::RecordUpdated { enabled, sequence, .. } => {
            assert_eq!(enabled, set(&["x", "y", "z"]));
            assert_eq!(sequence, SequenceNumber::new(1));
        }
    );

    let cached = service.cached_record(ChatId::new(42)).unwrap();
    assert_eq!(cached.revision, Some(4));

    // Same push, but the server answered with the record from before it.
    read_back.send(Ok(record(&test_json::CHANNEL_RECORD))).unwrap();

    assert_matches!(
        next_update(&mut updates).await,
        ReconciliationUpdate::StaleEchoDiscarded { sequence, current, .. } => {
            assert_eq!(sequence, SequenceNumber::new(1));
            assert_eq!(current, SequenceNumber::new(1));
        }
    );
    assert_eq!(service.cached_record(ChatId::new(42)).unwrap(), cached);
}

#[tokio::test]
async fn test_refresh_record() {
    let client = mock_client(&test_json::GROUP_RECORD_X);
    let service = new_service(&client, ReactionSettingsConfig::new());
    let mut updates = service.subscribe_updates();

    assert!(service.cached_record(ChatId::new(7)).is_none());

    service.refresh_record(ChatId::new(7)).await.unwrap();
    assert_matches!(
        next_update(&mut updates).await,
        ReconciliationUpdate::RecordUpdated { chat_id, enabled, sequence } => {
            assert_eq!(chat_id, ChatId::new(7));
            assert_eq!(enabled, set(&["x"]));
            assert_eq!(sequence, SequenceNumber::ZERO);
        }
    );

    // Changed by another device.
    client.set_record(record(&test_json::GROUP_RECORD_ALL));
    service.refresh_record(ChatId::new(7)).await.unwrap();
    assert_matches!(
        next_update(&mut updates).await,
        ReconciliationUpdate::RecordUpdated { enabled, .. } => {
            let enabled: Vec<_> = enabled.into_iter().collect();
            assert_eq!(enabled, reactions(&["z", "x", "y"]));
        }
    );

    // A failed read leaves the cache alone.
    client.respond_next_fetch(Err(FetchError(RequestError::Timeout)));
    service.refresh_record(ChatId::new(7)).await.unwrap();
    assert_eq!(service.cached_record(ChatId::new(7)).unwrap().enabled, set(&["x", "y", "z"]));
    assert_eq!(service.reconciliation_stats().applied, 2);
}

#[tokio::test]
async fn test_refresh_after_a_push_is_tagged_with_it() {
    let client = mock_client(&test_json::GROUP_RECORD_X);
    let service = new_service(&client, ReactionSettingsConfig::new().confirm_after_push(false));
    let mut updates = service.subscribe_updates();

    let mut session = service.open_session(ChatId::new(7)).await.unwrap();
    session.toggle_one(&ReactionId::from("y")).unwrap();
    assert_matches!(session.flush().await, Ok(FlushOutcome::Pushed { .. }));

    service.refresh_record(ChatId::new(7)).await.unwrap();

    // Opening, pushing, then refreshing.
    next_update(&mut updates).await;
    next_update(&mut updates).await;
    assert_matches!(
        next_update(&mut updates).await,
        ReconciliationUpdate::RecordUpdated { sequence, .. } => {
            assert_eq!(sequence, SequenceNumber::new(1));
        }
    );
}
