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

use std::time::Duration;

use assert_matches::assert_matches;
use reactions_sdk::{
    config::ReactionSettingsConfig,
    error::{PushError, RequestError},
    reconciliation::{ReconciliationStats, ReconciliationUpdate},
    ChatId, Error, FlushOutcome, ReactionId, SequenceNumber,
};
use reactions_sdk_test::test_json;
use similar_asserts::assert_eq;
use tokio::time::{sleep, timeout};

use crate::{mock_client, new_service, next_update, reactions, record, set};

#[tokio::test]
async fn test_failed_push_keeps_the_baseline() {
    let client = mock_client(&test_json::GROUP_RECORD_X);
    let service = new_service(&client, ReactionSettingsConfig::new());
    let mut session = service.open_session(ChatId::new(7)).await.unwrap();

    client.fail_next_push(RequestError::Remote {
        code: 400,
        message: "REACTION_INVALID".to_owned(),
    });
    session.toggle_one(&ReactionId::from("y")).unwrap();

    assert_matches!(
        session.flush().await,
        Ok(FlushOutcome::PushFailed(error)) => {
            assert_matches!(&*error, PushError(error) => {
                assert_eq!(error.remote_code(), Some(400));
            });
        }
    );

    assert_eq!(session.config().baseline(), &set(&["x"]));
    assert!(session.is_dirty());
    assert!(!service.is_push_in_flight(ChatId::new(7)));

    // The server record is untouched, and isn't read back.
    assert_eq!(client.record(ChatId::new(7)), Some(record(&test_json::GROUP_RECORD_X)));
    assert_eq!(client.fetches(), [ChatId::new(7)]);
}

#[tokio::test]
async fn test_dropped_flush_still_completes_the_push() {
    let client = mock_client(&test_json::GROUP_RECORD_X);
    let service = new_service(&client, ReactionSettingsConfig::new());
    let mut updates = service.subscribe_updates();
    let mut session = service.open_session(ChatId::new(7)).await.unwrap();

    let gate = client.gate_next_push();
    session.toggle_one(&ReactionId::from("y")).unwrap();

    // The screen is torn down before the server answers.
    timeout(Duration::from_millis(50), session.flush()).await.unwrap_err();

    assert!(service.is_push_in_flight(ChatId::new(7)));
    assert_eq!(client.pushes(), [(ChatId::new(7), reactions(&["x", "y"]))]);

    // A second push for the same chat can't overtake the first one.
    assert_matches!(
        session.flush().await,
        Err(Error::PushAlreadyInFlight(chat_id)) => assert_eq!(chat_id, ChatId::new(7))
    );

    gate.send(Ok(())).unwrap();

    loop {
        if let ReconciliationUpdate::RecordUpdated { sequence, enabled, .. } =
            next_update(&mut updates).await
        {
            if sequence == SequenceNumber::new(1) {
                assert_eq!(enabled, set(&["x", "y"]));
                break;
            }
        }
    }

    timeout(Duration::from_secs(5), async {
        while service.is_push_in_flight(ChatId::new(7)) {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    assert_eq!(client.record(ChatId::new(7)).unwrap().available_reactions, reactions(&["x", "y"]));

    // The session never saw the answer, so it still has something to push.
    assert_eq!(session.config().baseline(), &set(&["x"]));
    assert_matches!(
        session.flush().await,
        Ok(FlushOutcome::Pushed { sequence }) => assert_eq!(sequence, SequenceNumber::new(2))
    );
    assert_eq!(client.pushes().len(), 2);
}

#[tokio::test]
async fn test_no_session_while_a_push_is_in_flight() {
    let client = mock_client(&test_json::GROUP_RECORD_X);
    let service = new_service(&client, ReactionSettingsConfig::new());
    let mut session = service.open_session(ChatId::new(7)).await.unwrap();

    let gate = client.gate_next_push();
    session.toggle_one(&ReactionId::from("y")).unwrap();
    timeout(Duration::from_millis(50), session.flush()).await.unwrap_err();
    drop(session);

    assert_matches!(
        service.open_session(ChatId::new(7)).await,
        Err(Error::PushAlreadyInFlight(chat_id)) => assert_eq!(chat_id, ChatId::new(7))
    );
    assert_matches!(
        service.open_session_with_record(record(&test_json::GROUP_RECORD_X)).await,
        Err(Error::PushAlreadyInFlight(_))
    );
    assert_eq!(client.fetches(), [ChatId::new(7)]);

    gate.send(Ok(())).unwrap();

    timeout(Duration::from_secs(5), async {
        while service.is_push_in_flight(ChatId::new(7)) {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    let session = service.open_session(ChatId::new(7)).await.unwrap();
    assert_eq!(session.config().baseline(), &set(&["x", "y"]));
}

#[tokio::test]
async fn test_one_session_per_chat() {
    let client = mock_client(&test_json::GROUP_RECORD_X);
    let service = new_service(&client, ReactionSettingsConfig::new());

    let session = service.open_session(ChatId::new(7)).await.unwrap();

    assert_matches!(
        service.open_session(ChatId::new(7)).await,
        Err(Error::SessionAlreadyOpen(chat_id)) => assert_eq!(chat_id, ChatId::new(7))
    );
    assert_matches!(
        service.open_session_with_record(record(&test_json::GROUP_RECORD_X)).await,
        Err(Error::SessionAlreadyOpen(_))
    );
    assert_eq!(client.fetches().len(), 1);

    drop(session);
    service.open_session(ChatId::new(7)).await.unwrap();
}

#[tokio::test]
async fn test_successful_push_is_read_back() {
    let client = mock_client(&test_json::GROUP_RECORD_X);
    let service = new_service(&client, ReactionSettingsConfig::new());
    let mut updates = service.subscribe_updates();
    let mut session = service.open_session(ChatId::new(7)).await.unwrap();

    session.toggle_one(&ReactionId::from("z")).unwrap();
    assert_matches!(session.flush().await, Ok(FlushOutcome::Pushed { .. }));

    // The record read on open, the push, and the read after the push.
    for _ in 0..3 {
        assert_matches!(
            next_update(&mut updates).await,
            ReconciliationUpdate::RecordUpdated { .. }
        );
    }

    assert_eq!(service.reconciliation_stats(), ReconciliationStats { applied: 3, stale_echoes: 0 });
    assert_eq!(client.fetches(), [ChatId::new(7), ChatId::new(7)]);

    let cached = service.cached_record(ChatId::new(7)).unwrap();
    assert_eq!(cached.enabled, set(&["x", "z"]));
    assert_eq!(cached.sequence, SequenceNumber::new(1));
}

#[tokio::test]
async fn test_push_without_read_back() {
    let client = mock_client(&test_json::GROUP_RECORD_X);
    let service = new_service(&client, ReactionSettingsConfig::new().confirm_after_push(false));
    let mut updates = service.subscribe_updates();
    let mut session = service.open_session(ChatId::new(7)).await.unwrap();

    session.toggle_all();
    assert_matches!(session.flush().await, Ok(FlushOutcome::Pushed { .. }));

    next_update(&mut updates).await;
    assert_matches!(
        next_update(&mut updates).await,
        ReconciliationUpdate::RecordUpdated { enabled, .. } => assert!(enabled.is_empty())
    );

    assert_eq!(service.reconciliation_stats().applied, 2);
    assert_eq!(client.fetches(), [ChatId::new(7)]);
}
