// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end orchestration tests over the mock provider.

use std::time::Duration;

use tenpo_core::{Candidate, ContentPart, InlineImage, ProviderResponse, QuotaRow, SessionId};
use tenpo_studio::composer::RULE_BLOCK_HEADER;
use tenpo_studio::{
    ChatInstruction, ChatRequest, DesignPreferences, EditMode, FailureKind, GenerationOutcome,
};
use tenpo_test_utils::{StoreFailure, TestHarness, image_response, text_response};

const TODAY: &str = "2026-10-18";
const YESTERDAY: &str = "2026-10-17";

fn photo() -> InlineImage {
    InlineImage::new("image/jpeg", "/9j/4AAQ")
}

fn remaining_of(outcome: &GenerationOutcome) -> Option<u32> {
    match outcome {
        GenerationOutcome::Completed { remaining, .. } => *remaining,
        other => panic!("expected completion, got {other:?}"),
    }
}

fn failure_kind(outcome: &GenerationOutcome) -> FailureKind {
    match outcome {
        GenerationOutcome::Failed { kind, .. } => *kind,
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn exhausted_quota_rejects_without_calling_the_provider() {
    let h = TestHarness::builder().build().await.unwrap();
    h.set_quota_row(QuotaRow {
        daily_generation_count: 20,
        last_generation_date: Some(TODAY.into()),
    })
    .unwrap();
    let session = h.session().await.unwrap();

    let outcome = h
        .orchestrator
        .generate_image(&h.user(), &session, "壁を白く", vec![])
        .await;
    assert!(matches!(outcome, GenerationOutcome::QuotaExceeded { .. }));
    assert_eq!(h.provider.call_count(), 0);

    let design = h
        .orchestrator
        .generate_design(
            &h.user(),
            &session,
            &["和食".into()],
            &DesignPreferences::default(),
            photo(),
        )
        .await;
    assert!(matches!(design, GenerationOutcome::QuotaExceeded { .. }));
    assert_eq!(h.provider.call_count(), 0);

    let json = serde_json::to_value(outcome.into_envelope()).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["quotaExceeded"], true);
    assert_eq!(json["remaining"], 0);
    assert_eq!(json["resetAt"], "2026-10-19T00:00:00+09:00");
}

#[tokio::test]
async fn yesterdays_full_count_does_not_block_today() {
    let h = TestHarness::builder().build().await.unwrap();
    h.set_quota_row(QuotaRow {
        daily_generation_count: 20,
        last_generation_date: Some(YESTERDAY.into()),
    })
    .unwrap();

    let status = h.orchestrator.quota_info(&h.user()).await.unwrap();
    assert!(status.allowed);
    assert_eq!(status.remaining, 20);
    // The stale row is not rewritten by a check.
    assert_eq!(h.quota_row().await.unwrap().daily_generation_count, 20);
}

#[tokio::test]
async fn quota_check_is_idempotent() {
    let h = TestHarness::builder().build().await.unwrap();
    let first = h.orchestrator.quota_info(&h.user()).await.unwrap();
    let second = h.orchestrator.quota_info(&h.user()).await.unwrap();
    assert_eq!(first.remaining, second.remaining);
    assert_eq!(first.reset_at, second.reset_at);
}

#[tokio::test]
async fn text_only_reply_does_not_consume_quota() {
    let h = TestHarness::builder()
        .with_mock_responses(vec![text_response("画像を生成できませんでした")])
        .build()
        .await
        .unwrap();
    let session = h.session().await.unwrap();

    let outcome = h
        .orchestrator
        .generate_image(&h.user(), &session, "照明を暗く", vec![])
        .await;
    assert_eq!(remaining_of(&outcome), Some(20));
    assert_eq!(h.quota_row().await.unwrap().daily_generation_count, 0);
}

#[tokio::test]
async fn image_reply_consumes_exactly_one_generation() {
    let h = TestHarness::builder()
        .with_mock_responses(vec![image_response(Some("できました"), "iVBORw0KGgo=")])
        .build()
        .await
        .unwrap();
    let session = h.session().await.unwrap();

    let outcome = h
        .orchestrator
        .generate_image(&h.user(), &session, "照明を暗く", vec![])
        .await;
    let GenerationOutcome::Completed { data, remaining } = outcome else {
        panic!("expected completion");
    };
    assert_eq!(data.text.as_deref(), Some("できました"));
    assert_eq!(data.image.as_deref(), Some("data:image/png;base64,iVBORw0KGgo="));
    assert_eq!(remaining, Some(19));

    let row = h.quota_row().await.unwrap();
    assert_eq!(row.daily_generation_count, 1);
    assert_eq!(row.last_generation_date.as_deref(), Some(TODAY));
}

#[tokio::test]
async fn last_text_part_wins_in_the_normalized_result() {
    let response = ProviderResponse {
        candidates: vec![Candidate {
            parts: vec![
                ContentPart::Text("A".into()),
                ContentPart::Text("B".into()),
                ContentPart::InlineImage(InlineImage::new("image/png", "QUJD")),
            ],
            finish_reason: None,
        }],
    };
    let h = TestHarness::builder()
        .with_mock_responses(vec![response])
        .build()
        .await
        .unwrap();
    let session = h.session().await.unwrap();

    let outcome = h
        .orchestrator
        .generate_image(&h.user(), &session, "x", vec![])
        .await;
    let GenerationOutcome::Completed { data, .. } = outcome else {
        panic!("expected completion");
    };
    assert_eq!(data.text.as_deref(), Some("B"));
    assert_eq!(data.image.as_deref(), Some("data:image/png;base64,QUJD"));
}

#[tokio::test]
async fn unknown_session_fails_without_quota_mutation() {
    let h = TestHarness::builder()
        .with_mock_responses(vec![image_response(None, "AAAA")])
        .build()
        .await
        .unwrap();

    let outcome = h
        .orchestrator
        .generate_image(&h.user(), &SessionId("never-issued".into()), "x", vec![photo()])
        .await;
    assert_eq!(failure_kind(&outcome), FailureKind::InvalidSession);
    assert_eq!(h.provider.call_count(), 0);
    assert_eq!(h.memory.as_ref().unwrap().increment_calls(), 0);
    assert_eq!(h.quota_row().await.unwrap().daily_generation_count, 0);

    let json = serde_json::to_value(outcome.into_envelope()).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["errorKind"], "invalid_session");
    assert!(json.get("quotaExceeded").is_none());
}

#[tokio::test]
async fn quota_lookup_failure_fails_closed() {
    let h = TestHarness::builder().build().await.unwrap();
    let session = h.session().await.unwrap();
    h.memory.as_ref().unwrap().fail(StoreFailure::Reads);

    let outcome = h
        .orchestrator
        .generate_image(&h.user(), &session, "x", vec![])
        .await;
    assert_eq!(failure_kind(&outcome), FailureKind::QuotaLookup);
    assert_eq!(h.provider.call_count(), 0);
}

#[tokio::test]
async fn missing_profile_row_fails_closed() {
    let h = TestHarness::builder().build().await.unwrap();
    let stranger = tenpo_core::UserId("no-profile".into());
    let session = h.orchestrator.create_session(&stranger).await.unwrap();

    let outcome = h
        .orchestrator
        .generate_image(&stranger, &session, "x", vec![])
        .await;
    assert_eq!(failure_kind(&outcome), FailureKind::QuotaLookup);
    assert_eq!(h.provider.call_count(), 0);
}

#[tokio::test]
#[tracing_test::traced_test]
async fn quota_write_failure_still_returns_the_image() {
    let h = TestHarness::builder()
        .with_mock_responses(vec![image_response(None, "AAAA")])
        .build()
        .await
        .unwrap();
    let session = h.session().await.unwrap();
    h.memory.as_ref().unwrap().fail(StoreFailure::Writes);

    let outcome = h
        .orchestrator
        .generate_image(&h.user(), &session, "x", vec![])
        .await;
    let GenerationOutcome::Completed { data, remaining } = outcome else {
        panic!("expected completion");
    };
    assert!(data.image.is_some());
    assert_eq!(remaining, Some(20));
    assert!(logs_contain("quota increment failed"));
}

#[tokio::test]
async fn provider_error_is_a_generic_failure() {
    let h = TestHarness::builder().build().await.unwrap();
    h.provider.push_error("SAFETY").await;
    let session = h.session().await.unwrap();

    let outcome = h
        .orchestrator
        .generate_image(&h.user(), &session, "x", vec![])
        .await;
    let GenerationOutcome::Failed { kind, message } = outcome else {
        panic!("expected failure");
    };
    assert_eq!(kind, FailureKind::Provider);
    assert!(!message.contains("SAFETY"));
    assert_eq!(h.quota_row().await.unwrap().daily_generation_count, 0);
}

#[tokio::test(start_paused = true)]
async fn slow_provider_times_out() {
    let h = TestHarness::builder()
        .with_timeout(Duration::from_secs(5))
        .with_mock_responses(vec![image_response(None, "AAAA")])
        .build()
        .await
        .unwrap();
    h.provider.set_delay(Duration::from_secs(60));
    let session = h.session().await.unwrap();

    let outcome = h
        .orchestrator
        .generate_image(&h.user(), &session, "x", vec![])
        .await;
    assert_eq!(failure_kind(&outcome), FailureKind::Timeout);
    assert_eq!(h.quota_row().await.unwrap().daily_generation_count, 0);
}

#[tokio::test]
async fn text_precedes_images_in_input_order() {
    let h = TestHarness::builder().build().await.unwrap();
    let session = h.session().await.unwrap();
    let first = InlineImage::new("image/png", "MQ==");
    let second = InlineImage::new("image/jpeg", "Mg==");

    h.orchestrator
        .generate_image(
            &h.user(),
            &session,
            "並べて",
            vec![first.clone(), second.clone()],
        )
        .await;

    let sent = h.provider.sent_parts().await;
    assert_eq!(
        sent,
        vec![vec![
            ContentPart::Text("並べて".into()),
            ContentPart::InlineImage(first),
            ContentPart::InlineImage(second),
        ]]
    );
}

#[tokio::test]
async fn image_only_message_has_no_text_part() {
    let h = TestHarness::builder().build().await.unwrap();
    let session = h.session().await.unwrap();

    h.orchestrator
        .generate_image(&h.user(), &session, "", vec![photo()])
        .await;
    assert_eq!(
        h.provider.sent_parts().await,
        vec![vec![ContentPart::InlineImage(photo())]]
    );
}

#[tokio::test]
async fn empty_request_is_rejected_before_the_quota_check() {
    let h = TestHarness::builder().build().await.unwrap();
    let session = h.session().await.unwrap();
    h.memory.as_ref().unwrap().fail(StoreFailure::Reads);

    let outcome = h
        .orchestrator
        .generate_image(&h.user(), &session, "", vec![])
        .await;
    assert_eq!(failure_kind(&outcome), FailureKind::InvalidRequest);
    assert_eq!(h.provider.call_count(), 0);
}

#[tokio::test]
async fn design_sends_the_style_prompt_with_the_base_photo() {
    let h = TestHarness::builder()
        .with_mock_responses(vec![image_response(None, "AAAA")])
        .build()
        .await
        .unwrap();
    let session = h.session().await.unwrap();

    let outcome = h
        .orchestrator
        .generate_design(
            &h.user(),
            &session,
            &["イタリアン".into(), "ピザ".into()],
            &DesignPreferences::default(),
            photo(),
        )
        .await;
    assert_eq!(remaining_of(&outcome), Some(19));

    let sent = h.provider.sent_parts().await;
    assert_eq!(sent.len(), 1);
    let ContentPart::Text(prompt) = &sent[0][0] else {
        panic!("first part must be text");
    };
    assert!(prompt.contains("料理ジャンル: イタリアン、ピザ"));
    assert_eq!(sent[0][1], ContentPart::InlineImage(photo()));
}

#[tokio::test]
async fn chat_appends_the_rule_block_last() {
    let h = TestHarness::builder().build().await.unwrap();
    let session = h.session().await.unwrap();

    h.orchestrator
        .chat(
            &h.user(),
            &session,
            ChatRequest {
                instruction: ChatInstruction::AddReplace {
                    description: "観葉植物".into(),
                    mode: EditMode::Add,
                },
                rule_ids: vec!["2-1.1".into()],
                images: vec![],
            },
        )
        .await;

    let sent = h.provider.sent_parts().await;
    let ContentPart::Text(prompt) = &sent[0][0] else {
        panic!("first part must be text");
    };
    assert!(prompt.starts_with("画像は観葉植物です。"));
    let block_at = prompt.find(RULE_BLOCK_HEADER).unwrap();
    assert!(prompt[..block_at].ends_with("\n\n"));
    assert!(prompt.ends_with(&format!(
        "2-1.1: {}",
        tenpo_studio::catalog::find("2-1.1").unwrap().title
    )));
}

#[tokio::test]
async fn chat_with_unknown_rule_is_rejected() {
    let h = TestHarness::builder().build().await.unwrap();
    let session = h.session().await.unwrap();

    let outcome = h
        .orchestrator
        .chat(
            &h.user(),
            &session,
            ChatRequest {
                instruction: ChatInstruction::RulesOnly,
                rule_ids: vec!["9-9.9".into()],
                images: vec![],
            },
        )
        .await;
    assert_eq!(failure_kind(&outcome), FailureKind::InvalidRequest);
    assert_eq!(h.provider.call_count(), 0);
}

#[tokio::test]
async fn quota_recovers_after_local_midnight() {
    let h = TestHarness::builder()
        .with_daily_limit(1)
        .with_mock_responses(vec![image_response(None, "AAAA"), image_response(None, "BBBB")])
        .build()
        .await
        .unwrap();
    let session = h.session().await.unwrap();

    let first = h
        .orchestrator
        .generate_image(&h.user(), &session, "x", vec![])
        .await;
    assert_eq!(remaining_of(&first), Some(0));

    let blocked = h
        .orchestrator
        .generate_image(&h.user(), &session, "x", vec![])
        .await;
    assert!(matches!(blocked, GenerationOutcome::QuotaExceeded { .. }));

    // 03:00 UTC + 12h = 00:00 JST the next day.
    h.clock.advance(chrono::Duration::hours(12));
    let next_day = h
        .orchestrator
        .generate_image(&h.user(), &session, "x", vec![])
        .await;
    assert_eq!(remaining_of(&next_day), Some(0));
    assert_eq!(
        h.quota_row().await.unwrap().last_generation_date.as_deref(),
        Some("2026-10-19")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_generations_are_all_counted_in_sqlite() {
    let h = TestHarness::builder()
        .with_sqlite()
        .with_mock_responses(vec![
            image_response(None, "AAAA"),
            image_response(None, "BBBB"),
        ])
        .build()
        .await
        .unwrap();
    let a = h.session().await.unwrap();
    let b = h.session().await.unwrap();
    let user = h.user();

    let (first, second) = tokio::join!(
        h.orchestrator.generate_image(&user, &a, "x", vec![]),
        h.orchestrator.generate_image(&user, &b, "y", vec![]),
    );
    assert!(first.is_success());
    assert!(second.is_success());
    assert_eq!(h.quota_row().await.unwrap().daily_generation_count, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ledger_increments_never_lose_an_update() {
    let h = TestHarness::builder().with_sqlite().build().await.unwrap();
    let user = h.user();
    let ledger = h.orchestrator.ledger();

    let (a, b) = tokio::join!(
        ledger.increment_generation(&user),
        ledger.increment_generation(&user)
    );
    a.unwrap();
    b.unwrap();
    assert_eq!(h.quota_row().await.unwrap().daily_generation_count, 2);
}

#[tokio::test(start_paused = true)]
async fn sends_on_one_session_are_serialized() {
    let h = TestHarness::builder().build().await.unwrap();
    h.provider.set_delay(Duration::from_secs(1));
    let session = h.session().await.unwrap();
    let user = h.user();

    let started = tokio::time::Instant::now();
    let (a, b) = tokio::join!(
        h.orchestrator.generate_image(&user, &session, "first", vec![]),
        h.orchestrator.generate_image(&user, &session, "second", vec![]),
    );
    assert!(a.is_success() && b.is_success());
    assert!(started.elapsed() >= Duration::from_secs(2));
    assert_eq!(h.provider.call_count(), 2);
}
