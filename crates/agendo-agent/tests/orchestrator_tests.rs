// SPDX-FileCopyrightText: 2026 Agendo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Full-turn orchestrator tests over real SQLite storage with mock
//! LLM and calendar collaborators.

use std::sync::Arc;

use agendo_agent::{AppContext, ContextOutcome, HistoryUpdate, InboundTurn, Orchestrator, load_context};
use agendo_config::AgendoConfig;
use agendo_core::Storage;
use agendo_core::domain::{Branch, Business, Category, Resource, Service};
use agendo_core::types::{ContentPart, Role};
use agendo_storage::{SqliteStorage, queries};
use agendo_test_utils::{MockCalendar, MockProvider, text_reply, tool_reply};

const BUSINESS_CHANNEL: &str = "+593987654321";
const USER_PHONE: &str = "+593990000001";

struct Harness {
    ctx: AppContext,
    storage: Arc<SqliteStorage>,
    provider: Arc<MockProvider>,
    calendar: Arc<MockCalendar>,
    _dir: tempfile::TempDir,
}

async fn harness(config: AgendoConfig) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config;
    config.storage.database_path = dir.path().join("agent.db").to_string_lossy().into_owned();

    let storage = Arc::new(SqliteStorage::open(&config.storage).await.unwrap());
    let db = storage.database();

    queries::businesses::create_business(
        db,
        &Business {
            id: "biz-1".into(),
            name: "Bella Salon".into(),
            bot_name: "agendo".into(),
            greeting: None,
            channel_address: Some(BUSINESS_CHANNEL.into()),
            booking_window_days: 30,
            is_active: true,
        },
    )
    .await
    .unwrap();
    queries::businesses::create_branch(
        db,
        &Branch {
            id: "branch-1".into(),
            business_id: "biz-1".into(),
            name: "Centro".into(),
            address: "Av. Principal 123".into(),
            city: None,
            is_active: true,
        },
    )
    .await
    .unwrap();
    queries::catalog::create_category(
        db,
        &Category {
            id: "cat-1".into(),
            branch_id: "branch-1".into(),
            name: "Cortes".into(),
            description: None,
            display_order: 0,
        },
    )
    .await
    .unwrap();
    queries::catalog::create_service(
        db,
        &Service {
            id: "svc-1".into(),
            branch_id: "branch-1".into(),
            category_id: "cat-1".into(),
            name: "Corte de cabello".into(),
            description: None,
            price: 25.0,
            duration_minutes: 40,
            is_active: true,
        },
    )
    .await
    .unwrap();
    queries::catalog::create_resource(
        db,
        &Resource {
            id: "res-1".into(),
            branch_id: "branch-1".into(),
            name: "Carlos".into(),
            external_calendar_id: "cal-1".into(),
            default_start: None,
            default_end: None,
            is_active: true,
        },
    )
    .await
    .unwrap();
    queries::catalog::link_resource_service(db, "res-1", "svc-1")
        .await
        .unwrap();

    let provider = Arc::new(MockProvider::new());
    let calendar = Arc::new(MockCalendar::new());
    let ctx = AppContext::new(
        storage.clone(),
        provider.clone(),
        calendar.clone(),
        config,
    );

    Harness {
        ctx,
        storage,
        provider,
        calendar,
        _dir: dir,
    }
}

fn inbound(text: &str) -> InboundTurn {
    InboundTurn {
        from: USER_PHONE.into(),
        to: BUSINESS_CHANNEL.into(),
        text: text.into(),
    }
}

async fn rebuilt_list(h: &Harness, turn: &InboundTurn) -> Vec<agendo_core::types::ChatMessage> {
    match load_context(&h.ctx, turn).await.unwrap() {
        ContextOutcome::Ready { update, .. } => match update {
            HistoryUpdate::Replace(list) => list,
            other => panic!("expected replace, got {other:?}"),
        },
        other => panic!("expected ready, got {other:?}"),
    }
}

async fn ledger(h: &Harness) -> Vec<agendo_core::domain::StoredMessage> {
    let session = h
        .storage
        .get_or_create_session("biz-1", USER_PHONE)
        .await
        .unwrap();
    let conversation = h
        .storage
        .active_conversation(&session.id, 2)
        .await
        .unwrap()
        .expect("active conversation");
    h.storage
        .conversation_messages(&conversation.id, None)
        .await
        .unwrap()
}

#[tokio::test]
async fn repeated_load_context_is_idempotent_and_deterministic() {
    let h = harness(AgendoConfig::default()).await;
    let turn = inbound("hola, quiero una cita");

    // A transport retry delivers the same inbound twice before any
    // reply is produced.
    let first = rebuilt_list(&h, &turn).await;
    let second = rebuilt_list(&h, &turn).await;

    assert_eq!(first, second, "rebuilt lists must be identical");
    let stored = ledger(&h).await;
    assert_eq!(stored.len(), 1, "the duplicate must not be stored");
    assert_eq!(stored[0].content, "hola, quiero una cita");
}

#[tokio::test]
async fn unresolved_identity_ends_turn_without_reply() {
    let h = harness(AgendoConfig::default()).await;
    let orchestrator = Orchestrator::new(h.ctx.clone());

    let turn = InboundTurn {
        from: USER_PHONE.into(),
        to: "+10000000000".into(),
        text: "hola".into(),
    };
    let reply = orchestrator.handle_turn(&turn).await.unwrap();
    assert!(reply.is_none());
    assert!(h.provider.requests().await.is_empty(), "no LLM call without identity");
}

#[tokio::test]
async fn plain_turn_persists_user_and_reply() {
    let h = harness(AgendoConfig::default()).await;
    h.provider.push_reply(text_reply("¡Hola! ¿En qué te ayudo?")).await;

    let orchestrator = Orchestrator::new(h.ctx.clone());
    let reply = orchestrator.handle_turn(&inbound("hola")).await.unwrap();
    assert_eq!(reply.as_deref(), Some("¡Hola! ¿En qué te ayudo?"));

    let stored = ledger(&h).await;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].role, Role::User);
    assert_eq!(stored[0].content, "hola");
    assert_eq!(stored[1].role, Role::Assistant);
    assert_eq!(stored[1].content, "¡Hola! ¿En qué te ayudo?");
}

#[tokio::test]
async fn tool_loop_feeds_results_back_and_persists_only_the_final_reply() {
    let h = harness(AgendoConfig::default()).await;
    h.provider
        .push_reply(tool_reply("get_services", serde_json::json!({"branch_id": "branch-1"})))
        .await;
    h.provider
        .push_reply(text_reply("Tenemos corte de cabello a $25.00"))
        .await;

    let orchestrator = Orchestrator::new(h.ctx.clone());
    let reply = orchestrator
        .handle_turn(&inbound("¿qué servicios tienen?"))
        .await
        .unwrap();
    assert_eq!(reply.as_deref(), Some("Tenemos corte de cabello a $25.00"));

    // The second LLM request carries the tool result.
    let requests = h.provider.requests().await;
    assert_eq!(requests.len(), 2);
    let last_message = requests[1].messages.last().unwrap();
    match last_message.content.first() {
        Some(ContentPart::ToolResult { content, .. }) => {
            assert!(content.contains("Corte de cabello"), "tool output: {content}");
        }
        other => panic!("expected tool result, got {other:?}"),
    }

    // Tool plumbing is ephemeral; only user text and the final reply
    // reach the ledger.
    let stored = ledger(&h).await;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].content, "Tenemos corte de cabello a $25.00");
}

#[tokio::test]
async fn tool_failures_become_conversational_results() {
    let h = harness(AgendoConfig::default()).await;
    // The calendar is down; the availability tool must still answer.
    h.calendar.set_failing(true).await;
    h.provider
        .push_reply(tool_reply(
            "get_available_slots",
            serde_json::json!({
                "branch_id": "branch-1",
                "service_name": "corte",
                "target_date": "2020-01-01"
            }),
        ))
        .await;
    h.provider
        .push_reply(text_reply("Esa fecha ya pasó, ¿quieres otra?"))
        .await;

    let orchestrator = Orchestrator::new(h.ctx.clone());
    let reply = orchestrator.handle_turn(&inbound("turno para el corte")).await.unwrap();
    assert!(reply.is_some());

    let requests = h.provider.requests().await;
    let last_message = requests[1].messages.last().unwrap();
    match last_message.content.first() {
        Some(ContentPart::ToolResult { content, .. }) => {
            assert!(content.contains("fechas pasadas"), "tool output: {content}");
        }
        other => panic!("expected tool result, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_reply_is_not_persisted() {
    let h = harness(AgendoConfig::default()).await;
    h.provider.push_reply(text_reply("   ")).await;

    let orchestrator = Orchestrator::new(h.ctx.clone());
    let reply = orchestrator.handle_turn(&inbound("hola")).await.unwrap();
    assert!(reply.is_none());

    let stored = ledger(&h).await;
    assert_eq!(stored.len(), 1, "only the inbound message is stored");
}

#[tokio::test]
async fn summary_is_generated_once_threshold_is_crossed() {
    let h = harness(AgendoConfig::default()).await;
    let orchestrator = Orchestrator::new(h.ctx.clone());

    // Three full turns: 6 messages, still at the threshold.
    for i in 0..3 {
        h.provider.push_reply(text_reply(&format!("respuesta {i}"))).await;
        orchestrator
            .handle_turn(&inbound(&format!("mensaje {i}")))
            .await
            .unwrap();
    }
    let session = h.storage.get_or_create_session("biz-1", USER_PHONE).await.unwrap();
    let conversation = h.storage.active_conversation(&session.id, 2).await.unwrap().unwrap();
    assert!(conversation.summary.is_none());

    // The fourth turn crosses it: the turn reply plus one summary call.
    h.provider.push_reply(text_reply("respuesta 3")).await;
    h.provider.push_reply(text_reply("la clienta pregunta por cortes")).await;
    orchestrator.handle_turn(&inbound("mensaje 3")).await.unwrap();

    let conversation = h.storage.active_conversation(&session.id, 2).await.unwrap().unwrap();
    assert_eq!(conversation.summary.as_deref(), Some("la clienta pregunta por cortes"));

    // The next turn reloads only the recent tail and embeds the
    // summary in the system prompt.
    h.provider.push_reply(text_reply("respuesta 4")).await;
    orchestrator.handle_turn(&inbound("mensaje 4")).await.unwrap();
    let requests = h.provider.requests().await;
    // Memory maintenance calls carry no system prompt; the last one
    // that does is the assistant call of the fifth turn.
    let assistant_request = requests
        .iter()
        .rev()
        .find(|r| r.system.is_some())
        .unwrap();
    assert!(
        assistant_request
            .system
            .as_deref()
            .unwrap()
            .contains("la clienta pregunta por cortes")
    );
    assert!(
        assistant_request.messages.len() <= 7,
        "short tail plus inbound only"
    );
}

#[tokio::test]
async fn profile_checkpoint_extracts_and_merges() {
    let mut config = AgendoConfig::default();
    // Isolate tier 3: summary far away, checkpoint on the first turn.
    config.memory.summary_threshold = 50;
    config.memory.profile_checkpoint_start = 2;
    let h = harness(config).await;
    let orchestrator = Orchestrator::new(h.ctx.clone());

    h.provider.push_reply(text_reply("mucho gusto, Maria")).await;
    h.provider
        .push_reply(text_reply(r#"{"full_name": "Maria Lopez", "preferred_services": ["Corte"]}"#))
        .await;
    orchestrator
        .handle_turn(&inbound("soy Maria Lopez y me interesa un corte"))
        .await
        .unwrap();

    let session = h.storage.get_or_create_session("biz-1", USER_PHONE).await.unwrap();
    let profile = h.storage.memory_profile(&session.id).await.unwrap().unwrap();
    assert!(profile.contains("Maria Lopez"));
    assert!(profile.contains("Corte"));
}

#[tokio::test]
async fn memory_failures_never_fail_the_turn() {
    let mut config = AgendoConfig::default();
    config.memory.summary_threshold = 3;
    let h = harness(config).await;
    let orchestrator = Orchestrator::new(h.ctx.clone());

    h.provider.push_reply(text_reply("respuesta 0")).await;
    orchestrator.handle_turn(&inbound("mensaje 0")).await.unwrap();

    // The second turn crosses the threshold; its summary call fails.
    h.provider.push_reply(text_reply("respuesta 1")).await;
    h.provider.push_error("summarizer down").await;
    let reply = orchestrator.handle_turn(&inbound("mensaje 1")).await.unwrap();
    assert_eq!(reply.as_deref(), Some("respuesta 1"), "the turn still replies");

    let stored = ledger(&h).await;
    assert_eq!(stored.len(), 4);
    let session = h.storage.get_or_create_session("biz-1", USER_PHONE).await.unwrap();
    let conversation = h.storage.active_conversation(&session.id, 2).await.unwrap().unwrap();
    assert!(conversation.summary.is_none(), "failed summarization leaves no summary");
}
