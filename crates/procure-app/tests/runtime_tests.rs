// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use procure_app::{
    ApiError, AssistantCommand, ChatResponse, ChatVariant, DashboardCommand, DemoMode,
    HealthStatus, Identity, Runtime, Session,
};
use procure_testkit::{ApiCall, FakeApi, bundle, fixed_now, prediction, shopping_item};

fn runtime(api: FakeApi) -> Runtime<FakeApi> {
    Runtime::with_clock(
        api,
        Session::new(Identity::new("demo-org-a", "BUYER"), DemoMode::default()),
        20,
        fixed_now,
    )
}

fn seeded_api() -> FakeApi {
    FakeApi::new()
        .with_demo("demo-org-a", 27)
        .with_reorders(vec![prediction("SKU-1", "Eco Towels")])
        .with_bundles("SKU-1", vec![bundle("SKU-1", "SKU-2", "Safety Gloves")])
}

#[test]
fn demo_load_runs_full_sequence() {
    let mut runtime = runtime(seeded_api());
    runtime.dispatch_dashboard(DashboardCommand::LoadDemoData);
    assert_eq!(runtime.run_pending(), 3);

    let dashboard = runtime.dashboard();
    assert!(dashboard.has_data());
    assert_eq!(
        dashboard.selected_row().map(|row| row.sku.as_str()),
        Some("SKU-1")
    );
    assert_eq!(dashboard.bundles_for_selection().len(), 1);
    assert_eq!(dashboard.rows()[0].days_until, 7);
    assert_eq!(dashboard.last_loaded_at(), Some(fixed_now()));

    let api = runtime.api();
    assert_eq!(api.demo_loads(), 1);
    assert_eq!(api.reorder_fetches(), 1);
    assert_eq!(api.bundle_skus(), vec!["SKU-1".to_owned()]);
}

#[test]
fn second_load_while_pending_does_not_issue_another_request() {
    let mut runtime = runtime(seeded_api());
    runtime.dispatch_dashboard(DashboardCommand::LoadDemoData);
    runtime.dispatch_dashboard(DashboardCommand::LoadDemoData);
    assert_eq!(runtime.pending_requests(), 1);

    runtime.run_pending();
    assert_eq!(runtime.api().demo_loads(), 1);
}

#[test]
fn empty_reorder_list_issues_no_bundle_fetch() {
    let api = FakeApi::new().with_demo("demo-org-a", 0);
    let mut runtime = runtime(api);
    runtime.dispatch_dashboard(DashboardCommand::LoadDemoData);
    runtime.run_pending();

    assert!(runtime.api().bundle_skus().is_empty());
    assert_eq!(runtime.dashboard().selected_sku(), None);
    assert!(!runtime.dashboard().has_data());
}

#[test]
fn demo_failure_never_fetches_table_or_bundles() {
    let api = FakeApi::new().with_demo_error(ApiError::Server {
        status: 400,
        message: "Missing required identity headers".to_owned(),
    });
    let mut runtime = runtime(api);
    runtime.dispatch_dashboard(DashboardCommand::LoadDemoData);
    assert_eq!(runtime.run_pending(), 1);

    assert_eq!(runtime.api().reorder_fetches(), 0);
    assert!(runtime.api().bundle_skus().is_empty());
    assert_eq!(
        runtime.dashboard().table_error(),
        Some("server error (400): Missing required identity headers")
    );
}

#[test]
fn rapid_row_selection_keeps_only_latest_bundles() {
    let api = seeded_api()
        .with_reorders(vec![
            prediction("SKU-1", "Eco Towels"),
            prediction("SKU-3", "Pallet Wrap"),
        ])
        .with_bundles("SKU-3", vec![bundle("SKU-3", "SKU-4", "Tape")]);
    let mut runtime = runtime(api);
    runtime.dispatch_dashboard(DashboardCommand::LoadDemoData);
    runtime.run_pending();

    runtime.dispatch_dashboard(DashboardCommand::SelectRow("SKU-1".to_owned()));
    runtime.dispatch_dashboard(DashboardCommand::SelectRow("SKU-3".to_owned()));
    runtime.run_pending();

    let cards = runtime.dashboard().bundles_for_selection();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].related_sku, "SKU-4");
    assert_eq!(
        runtime.api().bundle_skus(),
        vec!["SKU-1".to_owned(), "SKU-1".to_owned(), "SKU-3".to_owned()]
    );
}

#[test]
fn org_switch_discards_in_flight_demo_load_and_updates_headers() {
    let mut runtime = runtime(seeded_api());
    runtime.dispatch_dashboard(DashboardCommand::LoadDemoData);
    runtime.dispatch_dashboard(DashboardCommand::SelectOrg("demo-org-b".to_owned()));
    assert_eq!(runtime.session().identity().org_id, "demo-org-b");

    assert_eq!(runtime.run_pending(), 1);
    assert!(!runtime.dashboard().has_data());
    assert_eq!(runtime.api().reorder_fetches(), 0);

    runtime.dispatch_dashboard(DashboardCommand::LoadDemoData);
    runtime.run_pending();
    let orgs: Vec<String> = runtime
        .api()
        .calls()
        .into_iter()
        .map(|call| match call {
            ApiCall::LoadDemo(ctx) | ApiCall::Health(ctx) => ctx.identity.org_id,
            ApiCall::Reorders { ctx, .. }
            | ApiCall::Bundles { ctx, .. }
            | ApiCall::Chat { ctx, .. } => ctx.identity.org_id,
        })
        .collect();
    assert_eq!(orgs, vec!["demo-org-a", "demo-org-b", "demo-org-b", "demo-org-b"]);
}

#[test]
fn role_switch_and_cached_mode_reach_request_context() {
    let mut runtime = runtime(seeded_api());
    runtime.dispatch_dashboard(DashboardCommand::SelectRole("ADMIN".to_owned()));
    runtime.set_use_cached_ai(true);
    runtime.dispatch_dashboard(DashboardCommand::LoadDemoData);
    runtime.run_pending();

    let calls = runtime.api().calls();
    let ApiCall::LoadDemo(ctx) = &calls[0] else {
        panic!("expected demo load first, got {calls:?}");
    };
    assert_eq!(ctx.identity, Identity::new("demo-org-a", "ADMIN"));
    assert!(ctx.use_cached_ai);
}

#[test]
fn assistant_round_trip_classifies_fallback() {
    let api = FakeApi::new().with_chat(ChatResponse {
        reply_text: Some("Using cached kit for now".to_owned()),
        shopping_list: Some(vec![shopping_item("SKU-9", "Hard hat", 4)]),
    });
    let mut runtime = runtime(api);
    runtime.dispatch_assistant(AssistantCommand::SetScenario("New warehouse".to_owned()));
    runtime.dispatch_assistant(AssistantCommand::SendPrompt);
    runtime.dispatch_assistant(AssistantCommand::SendPrompt);
    assert_eq!(runtime.run_pending(), 1);

    let assistant = runtime.assistant();
    assert_eq!(assistant.conversation().len(), 3);
    assert_eq!(
        assistant.conversation().last().map(|message| message.variant),
        Some(ChatVariant::Fallback)
    );
    assert_eq!(assistant.shopping_list().len(), 1);
    assert!(assistant.show_fallback_indicator());

    let requests = runtime.api().chat_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].message, "New warehouse");
}

#[test]
fn assistant_failure_surfaces_system_message() {
    let api = FakeApi::new().with_chat_error(ApiError::Status(503));
    let mut runtime = runtime(api);
    runtime.dispatch_assistant(AssistantCommand::SetScenario("New warehouse".to_owned()));
    runtime.dispatch_assistant(AssistantCommand::SendPrompt);
    runtime.run_pending();

    let assistant = runtime.assistant();
    assert_eq!(assistant.error_message(), Some("server returned 503"));
    assert!(assistant.shopping_list().is_empty());
    assert!(!assistant.is_loading());
}

#[test]
fn health_check_uses_session_context() {
    let runtime = runtime(FakeApi::new());
    let health = runtime.check_health().expect("health should succeed");
    assert_eq!(health.status, HealthStatus::Up);
    assert!(matches!(
        runtime.api().calls().as_slice(),
        [ApiCall::Health(ctx)] if ctx.identity.org_id == "demo-org-a"
    ));
}

#[test]
fn queued_chat_keeps_identity_it_was_issued_with() {
    let mut runtime = runtime(seeded_api());
    runtime.dispatch_assistant(AssistantCommand::SetScenario("New warehouse".to_owned()));
    runtime.dispatch_assistant(AssistantCommand::SendPrompt);
    runtime.dispatch_dashboard(DashboardCommand::SelectOrg("demo-org-b".to_owned()));
    assert_eq!(runtime.session().identity().org_id, "demo-org-b");

    runtime.run_pending();
    let calls = runtime.api().calls();
    let [ApiCall::Chat { ctx, .. }] = calls.as_slice() else {
        panic!("expected a single chat call, got {calls:?}");
    };
    assert_eq!(ctx.identity, Identity::new("demo-org-a", "BUYER"));
}

#[test]
fn queued_request_keeps_cached_mode_it_was_issued_with() {
    let mut runtime = runtime(seeded_api());
    runtime.dispatch_dashboard(DashboardCommand::LoadDemoData);
    runtime.set_use_cached_ai(true);
    runtime.run_pending();

    let cached: Vec<bool> = runtime
        .api()
        .calls()
        .into_iter()
        .map(|call| match call {
            ApiCall::LoadDemo(ctx) | ApiCall::Health(ctx) => ctx.use_cached_ai,
            ApiCall::Reorders { ctx, .. }
            | ApiCall::Bundles { ctx, .. }
            | ApiCall::Chat { ctx, .. } => ctx.use_cached_ai,
        })
        .collect();
    // The demo load was queued before the toggle; the follow-ups after it.
    assert_eq!(cached, vec![false, true, true]);
}

#[test]
fn chat_reply_after_clearing_transcript_is_dropped() {
    let api = FakeApi::new().with_chat(ChatResponse {
        reply_text: Some("Here is your kit".to_owned()),
        shopping_list: Some(vec![shopping_item("SKU-9", "Hard hat", 4)]),
    });
    let mut runtime = runtime(api);
    runtime.dispatch_assistant(AssistantCommand::SetScenario("New warehouse".to_owned()));
    runtime.dispatch_assistant(AssistantCommand::SendPrompt);
    runtime.dispatch_assistant(AssistantCommand::ClearTranscript);
    assert_eq!(runtime.run_pending(), 1);

    let assistant = runtime.assistant();
    assert_eq!(assistant.conversation().len(), 1);
    assert!(assistant.shopping_list().is_empty());
    assert!(!assistant.is_loading());
    assert!(!assistant.show_fallback_indicator());
    assert_eq!(runtime.api().chat_requests().len(), 1);
}
