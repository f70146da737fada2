// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use time::OffsetDateTime;
use tracing::debug;

use crate::error::Failure;
use crate::ids::{Ticket, TicketCounter};
use crate::model::{
    ChatContext, ChatMessage, ChatRequest, ChatResponse, ChatRole, ChatVariant, ShoppingListItem,
};

pub const GREETING: &str =
    "Tell me about your project or scenario and I will propose a structured shopping kit.";
pub const EMPTY_SCENARIO_ERROR: &str = "Enter a short scenario to continue.";
pub const DEFAULT_REPLY: &str = "Fallback kit ready. These are safe demo items.";
pub const ASSISTANT_UNAVAILABLE: &str = "Assistant temporarily unavailable. Using cached kit.";
pub const DEFAULT_ORG_TYPE: &str = "distribution";
pub const DEFAULT_PROJECT_TYPE: &str = "warehouse setup";

const SAMPLE_SKU: &str = "SKU-1002";
const SAMPLE_SCENARIO: &str =
    "We are opening a new satellite warehouse and need a receiving and safety starter kit.";

/// Replies that admit to a cached or offline answer.
pub fn is_fallback_reply(text: &str) -> bool {
    let lowered = text.to_lowercase();
    lowered.contains("cached kit") || lowered.contains("fallback")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantCommand {
    SetScenario(String),
    SetSelectedSku(String),
    SetOrgType(String),
    SetProjectType(String),
    ApplySamplePrompt,
    SendPrompt,
    ClearTranscript,
    ChatCompleted {
        ticket: Ticket,
        result: Result<ChatResponse, Failure>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssistantEffect {
    SendChat { ticket: Ticket, request: ChatRequest },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantState {
    scenario: String,
    selected_sku: String,
    org_type: String,
    project_type: String,
    in_flight: Option<Ticket>,
    error_message: Option<String>,
    show_fallback_indicator: bool,
    transcript: Vec<ChatMessage>,
    shopping_list: Vec<ShoppingListItem>,
    tickets: TicketCounter,
}

impl AssistantState {
    pub fn new(now: OffsetDateTime) -> Self {
        Self::with_context_defaults(DEFAULT_ORG_TYPE, DEFAULT_PROJECT_TYPE, now)
    }

    pub fn with_context_defaults(org_type: &str, project_type: &str, now: OffsetDateTime) -> Self {
        Self {
            scenario: String::new(),
            selected_sku: String::new(),
            org_type: org_type.to_owned(),
            project_type: project_type.to_owned(),
            in_flight: None,
            error_message: None,
            show_fallback_indicator: false,
            transcript: vec![greeting(now)],
            shopping_list: Vec::new(),
            tickets: TicketCounter::default(),
        }
    }

    pub fn dispatch(
        &mut self,
        command: AssistantCommand,
        now: OffsetDateTime,
    ) -> Vec<AssistantEffect> {
        match command {
            AssistantCommand::SetScenario(value) => {
                self.scenario = value;
                Vec::new()
            }
            AssistantCommand::SetSelectedSku(value) => {
                self.selected_sku = value;
                Vec::new()
            }
            AssistantCommand::SetOrgType(value) => {
                self.org_type = value;
                Vec::new()
            }
            AssistantCommand::SetProjectType(value) => {
                self.project_type = value;
                Vec::new()
            }
            AssistantCommand::ApplySamplePrompt => {
                self.selected_sku = SAMPLE_SKU.to_owned();
                self.org_type = DEFAULT_ORG_TYPE.to_owned();
                self.project_type = DEFAULT_PROJECT_TYPE.to_owned();
                self.scenario = SAMPLE_SCENARIO.to_owned();
                Vec::new()
            }
            AssistantCommand::SendPrompt => self.send_prompt(now),
            AssistantCommand::ClearTranscript => {
                self.clear_transcript(now);
                Vec::new()
            }
            AssistantCommand::ChatCompleted { ticket, result } => {
                self.chat_completed(ticket, result, now);
                Vec::new()
            }
        }
    }

    fn send_prompt(&mut self, now: OffsetDateTime) -> Vec<AssistantEffect> {
        if self.in_flight.is_some() {
            return Vec::new();
        }
        let trimmed = self.scenario.trim().to_owned();
        if trimmed.is_empty() {
            self.error_message = Some(EMPTY_SCENARIO_ERROR.to_owned());
            return Vec::new();
        }

        self.error_message = None;
        self.append(ChatRole::User, trimmed.clone(), ChatVariant::Default, now);
        let ticket = self.tickets.issue();
        self.in_flight = Some(ticket);
        vec![AssistantEffect::SendChat {
            ticket,
            request: self.build_request(trimmed),
        }]
    }

    fn build_request(&self, message: String) -> ChatRequest {
        let context = ChatContext {
            selected_sku: non_empty(&self.selected_sku),
            org_type: non_empty(&self.org_type),
            project_type: non_empty(&self.project_type),
        };
        ChatRequest {
            message,
            context: (!context.is_empty()).then_some(context),
        }
    }

    fn chat_completed(
        &mut self,
        ticket: Ticket,
        result: Result<ChatResponse, Failure>,
        now: OffsetDateTime,
    ) {
        if self.in_flight != Some(ticket) {
            debug!(%ticket, "discarding stale assistant completion");
            return;
        }

        match result {
            Ok(response) => {
                let reply = response
                    .reply_text
                    .unwrap_or_else(|| DEFAULT_REPLY.to_owned());
                let fallback = is_fallback_reply(&reply);
                let variant = if fallback {
                    ChatVariant::Fallback
                } else {
                    ChatVariant::Default
                };
                self.append(ChatRole::Assistant, reply, variant, now);
                self.shopping_list = response.shopping_list.unwrap_or_default();
                self.show_fallback_indicator = fallback;
            }
            Err(failure) => {
                let friendly = failure.describe(ASSISTANT_UNAVAILABLE);
                self.append(ChatRole::System, friendly.clone(), ChatVariant::Error, now);
                self.error_message = Some(friendly);
                self.shopping_list.clear();
                self.show_fallback_indicator = true;
            }
        }

        self.in_flight = None;
        self.scenario.clear();
    }

    /// Back to the greeting. A reply still in flight is dropped when it
    /// arrives.
    fn clear_transcript(&mut self, now: OffsetDateTime) {
        self.transcript = vec![greeting(now)];
        self.shopping_list.clear();
        self.error_message = None;
        self.show_fallback_indicator = false;
        self.scenario.clear();
        self.selected_sku.clear();
        self.in_flight = None;
    }

    fn append(&mut self, role: ChatRole, text: String, variant: ChatVariant, now: OffsetDateTime) {
        self.transcript.push(ChatMessage {
            role,
            text,
            timestamp: now,
            variant,
        });
    }

    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    pub fn selected_sku(&self) -> &str {
        &self.selected_sku
    }

    pub fn org_type(&self) -> &str {
        &self.org_type
    }

    pub fn project_type(&self) -> &str {
        &self.project_type
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn show_fallback_indicator(&self) -> bool {
        self.show_fallback_indicator
    }

    pub fn conversation(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn shopping_list(&self) -> &[ShoppingListItem] {
        &self.shopping_list
    }
}

fn greeting(now: OffsetDateTime) -> ChatMessage {
    ChatMessage {
        role: ChatRole::Assistant,
        text: GREETING.to_owned(),
        timestamp: now,
        variant: ChatVariant::Default,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::{
        ASSISTANT_UNAVAILABLE, AssistantCommand, AssistantEffect, AssistantState, DEFAULT_REPLY,
        EMPTY_SCENARIO_ERROR, GREETING, is_fallback_reply,
    };
    use crate::error::{ApiError, Failure};
    use crate::ids::Ticket;
    use crate::model::{ChatContext, ChatResponse, ChatRole, ChatVariant, ShoppingListItem};
    use time::OffsetDateTime;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-04-01 09:30 UTC);

    fn submit(state: &mut AssistantState, scenario: &str) -> Vec<AssistantEffect> {
        state.dispatch(AssistantCommand::SetScenario(scenario.to_owned()), NOW);
        state.dispatch(AssistantCommand::SendPrompt, NOW)
    }

    fn ticket_of(effects: &[AssistantEffect]) -> Ticket {
        match effects {
            [AssistantEffect::SendChat { ticket, .. }] => *ticket,
            other => panic!("expected one chat request, got {other:?}"),
        }
    }

    fn item(sku: &str) -> ShoppingListItem {
        ShoppingListItem {
            sku: sku.to_owned(),
            name: format!("Item {sku}"),
            qty: 2,
            reason: "starter kit".to_owned(),
        }
    }

    #[test]
    fn starts_with_greeting() {
        let state = AssistantState::new(NOW);
        assert_eq!(state.conversation().len(), 1);
        assert_eq!(state.conversation()[0].role, ChatRole::Assistant);
        assert_eq!(state.conversation()[0].text, GREETING);
    }

    #[test]
    fn whitespace_scenario_sets_inline_error_without_request() {
        let mut state = AssistantState::new(NOW);
        let effects = submit(&mut state, "   \n");
        assert!(effects.is_empty());
        assert_eq!(state.error_message(), Some(EMPTY_SCENARIO_ERROR));
        assert_eq!(state.conversation().len(), 1);
        assert!(!state.is_loading());
    }

    #[test]
    fn submit_appends_user_message_and_builds_trimmed_context() {
        let mut state = AssistantState::new(NOW);
        state.dispatch(AssistantCommand::SetSelectedSku("  SKU-7 ".to_owned()), NOW);
        state.dispatch(AssistantCommand::SetProjectType("   ".to_owned()), NOW);
        let effects = submit(&mut state, "  need gloves  ");

        let [AssistantEffect::SendChat { request, .. }] = effects.as_slice() else {
            panic!("expected one chat request, got {effects:?}");
        };
        assert_eq!(request.message, "need gloves");
        assert_eq!(
            request.context,
            Some(ChatContext {
                selected_sku: Some("SKU-7".to_owned()),
                org_type: Some("distribution".to_owned()),
                project_type: None,
            })
        );
        assert!(state.is_loading());
        let last = state.conversation().last().expect("user message");
        assert_eq!(last.role, ChatRole::User);
        assert_eq!(last.text, "need gloves");
    }

    #[test]
    fn context_is_omitted_when_every_field_is_blank() {
        let mut state = AssistantState::with_context_defaults("", " ", NOW);
        let effects = submit(&mut state, "hello");
        let [AssistantEffect::SendChat { request, .. }] = effects.as_slice() else {
            panic!("expected one chat request, got {effects:?}");
        };
        assert_eq!(request.context, None);
    }

    #[test]
    fn send_while_in_flight_is_noop() {
        let mut state = AssistantState::new(NOW);
        let first = submit(&mut state, "first");
        assert_eq!(first.len(), 1);
        let second = submit(&mut state, "second");
        assert!(second.is_empty());
        assert_eq!(state.conversation().len(), 2);
    }

    #[test]
    fn normal_reply_is_default_variant() {
        let mut state = AssistantState::new(NOW);
        let ticket = ticket_of(&submit(&mut state, "kit please"));
        state.dispatch(
            AssistantCommand::ChatCompleted {
                ticket,
                result: Ok(ChatResponse {
                    reply_text: Some("Here are 3 items".to_owned()),
                    shopping_list: Some(vec![item("A"), item("B"), item("C")]),
                }),
            },
            NOW,
        );

        let last = state.conversation().last().expect("assistant reply");
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.variant, ChatVariant::Default);
        assert_eq!(state.shopping_list().len(), 3);
        assert!(!state.show_fallback_indicator());
        assert!(!state.is_loading());
        assert_eq!(state.scenario(), "");
    }

    #[test]
    fn cached_kit_reply_is_fallback_variant() {
        let mut state = AssistantState::new(NOW);
        let ticket = ticket_of(&submit(&mut state, "kit please"));
        state.dispatch(
            AssistantCommand::ChatCompleted {
                ticket,
                result: Ok(ChatResponse {
                    reply_text: Some("Using cached kit for now".to_owned()),
                    shopping_list: None,
                }),
            },
            NOW,
        );

        let last = state.conversation().last().expect("assistant reply");
        assert_eq!(last.variant, ChatVariant::Fallback);
        assert!(state.show_fallback_indicator());
        assert!(state.shopping_list().is_empty());
    }

    #[test]
    fn missing_reply_text_uses_default_fallback_message() {
        let mut state = AssistantState::new(NOW);
        let ticket = ticket_of(&submit(&mut state, "kit please"));
        state.dispatch(
            AssistantCommand::ChatCompleted {
                ticket,
                result: Ok(ChatResponse::default()),
            },
            NOW,
        );
        let last = state.conversation().last().expect("assistant reply");
        assert_eq!(last.text, DEFAULT_REPLY);
        assert_eq!(last.variant, ChatVariant::Fallback);
    }

    #[test]
    fn failure_appends_system_error_and_raises_indicator() {
        let mut state = AssistantState::new(NOW);
        let ticket = ticket_of(&submit(&mut state, "kit please"));
        state.dispatch(
            AssistantCommand::ChatCompleted {
                ticket,
                result: Err(Failure::Api(ApiError::Status(502))),
            },
            NOW,
        );

        let last = state.conversation().last().expect("system message");
        assert_eq!(last.role, ChatRole::System);
        assert_eq!(last.variant, ChatVariant::Error);
        assert_eq!(last.text, "server returned 502");
        assert_eq!(state.error_message(), Some("server returned 502"));
        assert!(state.show_fallback_indicator());
        assert!(!state.is_loading());
        assert_eq!(state.scenario(), "");
    }

    #[test]
    fn unknown_failure_uses_cached_kit_text() {
        let mut state = AssistantState::new(NOW);
        let ticket = ticket_of(&submit(&mut state, "kit please"));
        state.dispatch(
            AssistantCommand::ChatCompleted {
                ticket,
                result: Err(Failure::Unknown),
            },
            NOW,
        );
        assert_eq!(state.error_message(), Some(ASSISTANT_UNAVAILABLE));
    }

    #[test]
    fn clear_transcript_resets_and_drops_in_flight_reply() {
        let mut state = AssistantState::new(NOW);
        state.dispatch(AssistantCommand::ApplySamplePrompt, NOW);
        assert_eq!(state.selected_sku(), "SKU-1002");
        let ticket = ticket_of(&state.dispatch(AssistantCommand::SendPrompt, NOW));

        state.dispatch(AssistantCommand::ClearTranscript, NOW);
        assert_eq!(state.conversation().len(), 1);
        assert_eq!(state.selected_sku(), "");
        assert!(!state.is_loading());

        state.dispatch(
            AssistantCommand::ChatCompleted {
                ticket,
                result: Ok(ChatResponse {
                    reply_text: Some("late".to_owned()),
                    shopping_list: Some(vec![item("A")]),
                }),
            },
            NOW,
        );
        assert_eq!(state.conversation().len(), 1);
        assert!(state.shopping_list().is_empty());
    }

    #[test]
    fn fallback_classification_is_case_insensitive() {
        assert!(is_fallback_reply("Using CACHED KIT for now"));
        assert!(is_fallback_reply("FallBack answer"));
        assert!(!is_fallback_reply("Here are 3 items"));
    }
}
