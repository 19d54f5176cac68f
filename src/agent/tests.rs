//! Session-level scenarios for the assistant state machine.

use super::*;
use crate::advice::{FALLBACK_REPLY, UNCLEAR_TOPIC, UNSUPPORTED_GOAL};
use crate::agent::error::{BACKEND_UNAVAILABLE_PREFIX, INVALID_NUMBER_MESSAGE, ZERO_HEIGHT_MESSAGE};
use crate::memory::{ConversationTurn, Role};
use crate::providers::Provider;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Backend that replays queued outcomes and records every prompt it sees.
/// An exhausted queue behaves like a model that returned nothing.
#[derive(Clone, Default)]
struct ScriptedProvider {
    outcomes: Arc<Mutex<VecDeque<anyhow::Result<Option<String>>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedProvider {
    fn answering(texts: &[&str]) -> Self {
        let provider = Self::default();
        for text in texts {
            provider.push(Ok(Some((*text).to_string())));
        }
        provider
    }

    fn push(&self, outcome: anyhow::Result<Option<String>>) {
        self.outcomes.lock().push_back(outcome);
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn generate(&self, _model: &str, prompt: &str) -> anyhow::Result<Option<String>> {
        self.prompts.lock().push(prompt.to_string());
        self.outcomes.lock().pop_front().unwrap_or(Ok(None))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn assistant_with(provider: &ScriptedProvider) -> FitnessAssistant {
    FitnessAssistant::new(Box::new(provider.clone()), "llama2")
}

async fn feed(assistant: &mut FitnessAssistant, inputs: &[&str]) -> Vec<Reply> {
    let mut replies = Vec::with_capacity(inputs.len());
    for input in inputs {
        replies.push(assistant.handle(input).await);
    }
    replies
}

// ── BMI flow ─────────────────────────────────────────────────────

#[tokio::test]
async fn bmi_flow_reports_value_and_category() {
    let provider = ScriptedProvider::default();
    let mut assistant = assistant_with(&provider);

    let replies = feed(&mut assistant, &["BMI", "70", "1.75"]).await;

    assert_eq!(replies.len(), 3);
    assert!(replies.iter().all(|r| r.flow == Flow::Bmi));
    let last = &replies[2];
    assert!(last.text.contains("22.86"));
    assert!(last.text.contains("健康"));
    assert!(last.error.is_none());
    assert_eq!(*assistant.state(), SessionState::AwaitingInput);
}

#[tokio::test]
async fn bmi_flow_does_not_touch_memory_or_backend() {
    let provider = ScriptedProvider::default();
    let mut assistant = assistant_with(&provider);

    feed(&mut assistant, &["計算 bmi", "90", "1.80"]).await;

    assert!(assistant.memory().is_empty());
    assert!(provider.prompts().is_empty());
}

#[tokio::test]
async fn non_numeric_weight_returns_retry_message_and_resets() {
    let provider = ScriptedProvider::default();
    let mut assistant = assistant_with(&provider);

    let replies = feed(&mut assistant, &["BMI", "seventy"]).await;

    assert_eq!(replies[1].text, INVALID_NUMBER_MESSAGE);
    assert!(matches!(replies[1].error, Some(FlowError::InvalidInput(_))));
    assert_eq!(*assistant.state(), SessionState::AwaitingInput);

    // The next line is a fresh request, not a retried height.
    let again = assistant.handle("BMI").await;
    assert_eq!(*assistant.state(), SessionState::BmiWeight);
    assert_eq!(again.flow, Flow::Bmi);
}

#[tokio::test]
async fn zero_height_is_reported_distinctly() {
    let provider = ScriptedProvider::default();
    let mut assistant = assistant_with(&provider);

    let replies = feed(&mut assistant, &["BMI", "70", "0"]).await;

    assert_eq!(replies[2].error, Some(FlowError::DivisionByZero));
    assert_eq!(replies[2].text, ZERO_HEIGHT_MESSAGE);
}

#[tokio::test]
async fn non_positive_weight_is_rejected_before_height() {
    let provider = ScriptedProvider::default();
    let mut assistant = assistant_with(&provider);

    for weight in ["-5", "0"] {
        let replies = feed(&mut assistant, &["BMI", weight]).await;

        assert_eq!(replies[1].text, INVALID_NUMBER_MESSAGE, "{weight}");
        assert!(matches!(replies[1].error, Some(FlowError::InvalidInput(_))));
        assert_eq!(*assistant.state(), SessionState::AwaitingInput);
    }
    assert!(provider.prompts().is_empty());
}

// ── Plan flow ────────────────────────────────────────────────────

#[tokio::test]
async fn plan_flow_uses_defaults_for_blank_answers() {
    let provider = ScriptedProvider::default();
    let mut assistant = assistant_with(&provider);

    let replies = feed(&mut assistant, &["健身計畫", "增肌", "", ""]).await;

    let plan = &replies[3];
    assert_eq!(plan.flow, Flow::Plan);
    assert!(plan.text.contains("健身程度：初學者"));
    assert!(plan.text.contains("每週訓練時數：5"));
    assert!(plan.text.contains("4-5"));
    assert!(plan.fallback);
    assert!(assistant.memory().is_empty());
}

#[tokio::test]
async fn plan_flow_prefers_model_text_and_keeps_header() {
    let provider = ScriptedProvider::answering(&["週一：胸推 5x5"]);
    let mut assistant = assistant_with(&provider);

    let replies = feed(&mut assistant, &["健身計畫", "減脂", "中級", "6"]).await;

    let plan = &replies[3];
    assert!(plan.text.starts_with("健身目標：減脂\n健身程度：中級\n每週訓練時數：6"));
    assert!(plan.text.ends_with("週一：胸推 5x5"));
    assert!(!plan.fallback);

    let prompts = provider.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("減脂"));
    assert!(assistant.memory().is_empty());
}

#[tokio::test]
async fn plan_flow_with_unknown_goal_apologizes_without_backend() {
    let provider = ScriptedProvider::default();
    let mut assistant = assistant_with(&provider);

    let replies = feed(&mut assistant, &["健身計畫", "瑜伽", "", ""]).await;

    assert!(replies[3].text.starts_with("健身目標：瑜伽"));
    assert!(replies[3].text.ends_with(UNSUPPORTED_GOAL));
    assert!(replies[3].error.is_none());
    assert!(provider.prompts().is_empty());
}

#[tokio::test]
async fn plan_flow_reasks_for_blank_goal() {
    let provider = ScriptedProvider::default();
    let mut assistant = assistant_with(&provider);

    feed(&mut assistant, &["健身計畫", "  "]).await;

    assert_eq!(*assistant.state(), SessionState::PlanGoal);
}

#[tokio::test]
async fn plan_flow_without_enrichment_never_calls_backend() {
    let provider = ScriptedProvider::answering(&["should not be used"]);
    let mut assistant = assistant_with(&provider).with_model_enrichment(false);

    let replies = feed(&mut assistant, &["健身計畫", "耐力提升", "", "4"]).await;

    assert!(replies[3].text.contains("心肺"));
    assert!(!replies[3].fallback);
    assert!(provider.prompts().is_empty());
}

#[tokio::test]
async fn plan_flow_degrades_to_static_plan_when_backend_fails() {
    let provider = ScriptedProvider::default();
    provider.push(Err(anyhow::anyhow!("timeout")));
    let mut assistant = assistant_with(&provider);

    let replies = feed(&mut assistant, &["健身計畫", "增肌", "", ""]).await;

    let plan = &replies[3];
    assert_eq!(plan.flow, Flow::Plan);
    assert!(plan
        .text
        .starts_with(&format!("{BACKEND_UNAVAILABLE_PREFIX}\n健身目標：增肌")));
    assert!(plan.text.contains("4-5"));
    assert!(!plan.text.contains("timeout"));
    assert!(plan.fallback);
    assert_eq!(
        plan.error,
        Some(FlowError::BackendUnavailable("timeout".into()))
    );
    assert!(assistant.memory().is_empty());
    assert_eq!(*assistant.state(), SessionState::AwaitingInput);
}

// ── Advice flow ──────────────────────────────────────────────────

#[tokio::test]
async fn advice_flow_falls_back_to_diet_when_topic_mentions_both() {
    let provider = ScriptedProvider::default();
    let mut assistant = assistant_with(&provider);

    let replies = feed(&mut assistant, &["建議", "運動後的飲食"]).await;

    assert!(replies[1].text.starts_with("一般飲食建議"));
    assert!(replies[1].fallback);
    assert!(assistant.memory().is_empty());
}

#[tokio::test]
async fn advice_flow_uses_model_text_when_present() {
    let provider = ScriptedProvider::answering(&["多喝水"]);
    let mut assistant = assistant_with(&provider);

    let replies = feed(&mut assistant, &["advice", "hydration"]).await;

    assert_eq!(replies[1].text, "多喝水");
    assert!(provider.prompts()[0].contains("hydration"));
}

#[tokio::test]
async fn advice_flow_asks_for_clarification_on_unknown_topic() {
    let provider = ScriptedProvider::default();
    let mut assistant = assistant_with(&provider).with_model_enrichment(false);

    let replies = feed(&mut assistant, &["建議", "睡眠"]).await;

    assert_eq!(replies[1].text, UNCLEAR_TOPIC);
    assert!(!replies[1].fallback);
}

#[tokio::test]
async fn advice_flow_degrades_to_canned_advice_when_backend_fails() {
    let provider = ScriptedProvider::default();
    provider.push(Err(anyhow::anyhow!("timeout")));
    let mut assistant = assistant_with(&provider);

    let replies = feed(&mut assistant, &["建議", "動作"]).await;

    let advice = &replies[1];
    assert_eq!(advice.flow, Flow::Advice);
    assert!(advice.text.starts_with(BACKEND_UNAVAILABLE_PREFIX));
    assert!(advice.text.contains(crate::advice::lookup_advice("動作")));
    assert!(!advice.text.contains("timeout"));
    assert!(advice.fallback);
    assert!(matches!(advice.error, Some(FlowError::BackendUnavailable(_))));
    assert!(assistant.memory().is_empty());
    assert_eq!(*assistant.state(), SessionState::AwaitingInput);
}

// ── Chat flow ────────────────────────────────────────────────────

#[tokio::test]
async fn chat_with_empty_backend_uses_fallback_and_records_two_turns() {
    let provider = ScriptedProvider::default();
    provider.push(Ok(Some("   ".into())));
    let mut assistant = assistant_with(&provider);

    let reply = assistant.handle("今天要練什麼？").await;

    assert_eq!(reply.flow, Flow::Chat);
    assert_eq!(reply.text, FALLBACK_REPLY);
    assert!(reply.fallback);
    assert!(reply.error.is_none());
    assert_eq!(
        assistant.memory().turns(),
        [
            ConversationTurn::user("今天要練什麼？"),
            ConversationTurn::assistant(FALLBACK_REPLY),
        ]
    );
}

#[tokio::test]
async fn chat_prompt_carries_previous_turns() {
    let provider = ScriptedProvider::answering(&["練腿", "再練背"]);
    let mut assistant = assistant_with(&provider);

    feed(&mut assistant, &["今天練什麼", "明天呢"]).await;

    let prompts = provider.prompts();
    assert!(!prompts[0].contains("User:"));
    assert!(prompts[1].contains("User: 今天練什麼\nAssistant: 練腿"));
    assert!(prompts[1].contains("明天呢"));

    let roles: Vec<Role> = assistant.memory().turns().iter().map(|t| t.role()).collect();
    assert_eq!(
        roles,
        [Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
}

#[tokio::test]
async fn backend_failure_degrades_to_canned_reply() {
    let provider = ScriptedProvider::default();
    provider.push(Err(anyhow::anyhow!(
        "connection refused: http://127.0.0.1:11434 Bearer secret-token"
    )));
    let mut assistant = assistant_with(&provider);

    let reply = assistant.handle("hello").await;

    assert!(reply.text.starts_with(BACKEND_UNAVAILABLE_PREFIX));
    assert!(reply.text.ends_with(FALLBACK_REPLY));
    assert!(!reply.text.contains("connection refused"));
    assert!(reply.fallback);
    match &reply.error {
        Some(FlowError::BackendUnavailable(detail)) => {
            assert!(detail.contains("connection refused"));
            assert!(!detail.contains("secret-token"));
        }
        other => panic!("expected BackendUnavailable, got {other:?}"),
    }
    assert_eq!(assistant.memory().len(), 2);
    assert_eq!(*assistant.state(), SessionState::AwaitingInput);
}

#[tokio::test]
async fn sub_tools_between_chats_do_not_pollute_memory() {
    let provider = ScriptedProvider::answering(&["嗨"]);
    let mut assistant = assistant_with(&provider);

    feed(&mut assistant, &["你好", "BMI", "60", "1.6", "建議", "動作"]).await;

    assert_eq!(assistant.memory().len(), 2);
}

// ── Exit ─────────────────────────────────────────────────────────

#[tokio::test]
async fn exit_requires_exact_affirmative() {
    let provider = ScriptedProvider::default();
    let mut assistant = assistant_with(&provider);

    for answer in ["否", "", "是的", "yes"] {
        let replies = feed(&mut assistant, &["退出", answer]).await;
        assert_eq!(replies[0].flow, Flow::Exit);
        assert_eq!(*assistant.state(), SessionState::AwaitingInput, "{answer:?}");
        assert!(!assistant.is_exited());
    }

    let replies = feed(&mut assistant, &["退出", "是"]).await;
    assert!(assistant.is_exited());
    assert!(replies[1].text.contains("再見"));
}

#[tokio::test]
async fn exited_session_stays_exited() {
    let provider = ScriptedProvider::default();
    let mut assistant = assistant_with(&provider);

    feed(&mut assistant, &["exit", "是", "BMI"]).await;

    assert!(assistant.is_exited());
    assert!(provider.prompts().is_empty());
}

#[tokio::test]
async fn english_words_inside_chat_do_not_start_exit() {
    let provider = ScriptedProvider::answering(&["多休息", "六點開門"]);
    let mut assistant = assistant_with(&provider);

    let replies = feed(
        &mut assistant,
        &["I feel quite tired after leg day, any tips?", "which exits the gym are open"],
    )
    .await;

    assert!(replies.iter().all(|r| r.flow == Flow::Chat));
    assert_eq!(replies[1].text, "六點開門");
    assert_eq!(assistant.memory().len(), 4);
    assert_eq!(*assistant.state(), SessionState::AwaitingInput);
}

#[tokio::test]
async fn sub_dialog_input_is_data_not_intent() {
    let provider = ScriptedProvider::default();
    let mut assistant = assistant_with(&provider);

    // "退出" typed as an advice topic must not start the exit dialog.
    let replies = feed(&mut assistant, &["建議", "退出"]).await;

    assert_eq!(replies[1].flow, Flow::Advice);
    assert_eq!(*assistant.state(), SessionState::AwaitingInput);
}

// ── Construction ─────────────────────────────────────────────────

#[tokio::test]
async fn custom_intent_table_changes_priority() {
    let provider = ScriptedProvider::default();
    let table = IntentTable::new(vec![
        IntentRule::new(Intent::Advice, &["建議"]),
        IntentRule::new(Intent::Bmi, &["bmi"]),
    ]);
    let mut assistant = assistant_with(&provider).with_intents(table);

    let reply = assistant.handle("BMI 建議").await;

    assert_eq!(reply.flow, Flow::Advice);
}

#[test]
fn assistant_builds_from_default_config() {
    let config = crate::config::Config::default();
    let assistant = FitnessAssistant::from_config(&config).unwrap();
    assert_eq!(assistant.provider_name(), "ollama");
    assert_eq!(assistant.model(), "llama2");
}

#[test]
fn unknown_provider_in_config_fails_construction() {
    let mut config = crate::config::Config::default();
    config.default_provider = "gpt-cloud".into();
    assert!(FitnessAssistant::from_config(&config).is_err());
}

#[tokio::test]
async fn independent_assistants_do_not_share_memory() {
    let provider = ScriptedProvider::default();
    let mut first = assistant_with(&provider);
    let second = assistant_with(&provider);

    first.handle("hi").await;

    assert_eq!(first.memory().len(), 2);
    assert!(second.memory().is_empty());
}
