//! The fitness assistant: one session's turn-by-turn state machine.

use super::classifier::{Intent, IntentTable};
use super::error::{parse_number, FlowError};
use crate::advice::{self, AdviceTopic};
use crate::bmi;
use crate::config::Config;
use crate::memory::ConversationMemory;
use crate::observability;
use crate::plan::PlanRequest;
use crate::prompt::{self, PromptTemplate};
use crate::providers::{self, traits::non_empty, Provider};
use anyhow::Result;
use std::time::Instant;

pub const GREETING: &str = "你好！我是你的健身計畫聊天助手，隨時為你提供健身建議或生成健身計畫。";
pub const INPUT_HINT: &str =
    "請輸入您的問題或需求（如 '計算 BMI' 或 '生成健身計畫'，輸入 '退出' 結束）：";
pub const AFFIRMATIVE: &str = "是";

const ASK_WEIGHT: &str = "請輸入你的體重（公斤）：";
const ASK_HEIGHT: &str = "請輸入你的身高（米）：";
const ASK_GOAL: &str = "請輸入你的健身目標（如增肌、減脂、耐力提升）：";
const ASK_GOAL_AGAIN: &str = "健身目標不能為空，請輸入增肌、減脂或耐力提升：";
const ASK_LEVEL: &str = "請輸入你的健身程度（如初學者、中級、進階，直接按 Enter 使用「初學者」）：";
const ASK_HOURS: &str = "請輸入每週可訓練的時數（直接按 Enter 使用 5 小時）：";
const ASK_TOPIC: &str = "請描述你需要的建議（如飲食、特定運動）：";
const CONFIRM_EXIT: &str = "確定要退出嗎？輸入「是」確認，其他任意輸入取消：";
const EXIT_CANCELLED: &str = "已取消退出，請繼續輸入您的問題或需求。";
const FAREWELL: &str = "感謝使用，再見！";
const SESSION_CLOSED: &str = "對話已結束。";

/// Where the session is between turns.
///
/// The sub-dialog states are the collection steps of the BMI, plan, advice and
/// exit flows; every other transition completes within a single turn.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    AwaitingInput,
    BmiWeight,
    BmiHeight { weight: f64 },
    PlanGoal,
    PlanLevel { goal: String },
    PlanHours { goal: String, level: String },
    AdviceTopic,
    ConfirmingExit,
    Exited,
}

/// The flow that produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Bmi,
    Plan,
    Advice,
    Chat,
    Exit,
}

impl Flow {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bmi => "bmi",
            Self::Plan => "plan",
            Self::Advice => "advice",
            Self::Chat => "chat",
            Self::Exit => "exit",
        }
    }
}

/// The assistant's answer to one line of user input.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub flow: Flow,
    /// Text came from the static library because the model produced nothing.
    pub fallback: bool,
    pub error: Option<FlowError>,
}

impl Reply {
    fn new(flow: Flow, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            flow,
            fallback: false,
            error: None,
        }
    }

    fn failed(flow: Flow, error: FlowError) -> Self {
        Self {
            text: error.user_message().to_string(),
            flow,
            fallback: false,
            error: Some(error),
        }
    }
}

/// Model output for a turn, already collapsed to "text or fall back".
struct Generated {
    text: Option<String>,
    error: Option<FlowError>,
}

impl Generated {
    /// `None` means the model was not asked at all.
    fn split(generated: Option<Self>) -> (Option<String>, Option<FlowError>) {
        generated.map_or((None, None), |g| (g.text, g.error))
    }
}

/// Whether the static library is answering in place of a model that was asked.
fn generated_nothing(body: Option<&str>, error: Option<&FlowError>, asked: bool) -> bool {
    asked && body.is_none() && error.is_none()
}

pub struct FitnessAssistant {
    provider: Box<dyn Provider>,
    model: String,
    template: PromptTemplate,
    intents: IntentTable,
    memory: ConversationMemory,
    state: SessionState,
    enrich_with_model: bool,
    turns: u64,
}

impl FitnessAssistant {
    pub fn new(provider: Box<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            template: PromptTemplate::default(),
            intents: IntentTable::default(),
            memory: ConversationMemory::new(),
            state: SessionState::AwaitingInput,
            enrich_with_model: true,
            turns: 0,
        }
    }

    /// Build an assistant with the provider, model and template from config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = providers::create_provider(
            &config.default_provider,
            config.api_url.as_deref(),
            config.provider_timeout(),
        )?;
        Ok(Self::new(provider, config.default_model.clone())
            .with_template(config.prompt_template()?)
            .with_model_enrichment(config.assistant.enrich_with_model))
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_intents(mut self, intents: IntentTable) -> Self {
        self.intents = intents;
        self
    }

    /// When off, plan and advice flows answer from the static library only.
    pub fn with_model_enrichment(mut self, enabled: bool) -> Self {
        self.enrich_with_model = enabled;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_exited(&self) -> bool {
        self.state == SessionState::Exited
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Handle one line of user input and produce exactly one reply.
    pub async fn handle(&mut self, input: &str) -> Reply {
        self.turns += 1;
        let state = std::mem::replace(&mut self.state, SessionState::AwaitingInput);
        let (intent, reply) = match state {
            SessionState::AwaitingInput => {
                let intent = self.intents.classify(input);
                (intent, self.dispatch(intent, input).await)
            }
            SessionState::BmiWeight => (Intent::Bmi, self.on_weight(input)),
            SessionState::BmiHeight { weight } => (Intent::Bmi, Self::on_height(weight, input)),
            SessionState::PlanGoal => (Intent::Plan, self.on_goal(input)),
            SessionState::PlanLevel { goal } => (Intent::Plan, self.on_level(goal, input)),
            SessionState::PlanHours { goal, level } => {
                (Intent::Plan, self.on_hours(&goal, &level, input).await)
            }
            SessionState::AdviceTopic => (Intent::Advice, self.on_topic(input).await),
            SessionState::ConfirmingExit => (Intent::Exit, self.on_exit_confirmation(input)),
            SessionState::Exited => {
                self.state = SessionState::Exited;
                (Intent::Exit, Reply::new(Flow::Exit, SESSION_CLOSED))
            }
        };

        observability::record_turn(
            self.turns,
            intent.as_str(),
            reply.flow.as_str(),
            reply.fallback,
            reply.error.as_ref().map(FlowError::kind),
            reply.text.chars().count(),
        );
        reply
    }

    async fn dispatch(&mut self, intent: Intent, input: &str) -> Reply {
        match intent {
            Intent::Exit => {
                self.state = SessionState::ConfirmingExit;
                Reply::new(Flow::Exit, CONFIRM_EXIT)
            }
            Intent::Bmi => {
                self.state = SessionState::BmiWeight;
                Reply::new(Flow::Bmi, ASK_WEIGHT)
            }
            Intent::Plan => {
                self.state = SessionState::PlanGoal;
                Reply::new(Flow::Plan, ASK_GOAL)
            }
            Intent::Advice => {
                self.state = SessionState::AdviceTopic;
                Reply::new(Flow::Advice, ASK_TOPIC)
            }
            Intent::Chat => self.chat(input).await,
        }
    }

    // ── BMI ──────────────────────────────────────────────────────

    fn on_weight(&mut self, input: &str) -> Reply {
        let weight = parse_number(input).and_then(|weight| {
            if weight > 0.0 {
                Ok(weight)
            } else {
                Err(FlowError::InvalidInput(format!(
                    "weight must be greater than 0, got {weight}"
                )))
            }
        });
        match weight {
            Ok(weight) => {
                self.state = SessionState::BmiHeight { weight };
                Reply::new(Flow::Bmi, ASK_HEIGHT)
            }
            Err(err) => Reply::failed(Flow::Bmi, err),
        }
    }

    fn on_height(weight: f64, input: &str) -> Reply {
        let result = parse_number(input)
            .and_then(|height| bmi::classify(weight, height).map_err(FlowError::from));
        match result {
            Ok(bmi) => Reply::new(Flow::Bmi, bmi.message),
            Err(err) => Reply::failed(Flow::Bmi, err),
        }
    }

    // ── Plan ─────────────────────────────────────────────────────

    fn on_goal(&mut self, input: &str) -> Reply {
        let goal = input.trim();
        if goal.is_empty() {
            self.state = SessionState::PlanGoal;
            return Reply::new(Flow::Plan, ASK_GOAL_AGAIN);
        }
        self.state = SessionState::PlanLevel {
            goal: goal.to_string(),
        };
        Reply::new(Flow::Plan, ASK_LEVEL)
    }

    fn on_level(&mut self, goal: String, input: &str) -> Reply {
        self.state = SessionState::PlanHours {
            goal,
            level: input.trim().to_string(),
        };
        Reply::new(Flow::Plan, ASK_HOURS)
    }

    async fn on_hours(&mut self, goal: &str, level: &str, input: &str) -> Reply {
        let request = PlanRequest::new(goal, Some(level), Some(input));

        // Unknown goals get the apology without a model round-trip.
        let generated = if self.enrich_with_model && request.recognized_goal().is_some() {
            let prompt = prompt::plan_prompt(&request.goal, &request.level, request.hours_per_week);
            Some(self.generate(&prompt).await)
        } else {
            None
        };

        let (body, error) = Generated::split(generated);
        let fallback = generated_nothing(body.as_deref(), error.as_ref(), self.enrich_with_model)
            && request.recognized_goal().is_some();
        let text = request.compose(body.as_deref());
        Self::finish(Flow::Plan, text, fallback, error)
    }

    // ── Advice ───────────────────────────────────────────────────

    async fn on_topic(&mut self, input: &str) -> Reply {
        let topic = input.trim();
        let generated = if self.enrich_with_model && !topic.is_empty() {
            Some(self.generate(&prompt::advice_prompt(topic)).await)
        } else {
            None
        };

        let (body, error) = Generated::split(generated);
        let fallback = generated_nothing(body.as_deref(), error.as_ref(), self.enrich_with_model)
            && AdviceTopic::classify(topic) != AdviceTopic::Unrecognized;
        let text = body.unwrap_or_else(|| advice::lookup_advice(topic).to_string());
        Self::finish(Flow::Advice, text, fallback, error)
    }

    // ── Chat ─────────────────────────────────────────────────────

    async fn chat(&mut self, input: &str) -> Reply {
        let prompt = self.template.format(self.memory.turns(), input);
        let generated = self.generate(&prompt).await;

        let fallback = generated.text.is_none();
        let text = generated
            .text
            .unwrap_or_else(|| advice::default_reply().to_string());
        let reply = Self::finish(Flow::Chat, text, fallback, generated.error);

        self.memory.record_exchange(input, reply.text.as_str());
        reply
    }

    // ── Exit ─────────────────────────────────────────────────────

    fn on_exit_confirmation(&mut self, input: &str) -> Reply {
        if input.trim() == AFFIRMATIVE {
            self.state = SessionState::Exited;
            Reply::new(Flow::Exit, FAREWELL)
        } else {
            Reply::new(Flow::Exit, EXIT_CANCELLED)
        }
    }

    // ── Backend ──────────────────────────────────────────────────

    /// Ask the backend. Empty output and transport failures both come back as
    /// "no text"; failures also carry the error so the reply can be marked.
    async fn generate(&self, prompt: &str) -> Generated {
        let started = Instant::now();
        match self.provider.generate(&self.model, prompt).await {
            Ok(text) => {
                let text = non_empty(text.as_deref());
                observability::record_generation(
                    self.provider.name(),
                    &self.model,
                    started.elapsed().as_millis(),
                    text.is_some(),
                );
                Generated { text, error: None }
            }
            Err(err) => {
                let detail = providers::sanitize_api_error(&format!("{err:#}"));
                tracing::warn!(
                    provider = self.provider.name(),
                    model = %self.model,
                    error = %detail,
                    "generation backend unavailable, answering from static library"
                );
                Generated {
                    text: None,
                    error: Some(FlowError::BackendUnavailable(detail)),
                }
            }
        }
    }

    fn finish(flow: Flow, text: String, fallback: bool, error: Option<FlowError>) -> Reply {
        let text = match &error {
            Some(err) => format!("{}\n{text}", err.user_message()),
            None => text,
        };
        Reply {
            text,
            flow,
            fallback: fallback || error.is_some(),
            error,
        }
    }
}

