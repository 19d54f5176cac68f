//! Chat prompt rendering.

use crate::memory::ConversationTurn;
use anyhow::Result;

pub const HISTORY_PLACEHOLDER: &str = "{history}";
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Default framing for general chat turns.
pub const DEFAULT_TEMPLATE: &str = "\
你是一個健身專家聊天機器人，能根據用戶的目標生成詳細的健身計畫，並回答健康相關問題。
以下是你需要提供的功能：
1. 根據 BMI 提供建議。
2. 根據健身目標（如增肌、減脂、耐力提升）生成個性化健身計畫。
3. 提供飲食建議或動作指導。

用戶的對話內容如下：
{history}

用戶剛剛的輸入是：
{input}

根據以上內容，請回答用戶的問題或提供建議。
";

/// A chat template with `{history}` and `{input}` slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for placeholder in [HISTORY_PLACEHOLDER, INPUT_PLACEHOLDER] {
            if !template.contains(placeholder) {
                anyhow::bail!("prompt template must contain {placeholder}");
            }
        }
        Ok(Self { template })
    }

    /// Render the template. History turns become `User: ...` / `Assistant: ...`
    /// lines in insertion order; nothing is truncated.
    ///
    /// The template is scanned once and each slot is filled where it stands, so
    /// placeholder text inside the history or the input is copied verbatim.
    pub fn format(&self, history: &[ConversationTurn], input: &str) -> String {
        let history = render_history(history);
        let mut out = String::with_capacity(self.template.len() + history.len() + input.len());
        let mut rest = self.template.as_str();

        while let Some(open) = rest.find('{') {
            let (text, slot) = rest.split_at(open);
            out.push_str(text);
            if let Some(after) = slot.strip_prefix(HISTORY_PLACEHOLDER) {
                out.push_str(&history);
                rest = after;
            } else if let Some(after) = slot.strip_prefix(INPUT_PLACEHOLDER) {
                out.push_str(input);
                rest = after;
            } else {
                out.push('{');
                rest = &slot[1..];
            }
        }
        out.push_str(rest);
        out
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

pub fn render_history(history: &[ConversationTurn]) -> String {
    history
        .iter()
        .map(|turn| format!("{}: {}", turn.role().speaker(), turn.text()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One-shot prompt asking the model for a plan body.
pub fn plan_prompt(goal: &str, level: &str, hours_per_week: f64) -> String {
    format!(
        "你是一個健身教練，幫助用戶達成健身目標。用戶的目標是：{goal}，健身程度：{level}，\
         每週可訓練 {hours_per_week} 小時。請生成一個詳細的健身計畫。"
    )
}

/// One-shot prompt asking the model for topic advice.
pub fn advice_prompt(topic: &str) -> String {
    format!("你是一個健身專家。請提供有關 {topic} 的專業建議。")
}
