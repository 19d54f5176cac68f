//! Keyword intent classification.
//!
//! Intents are resolved by an ordered table of `(intent, keywords)` rules.
//! The first rule with a keyword contained in the message (case-insensitive)
//! wins; a message matching nothing is general chat. A rule may also carry
//! whole-line words that only match when they are the entire trimmed message.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Exit,
    Bmi,
    Plan,
    Advice,
    Chat,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Exit => "exit",
            Self::Bmi => "bmi",
            Self::Plan => "plan",
            Self::Advice => "advice",
            Self::Chat => "chat",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentRule {
    pub intent: Intent,
    /// Substring keywords, stored lowercased.
    keywords: Vec<String>,
    /// Whole-line words, stored lowercased.
    exact: Vec<String>,
}

fn lowercased(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_lowercase()).collect()
}

impl IntentRule {
    pub fn new(intent: Intent, keywords: &[&str]) -> Self {
        Self {
            intent,
            keywords: lowercased(keywords),
            exact: Vec::new(),
        }
    }

    /// Also match when the whole trimmed message is one of `words`.
    pub fn with_exact(mut self, words: &[&str]) -> Self {
        self.exact = lowercased(words);
        self
    }

    fn matches(&self, normalized: &str) -> bool {
        self.exact.iter().any(|w| normalized == w.as_str())
            || self.keywords.iter().any(|k| normalized.contains(k.as_str()))
    }
}

/// Priority-ordered dispatch table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntentTable {
    rules: Vec<IntentRule>,
}

impl IntentTable {
    pub fn new(rules: Vec<IntentRule>) -> Self {
        Self { rules }
    }

    pub fn classify(&self, message: &str) -> Intent {
        let normalized = message.trim().to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map_or(Intent::Chat, |rule| rule.intent)
    }
}

impl Default for IntentTable {
    fn default() -> Self {
        Self::new(vec![
            // English words are everyday substrings ("quite", "exits").
            IntentRule::new(Intent::Exit, &["退出"]).with_exact(&["exit", "quit"]),
            IntentRule::new(Intent::Bmi, &["bmi"]),
            IntentRule::new(Intent::Plan, &["健身計畫", "fitness plan"]),
            IntentRule::new(Intent::Advice, &["建議", "advice"]),
        ])
    }
}
