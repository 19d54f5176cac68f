//! Static advice library: canned training plans, advice blocks and the
//! default chat reply used whenever the model has nothing to say.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reply used by the chat flow when the model returns nothing usable.
pub const FALLBACK_REPLY: &str =
    "抱歉，我無法理解你的請求，請嘗試輸入 '計算 BMI' 或 '生成健身計畫' 等關鍵字。";

pub const UNSUPPORTED_GOAL: &str =
    "目前僅支持增肌、減脂和耐力提升的建議計畫，請輸入其中之一的目標！";

pub const UNCLEAR_TOPIC: &str = "目前僅支持飲食和動作相關的建議，請指定更清晰的主題！";

const BULK_PLAN: &str = "增肌計畫建議：\n\
- 每週進行 4-5 次力量訓練，專注於多關節動作如深蹲、硬拉和臥推。\n\
- 每天攝取的蛋白質量為每公斤體重 1.6-2.2 克，碳水化合物和健康脂肪比例保持平衡。\n\
- 確保每晚睡眠 7-9 小時，促進肌肉修復與成長。";

const CUT_PLAN: &str = "減脂計畫建議：\n\
- 每週進行 3-5 次有氧運動，如跑步或高強度間歇訓練（HIIT）。\n\
- 每天攝取的熱量控制在總消耗量以下，保持高蛋白飲食以保留肌肉質量。\n\
- 結合每週 2-3 次力量訓練，提升基礎代謝率。";

const ENDURANCE_PLAN: &str = "耐力提升計畫建議：\n\
- 每週進行 4-6 次心肺耐力訓練，如長跑、游泳或騎行。\n\
- 間歇加入短跑或高強度運動，提高心肺能力和速度。\n\
- 保持充足的碳水化合物攝取，確保訓練過程中有足夠能量。\n\
- 每週至少進行一次休息或輕度活動，防止過度訓練。";

const DIET_ADVICE: &str = "一般飲食建議：\n\
- 保持飲食均衡，包含足量的蛋白質、碳水化合物和健康脂肪。\n\
- 多攝取蔬菜和水果，補充必要的維生素與礦物質。\n\
- 控制加工食品和含糖飲料的攝取，選擇天然食材。\n\
- 根據目標調整熱量攝取（減脂需熱量赤字，增肌需熱量盈餘）。";

const MOVEMENT_ADVICE: &str = "一般動作指導建議：\n\
- 力量訓練時確保動作正確，避免不必要的受傷風險。\n\
- 使用適當的重量，確保能完成每組 8-12 次。\n\
- 有氧運動如跑步時，保持穩定的呼吸和適當的心率區間。\n\
- 訓練後進行充分的拉伸，促進肌肉放鬆與恢復。";

// Checked in this order; diet wins when a topic mentions both.
const DIET_KEYWORDS: &[&str] = &["飲食", "diet", "營養", "nutrition"];
const MOVEMENT_KEYWORDS: &[&str] = &["動作", "運動", "exercise", "movement", "workout"];

/// Supported training goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Bulk,
    Cut,
    Endurance,
}

impl Goal {
    /// Exact match after trimming and lowercasing. Accepts the Chinese goal
    /// names and their English equivalents.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "增肌" | "bulk" => Some(Self::Bulk),
            "減脂" | "cut" => Some(Self::Cut),
            "耐力提升" | "endurance" => Some(Self::Endurance),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Bulk => "增肌",
            Self::Cut => "減脂",
            Self::Endurance => "耐力提升",
        }
    }

    pub fn static_plan(self) -> &'static str {
        match self {
            Self::Bulk => BULK_PLAN,
            Self::Cut => CUT_PLAN,
            Self::Endurance => ENDURANCE_PLAN,
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceTopic {
    Diet,
    Movement,
    Unrecognized,
}

impl AdviceTopic {
    pub fn classify(topic: &str) -> Self {
        let normalized = topic.to_lowercase();
        if DIET_KEYWORDS.iter().any(|k| normalized.contains(k)) {
            Self::Diet
        } else if MOVEMENT_KEYWORDS.iter().any(|k| normalized.contains(k)) {
            Self::Movement
        } else {
            Self::Unrecognized
        }
    }

    pub fn static_advice(self) -> &'static str {
        match self {
            Self::Diet => DIET_ADVICE,
            Self::Movement => MOVEMENT_ADVICE,
            Self::Unrecognized => UNCLEAR_TOPIC,
        }
    }
}

/// Canned plan for a goal, or [`UNSUPPORTED_GOAL`] when the goal is unknown.
pub fn lookup_plan(goal: &str) -> &'static str {
    Goal::parse(goal).map_or(UNSUPPORTED_GOAL, Goal::static_plan)
}

/// Canned advice for a free-text topic, or [`UNCLEAR_TOPIC`].
pub fn lookup_advice(topic: &str) -> &'static str {
    AdviceTopic::classify(topic).static_advice()
}

pub fn default_reply() -> &'static str {
    FALLBACK_REPLY
}
