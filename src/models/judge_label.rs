use serde::{Deserialize, Serialize};

/// 判分标签
///
/// 前五个按符合程度从高到低排列，后两个是没有分值的哨兵
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum JudgeLabel {
    FullMatch,
    MostlyMatch,
    PartialMatch,
    WeakMatch,
    NoMatch,
    /// 返回内容中没有任何合法标签
    InvalidResponse,
    /// 请求本身失败
    RequestFailed,
}

/// 满分
pub const FULL_SCORE: f64 = 1.0;

/// 五个标准分值，升序
pub const CANONICAL_SCORES: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

impl JudgeLabel {
    /// 匹配优先级顺序
    pub const RANKED: [JudgeLabel; 5] = [
        JudgeLabel::FullMatch,
        JudgeLabel::MostlyMatch,
        JudgeLabel::PartialMatch,
        JudgeLabel::WeakMatch,
        JudgeLabel::NoMatch,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            JudgeLabel::FullMatch => "完全符合",
            JudgeLabel::MostlyMatch => "基本符合",
            JudgeLabel::PartialMatch => "部分符合",
            JudgeLabel::WeakMatch => "不太符合",
            JudgeLabel::NoMatch => "完全不符",
            JudgeLabel::InvalidResponse => "无效评分",
            JudgeLabel::RequestFailed => "请求失败",
        }
    }

    /// 标准分值；哨兵标签没有分值
    pub fn score(self) -> Option<f64> {
        match self {
            JudgeLabel::FullMatch => Some(1.0),
            JudgeLabel::MostlyMatch => Some(0.75),
            JudgeLabel::PartialMatch => Some(0.5),
            JudgeLabel::WeakMatch => Some(0.25),
            JudgeLabel::NoMatch => Some(0.0),
            JudgeLabel::InvalidResponse | JudgeLabel::RequestFailed => None,
        }
    }

    pub fn from_label_str(s: &str) -> Option<Self> {
        JudgeLabel::RANKED
            .into_iter()
            .chain([JudgeLabel::InvalidResponse, JudgeLabel::RequestFailed])
            .find(|label| label.as_str() == s)
    }
}

/// 分值是否为满分（与标准常量精确比较）
pub fn is_full_score(score: Option<f64>) -> bool {
    score == Some(FULL_SCORE)
}

impl From<JudgeLabel> for &'static str {
    fn from(label: JudgeLabel) -> Self {
        label.as_str()
    }
}

impl TryFrom<String> for JudgeLabel {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        JudgeLabel::from_label_str(&value).ok_or_else(|| format!("未知的判分标签: {}", value))
    }
}

impl std::fmt::Display for JudgeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
