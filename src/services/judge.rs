//! 判分能力
//!
//! `Judge` 只负责把请求发出去并拿回原始文本；
//! `JudgeVerdictMapper` 负责构建提示词，并把原始文本映射成固定标签和分值。

use async_trait::async_trait;
use tracing::debug;

use crate::error::JudgeFailure;
use crate::models::{JudgeLabel, QuestionTypeBucket};

/// 系统消息：限定只能回复五种标签
pub const SYSTEM_MESSAGE: &str =
    "你是一个严格的判题老师，只能返回：完全符合、基本符合、部分符合、不太符合、完全不符。";

/// 一次判分请求
#[derive(Debug, Clone, PartialEq)]
pub struct JudgeRequest {
    pub bucket: QuestionTypeBucket,
    pub question: String,
    pub gold_answer: String,
    pub pred_answer: String,
}

/// 外部判分服务
#[async_trait]
pub trait Judge: Send + Sync {
    /// 返回判分模型的原始回复
    async fn adjudicate(&self, request: &JudgeRequest) -> Result<String, JudgeFailure>;
}

/// 判分结论
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub is_correct: bool,
    pub score: Option<f64>,
    pub label: JudgeLabel,
}

impl Verdict {
    pub fn from_label(label: JudgeLabel) -> Self {
        Self {
            is_correct: label == JudgeLabel::FullMatch,
            score: label.score(),
            label,
        }
    }
}

/// 判分结果映射
#[derive(Debug, Clone, Copy, Default)]
pub struct JudgeVerdictMapper;

impl JudgeVerdictMapper {
    pub fn new() -> Self {
        Self
    }

    /// 调用判分服务并映射结果；失败只降级当前记录
    pub async fn resolve(&self, judge: &dyn Judge, request: &JudgeRequest) -> Verdict {
        let outcome = judge.adjudicate(request).await;
        if let Err(failure) = &outcome {
            debug!("判分失败: {}", failure);
        }
        self.map_outcome(outcome)
    }

    /// 把调用结果映射成结论
    pub fn map_outcome(&self, outcome: Result<String, JudgeFailure>) -> Verdict {
        match outcome {
            Ok(response) => self.map_response(&response),
            Err(JudgeFailure::UnrecognizedResponse(_)) => {
                Verdict::from_label(JudgeLabel::InvalidResponse)
            }
            Err(JudgeFailure::Timeout { .. } | JudgeFailure::Transport(_)) => {
                Verdict::from_label(JudgeLabel::RequestFailed)
            }
        }
    }

    /// 按优先级做包含匹配，与标签在回复中的位置无关
    pub fn map_response(&self, response: &str) -> Verdict {
        JudgeLabel::RANKED
            .into_iter()
            .find(|label| response.contains(label.as_str()))
            .map(Verdict::from_label)
            .unwrap_or_else(|| Verdict::from_label(JudgeLabel::InvalidResponse))
    }

    /// 构建用户消息
    pub fn build_prompt(&self, request: &JudgeRequest) -> String {
        format!(
            r#"你是一位严格的阅卷教师，请根据题型判断考生答案与标准答案的符合程度，并仅回复以下五种标签之一：
“完全符合”“基本符合”“部分符合”“不太符合”“完全不符”。

题型：{}
题干：{}
标准答案：{}
考生答案：{}


对于客观题如单选、多选、判断题，请判断考生答案是否正确，并严格依据标准答案给出判断。
对于填空题，请比对考生答案和标准答案大体含义是否一致。
对于计算题，请根据最终答案和解答过程综合评判。
对于主观题，请根据常识和答案综合判断，评分可以不完全依据上述标准，根据实际情况注意客观性即可。
请根据考生回答的准确性、覆盖点、逻辑表达等进行综合判断，只回复一个标签，不要附加解释。"#,
            request.bucket.label(),
            request.question.trim(),
            request.gold_answer.trim(),
            request.pred_answer.trim()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> JudgeVerdictMapper {
        JudgeVerdictMapper::new()
    }

    #[test]
    fn test_each_label_maps_to_canonical_score() {
        let expected = [
            ("完全符合", 1.0),
            ("基本符合", 0.75),
            ("部分符合", 0.5),
            ("不太符合", 0.25),
            ("完全不符", 0.0),
        ];
        for (text, score) in expected {
            let verdict = mapper().map_response(text);
            assert_eq!(verdict.score, Some(score), "{}", text);
            assert_eq!(verdict.label.as_str(), text);
            assert_eq!(verdict.is_correct, score == 1.0);
        }
    }

    #[test]
    fn test_label_found_inside_longer_text() {
        let verdict = mapper().map_response("判定：“基本符合”。");
        assert_eq!(verdict.label, JudgeLabel::MostlyMatch);
    }

    #[test]
    fn test_priority_not_position_breaks_ties() {
        let verdict = mapper().map_response("不太符合，也许部分符合");
        assert_eq!(verdict.label, JudgeLabel::PartialMatch);
        assert_eq!(verdict.score, Some(0.5));

        let verdict = mapper().map_response("完全不符 / 部分符合");
        assert_eq!(verdict.label, JudgeLabel::PartialMatch);
    }

    #[test]
    fn test_unrecognized_response() {
        let verdict = mapper().map_response("答案正确");
        assert_eq!(verdict.label, JudgeLabel::InvalidResponse);
        assert_eq!(verdict.score, None);
        assert!(!verdict.is_correct);
    }

    #[test]
    fn test_failures_degrade_to_sentinels() {
        let timeout = mapper().map_outcome(Err(JudgeFailure::Timeout { timeout_secs: 30 }));
        assert_eq!(timeout.label, JudgeLabel::RequestFailed);
        assert_eq!(timeout.score, None);

        let transport = mapper().map_outcome(Err(JudgeFailure::Transport("502".into())));
        assert_eq!(transport.label, JudgeLabel::RequestFailed);

        let empty = mapper().map_outcome(Err(JudgeFailure::UnrecognizedResponse(String::new())));
        assert_eq!(empty.label, JudgeLabel::InvalidResponse);
        assert!(!empty.is_correct);
    }

    #[test]
    fn test_prompt_embeds_request() {
        let prompt = mapper().build_prompt(&JudgeRequest {
            bucket: QuestionTypeBucket::Subjective,
            question: " 简述光合作用 ".into(),
            gold_answer: "植物利用光能".into(),
            pred_answer: "吸收阳光".into(),
        });
        assert!(prompt.contains("题型：简答"));
        assert!(prompt.contains("题干：简述光合作用\n"));
        assert!(prompt.contains("标准答案：植物利用光能"));
        assert!(prompt.contains("考生答案：吸收阳光"));
    }
}
