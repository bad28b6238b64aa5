//! 题型判定
//!
//! 评分时和汇总时都调用这里的同一个纯函数，保证两边的分桶一致。
//! 唯一的差别是汇总时额外启用两条补判规则：
//! "求值/求解/求出"补判计算题，选项标记补判选择题。
//! 评分阶段只走声明题型 → 指令语 → 关键词 → 答案长度。

use std::sync::LazyLock;

use phf::phf_map;
use regex::Regex;

use crate::models::QuestionTypeBucket;
use crate::utils::text::normalized_len;

/// 标准答案超过该字符数视为主观题
pub const SUBJECTIVE_ANSWER_LEN: usize = 80;

/// 判定发生在哪个阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyPass {
    /// 评分阶段
    Grading,
    /// 汇总阶段，额外启用计算题和选项标记规则
    Report,
}

/// 声明题型的精确匹配
static DECLARED_EXACT: phf::Map<&'static str, QuestionTypeBucket> = phf_map! {
    "填空" => QuestionTypeBucket::FillBlank,
    "填空题" => QuestionTypeBucket::FillBlank,
    "选择" => QuestionTypeBucket::Choice,
    "选择题" => QuestionTypeBucket::Choice,
    "单选" => QuestionTypeBucket::Choice,
    "单选题" => QuestionTypeBucket::Choice,
    "多选" => QuestionTypeBucket::Choice,
    "多选题" => QuestionTypeBucket::Choice,
    "判断" => QuestionTypeBucket::Judge,
    "判断题" => QuestionTypeBucket::Judge,
    "计算" => QuestionTypeBucket::Calculation,
    "计算题" => QuestionTypeBucket::Calculation,
    "简答" => QuestionTypeBucket::Subjective,
    "简答题" => QuestionTypeBucket::Subjective,
    "简述" => QuestionTypeBucket::Subjective,
    "说明" => QuestionTypeBucket::Subjective,
    "解释" => QuestionTypeBucket::Subjective,
    "证明题" => QuestionTypeBucket::Subjective,
    "论述题" => QuestionTypeBucket::Subjective,
    "综合题" => QuestionTypeBucket::Subjective,
};

/// 声明题型的包含匹配，按顺序取第一个
const DECLARED_CONTAINS: &[(&str, QuestionTypeBucket)] = &[
    ("填空", QuestionTypeBucket::FillBlank),
    ("选择", QuestionTypeBucket::Choice),
    ("单选", QuestionTypeBucket::Choice),
    ("多选", QuestionTypeBucket::Choice),
    ("判断", QuestionTypeBucket::Judge),
    ("计算", QuestionTypeBucket::Calculation),
    ("简答", QuestionTypeBucket::Subjective),
    ("简述", QuestionTypeBucket::Subjective),
    ("说明", QuestionTypeBucket::Subjective),
    ("解释", QuestionTypeBucket::Subjective),
    ("证明", QuestionTypeBucket::Subjective),
    ("论述", QuestionTypeBucket::Subjective),
    ("综合", QuestionTypeBucket::Subjective),
];

/// 题干中的固定指令语
const TRIGGER_PHRASES: &[(&str, QuestionTypeBucket)] = &[
    ("请在横线上填写正确答案", QuestionTypeBucket::FillBlank),
    ("请判断下列说法是否正确", QuestionTypeBucket::Judge),
    ("请从下列选项中选出一个正确答案", QuestionTypeBucket::Choice),
    ("请从下列选项中选出所有正确答案", QuestionTypeBucket::Choice),
    ("请简要回答下列问题", QuestionTypeBucket::Subjective),
    ("请结合材料进行综合分析", QuestionTypeBucket::Subjective),
    ("请写出完整的证明过程", QuestionTypeBucket::Subjective),
    ("请写出计算过程", QuestionTypeBucket::Calculation),
];

/// 宽松关键词，按顺序检查
const KEYWORD_SETS: &[(&[&str], QuestionTypeBucket)] = &[
    (&["判断", "对错", "对或错", "对/错", "是否正确"], QuestionTypeBucket::Judge),
    (&["填空", "空缺", "填写", "补全"], QuestionTypeBucket::FillBlank),
    (&["选择", "选出", "单选", "多选", "从以下"], QuestionTypeBucket::Choice),
    (&["计算"], QuestionTypeBucket::Calculation),
    (&["简答", "简述", "说明", "解释", "证明", "论述"], QuestionTypeBucket::Subjective),
];

/// 汇总阶段补判计算题："，求值" "。求解" "求出" "，求 x 的值" 等；"求证"不算
static CALCULATION_TAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(^|[，。；,.\s])求(值|解|出|[^证，。；]*?的(值|长|长度|周长|面积|体积|度数|大小|取值范围))",
    )
    .expect("valid regex")
});

/// 选项标记，如 "(A、" "（B." "(C)"
static OPTION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[（(]\s*[A-D][、.)）]").expect("valid regex"));

/// 评分阶段的题型判定
pub fn classify(declared: Option<&str>, question: &str, gold_answer: &str) -> QuestionTypeBucket {
    classify_with(ClassifyPass::Grading, declared, question, gold_answer)
}

/// 汇总阶段的题型判定，不信任已写出的题型字段
pub fn classify_for_report(question: &str, gold_answer: &str) -> QuestionTypeBucket {
    classify_with(ClassifyPass::Report, None, question, gold_answer)
}

/// 按优先级依次判定，命中即返回
pub fn classify_with(
    pass: ClassifyPass,
    declared: Option<&str>,
    question: &str,
    gold_answer: &str,
) -> QuestionTypeBucket {
    if let Some(bucket) = declared.and_then(from_declared) {
        return bucket;
    }

    let q = question.replace(['\r', '\n'], " ");

    if let Some(&(_, bucket)) = TRIGGER_PHRASES.iter().find(|(phrase, _)| q.contains(phrase)) {
        return bucket;
    }

    if let Some(&(_, bucket)) = KEYWORD_SETS
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| q.contains(k)))
    {
        return bucket;
    }

    if pass == ClassifyPass::Report {
        if CALCULATION_TAIL.is_match(&q) {
            return QuestionTypeBucket::Calculation;
        }
        if OPTION_MARKER.is_match(&q) {
            return QuestionTypeBucket::Choice;
        }
    }

    if normalized_len(gold_answer) > SUBJECTIVE_ANSWER_LEN {
        return QuestionTypeBucket::Subjective;
    }

    QuestionTypeBucket::Unknown
}

/// 声明题型映射；无法识别的声明返回 None，交给后续规则
fn from_declared(declared: &str) -> Option<QuestionTypeBucket> {
    let declared = declared.trim();
    if declared.is_empty() {
        return None;
    }
    DECLARED_EXACT.get(declared).copied().or_else(|| {
        DECLARED_CONTAINS
            .iter()
            .find(|(label, _)| declared.contains(label))
            .map(|&(_, bucket)| bucket)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use QuestionTypeBucket::*;

    #[test]
    fn test_declared_type_wins() {
        assert_eq!(classify(Some("填空"), "请选择正确答案", ""), FillBlank);
        assert_eq!(classify(Some("单选题"), "", ""), Choice);
        assert_eq!(classify(Some("判断"), "", ""), Judge);
        assert_eq!(classify(Some("简述"), "判断对错", ""), Subjective);
        assert_eq!(classify(Some("物理计算题（10分）"), "", ""), Calculation);
    }

    #[test]
    fn test_unrecognized_declared_type_falls_through() {
        assert_eq!(classify(Some("未知"), "下列说法对错？", ""), Judge);
        assert_eq!(classify(Some("  "), "", ""), Unknown);
    }

    #[test]
    fn test_trigger_phrases_before_keywords() {
        // 指令语含"选出"，但先命中指令语表
        assert_eq!(
            classify(None, "请从下列选项中选出一个正确答案：地球是（ ）", ""),
            Choice
        );
        assert_eq!(classify(None, "请写出计算过程：1+1=?", ""), Calculation);
        assert_eq!(classify(None, "请写出完整的证明过程。", ""), Subjective);
        // 关键词会先命中"判断"，指令语表把它归为填空
        assert_eq!(classify(None, "请在横线上填写正确答案，并判断", ""), FillBlank);
    }

    #[test]
    fn test_keyword_fallback() {
        assert_eq!(classify(None, "下列说法是否正确", ""), Judge);
        assert_eq!(classify(None, "补全句子", ""), FillBlank);
        assert_eq!(classify(None, "从以下城市中挑一个", ""), Choice);
        assert_eq!(classify(None, "计算 3×4", ""), Calculation);
        assert_eq!(classify(None, "解释原因", ""), Subjective);
    }

    /// 选项标记同样只在汇总阶段启用，评分阶段按答案长度判定
    #[test]
    fn test_option_marker_only_in_report_pass() {
        let q = "首都是 (A、北京 (B、上海";
        let long = "长".repeat(SUBJECTIVE_ANSWER_LEN + 20);
        assert_eq!(classify(None, q, ""), Unknown);
        assert_eq!(classify(None, q, &long), Subjective);
        assert_eq!(classify_for_report(q, ""), Choice);
        assert_eq!(classify_for_report(q, &long), Choice);
    }

    #[test]
    fn test_long_gold_answer_is_subjective() {
        let long = "长".repeat(SUBJECTIVE_ANSWER_LEN + 1);
        let exact = "长".repeat(SUBJECTIVE_ANSWER_LEN);
        assert_eq!(classify(None, "谈谈你的看法", &long), Subjective);
        assert_eq!(classify(None, "谈谈你的看法", &exact), Unknown);
    }

    #[test]
    fn test_default_unknown() {
        assert_eq!(classify(None, "", ""), Unknown);
    }

    #[test]
    fn test_newlines_do_not_split_keywords() {
        assert_eq!(classify(None, "对\r\n或错", ""), Unknown);
        assert_eq!(classify(None, "第一问\n判断", ""), Judge);
    }

    /// 计算题正则只在汇总阶段启用
    #[test]
    fn test_calculation_tail_only_in_report_pass() {
        let q = "已知 x+2=5，求解 x";
        assert_eq!(classify(None, q, ""), Unknown);
        assert_eq!(classify_for_report(q, ""), Calculation);
        assert_eq!(classify_for_report("求出三角形面积", ""), Calculation);
        assert_eq!(classify_for_report("已知三角形，求证两边相等", ""), Unknown);
    }

    #[test]
    fn test_calculation_tail_accepts_target_phrasing() {
        assert_eq!(classify_for_report("已知 x+1=2，求 x 的值", ""), Calculation);
        assert_eq!(classify_for_report("圆的半径为 2。求这个圆的面积", ""), Calculation);
        assert_eq!(classify_for_report("已知三角形，求证 AB 的长等于 CD", ""), Unknown);
        // 不跨句匹配
        assert_eq!(classify_for_report("求助。他的值班表", ""), Unknown);
        assert_eq!(classify(None, "已知 x+1=2，求 x 的值", ""), Unknown);
    }

    #[test]
    fn test_passes_agree_without_calculation_tail() {
        let questions = [
            "下列说法对错？",
            "填写空缺",
            "选择正确选项",
            "计算面积",
            "简述原因",
            "随便聊聊",
        ];
        for q in questions {
            assert_eq!(classify(None, q, ""), classify_for_report(q, ""), "{}", q);
        }
    }

    #[test]
    fn test_report_pass_ignores_declared_type() {
        assert_eq!(classify(Some("选择"), "随便聊聊", ""), Choice);
        assert_eq!(classify_for_report("随便聊聊", ""), Unknown);
    }
}
