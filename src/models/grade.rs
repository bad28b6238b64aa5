//! 评分结果与持久化格式

use serde::Serialize;
use serde_json::Value;

use crate::models::judge_label::{is_full_score, JudgeLabel};
use crate::models::question_type::{QuestionPool, QuestionTypeBucket};
use crate::models::record::QARecord;
use crate::utils::normalize;

/// 单条记录的评分结果
#[derive(Debug, Clone, PartialEq)]
pub struct GradeResult {
    pub id: String,
    pub bucket: QuestionTypeBucket,
    /// 没有标准答案时为 None
    pub is_correct: Option<bool>,
    /// None 表示没有拿到分值，不等于 0 分
    pub score: Option<f64>,
    pub label: Option<JudgeLabel>,
}

impl GradeResult {
    /// 没有标准答案：不计入统计，但仍写出
    pub fn ungraded(id: impl Into<String>, bucket: QuestionTypeBucket) -> Self {
        Self {
            id: id.into(),
            bucket,
            is_correct: None,
            score: None,
            label: None,
        }
    }

    /// 由判分标签得到结果，满分才算正确
    pub fn from_label(id: impl Into<String>, bucket: QuestionTypeBucket, label: JudgeLabel) -> Self {
        let score = label.score();
        Self {
            id: id.into(),
            bucket,
            is_correct: Some(is_full_score(score)),
            score,
            label: Some(label),
        }
    }

    pub fn is_graded(&self) -> bool {
        self.is_correct.is_some()
    }

    /// 需要写入错误列表
    pub fn is_error(&self) -> bool {
        self.is_correct == Some(false)
    }
}

/// 评分后的完整记录（文本 + 结果）
#[derive(Debug, Clone)]
pub struct GradedRecord {
    /// gold_answer 已按标准答案表补全
    pub record: QARecord,
    pub result: GradeResult,
}

impl GradedRecord {
    pub fn to_row(&self) -> ResultRow {
        ResultRow::from_graded(&self.record, &self.result)
    }

    pub fn to_error_entry(&self) -> Option<ErrorEntry> {
        self.result.is_error().then(|| ErrorEntry {
            id: self.record.id.clone(),
            question: normalize(&self.record.question),
            gold_answer: normalize(&self.record.gold_answer),
            pred_answer: normalize(&self.record.pred_answer),
            question_type: self.result.bucket.label().to_string(),
            subjective_label: self.result.label,
        })
    }
}

/// 客观题格式（也用于没有标准答案的记录）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectiveRow {
    #[serde(rename = "ID")]
    pub id: String,
    pub question_type: String,
    pub question: String,
    pub gold_answer: String,
    pub pred_answer: String,
    pub is_correct: Option<bool>,
    pub subjective_score: Option<f64>,
    pub subjective_label: Option<JudgeLabel>,
}

/// 主观题格式，没有 is_correct 字段
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectiveRow {
    #[serde(rename = "ID")]
    pub id: String,
    pub score_label: Option<JudgeLabel>,
    pub score_value: Option<f64>,
    pub question: String,
    pub gold_answer: String,
    pub pred_answer: String,
}

/// 结果文件中的一行
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResultRow {
    Objective(ObjectiveRow),
    Subjective(SubjectiveRow),
}

impl ResultRow {
    pub fn from_graded(record: &QARecord, result: &GradeResult) -> Self {
        let question = normalize(&record.question);
        let gold_answer = normalize(&record.gold_answer);
        let pred_answer = normalize(&record.pred_answer);

        if result.is_graded() && !result.bucket.is_objective_format() {
            return ResultRow::Subjective(SubjectiveRow {
                id: record.id.clone(),
                score_label: result.label,
                score_value: result.score,
                question,
                gold_answer,
                pred_answer,
            });
        }

        ResultRow::Objective(ObjectiveRow {
            id: record.id.clone(),
            question_type: result.bucket.label().to_string(),
            question,
            gold_answer,
            pred_answer,
            is_correct: result.is_correct,
            subjective_score: result.score,
            subjective_label: result.label,
        })
    }
}

/// 错误文件中的一行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorEntry {
    #[serde(rename = "ID")]
    pub id: String,
    pub question: String,
    pub gold_answer: String,
    pub pred_answer: String,
    pub question_type: String,
    pub subjective_label: Option<JudgeLabel>,
}

/// 汇总时读回的一行，兼容两种写出格式
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PersistedRow {
    pub id: String,
    pub question: String,
    pub gold_answer: String,
    /// 是否存在 is_correct 键，以及它的值
    pub is_correct: Option<Option<bool>>,
    pub score: Option<f64>,
    pub label: Option<String>,
    /// 主观题格式（score_label / score_value）
    pub subjective_format: bool,
}

impl PersistedRow {
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let text = |key: &str| {
            obj.get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_default()
        };
        let id = match obj.get("ID") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let subjective_format = obj.contains_key("score_value") || obj.contains_key("score_label");
        let score = obj
            .get("score_value")
            .or_else(|| obj.get("subjective_score"))
            .and_then(Value::as_f64);
        let label = obj
            .get("score_label")
            .or_else(|| obj.get("subjective_label"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Some(Self {
            id,
            question: text("question"),
            gold_answer: text("gold_answer"),
            is_correct: obj.get("is_correct").map(Value::as_bool),
            score,
            label,
            subjective_format,
        })
    }

    /// 按汇总阶段的题型取实际参与正确率统计的正误
    ///
    /// - 有 is_correct 键时以其为准（null 不参与统计）
    /// - 主观题格式只在被补判为计算题时按满分判定
    /// - 其余主观题格式的行不参与正确率统计，只进入得分分布
    pub fn effective_correct(&self, bucket: QuestionTypeBucket) -> Option<bool> {
        match self.is_correct {
            Some(value) => value,
            None if self.subjective_format && bucket == QuestionTypeBucket::Calculation => {
                Some(is_full_score(self.score))
            }
            None => None,
        }
    }

    /// 是否计入主观题得分分布
    ///
    /// 计算题不计入；主观题格式的行都计入；客观题格式只在归为主观题池且有标签时计入
    pub fn feeds_subjective_stats(&self, bucket: QuestionTypeBucket) -> bool {
        if bucket == QuestionTypeBucket::Calculation {
            return false;
        }
        self.subjective_format || (bucket.pool() == QuestionPool::Subjective && self.label.is_some())
    }
}
