//! 单条记录评分流程 - 流程层
//!
//! 流程顺序：
//! 1. 查找标准答案，没有则不计分直接返回
//! 2. 规范化后精确匹配，命中即满分，不调用判分模型
//! 3. 否则交给判分模型，满分才算正确

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::models::{GoldLookup, GradeResult, GradedRecord, JudgeLabel, QARecord, QuestionTypeBucket};
use crate::services::classifier::classify;
use crate::services::judge::{Judge, JudgeRequest, JudgeVerdictMapper};
use crate::utils::logging::truncate_text;
use crate::utils::normalize;
use crate::workflow::record_ctx::RecordCtx;

/// 规范化后双方非空且完全相同
pub fn is_exact_match(gold: &str, pred: &str) -> bool {
    let gold = normalize(gold);
    let pred = normalize(pred);
    !gold.is_empty() && !pred.is_empty() && gold == pred
}

/// 按标准答案表补全 gold_answer 并判定题型
///
/// 标准答案表中的答案和题型优先于记录自带的字段
pub fn resolve_gold(record: &QARecord, gold_lookup: &GoldLookup) -> (QARecord, QuestionTypeBucket) {
    let gold = gold_lookup.get(&record.id);
    let gold_answer = gold
        .map(|g| g.answer.clone())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| record.gold_answer.clone());
    let declared = gold
        .and_then(|g| g.question_type.as_deref())
        .or(record.question_type.as_deref());

    let bucket = classify(declared, &record.question, &gold_answer);
    let resolved = QARecord {
        gold_answer,
        ..record.clone()
    };
    (resolved, bucket)
}

/// 评分引擎
///
/// - 只处理单条记录
/// - 不持有输出文件
/// - 判分失败只影响当前记录
pub struct GradingEngine {
    judge: Arc<dyn Judge>,
    mapper: JudgeVerdictMapper,
    verbose_logging: bool,
}

impl GradingEngine {
    pub fn new(judge: Arc<dyn Judge>) -> Self {
        Self {
            judge,
            mapper: JudgeVerdictMapper::new(),
            verbose_logging: false,
        }
    }

    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }

    /// 评分一条记录
    pub async fn grade(&self, record: &QARecord, gold_lookup: &GoldLookup, ctx: &RecordCtx) -> GradedRecord {
        let (resolved, bucket) = resolve_gold(record, gold_lookup);

        if self.verbose_logging {
            self.log_question(ctx, &resolved);
        }

        if resolved.gold_answer.is_empty() {
            debug!("{} 没有标准答案，跳过统计", ctx);
            return GradedRecord {
                result: GradeResult::ungraded(&record.id, bucket),
                record: resolved,
            };
        }

        if is_exact_match(&resolved.gold_answer, &resolved.pred_answer) {
            debug!("{} 精确匹配", ctx);
            return GradedRecord {
                result: GradeResult::from_label(&record.id, bucket, JudgeLabel::FullMatch),
                record: resolved,
            };
        }

        let request = JudgeRequest {
            bucket,
            question: resolved.question.clone(),
            gold_answer: resolved.gold_answer.clone(),
            pred_answer: resolved.pred_answer.clone(),
        };
        let verdict = self.mapper.resolve(self.judge.as_ref(), &request).await;
        match verdict.label {
            JudgeLabel::RequestFailed | JudgeLabel::InvalidResponse => {
                warn!("{} ⚠️ 判分未得到分值: {}", ctx, verdict.label)
            }
            label => debug!("{} 判分结果: {}", ctx, label),
        }

        GradedRecord {
            result: GradeResult::from_label(&record.id, bucket, verdict.label),
            record: resolved,
        }
    }

    fn log_question(&self, ctx: &RecordCtx, record: &QARecord) {
        info!("{} 题干: {}", ctx, truncate_text(&record.question, 80));
    }
}
