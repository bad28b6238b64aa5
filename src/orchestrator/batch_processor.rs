//! 批量评估处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是评估流程的入口，负责批量记录的评分和结果写出。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：创建判分服务、评分引擎
//! 2. **批量加载**：读取并解析全部记录（`Vec<QARecord>`）
//! 3. **并发控制**：使用 Semaphore 限制同时进行的判分请求
//! 4. **顺序写出**：按输入顺序逐条追加写出结果和错误
//! 5. **全局统计**：汇总正确率和主观题平均分

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, warn};

use crate::config::Config;
use crate::models::{load_records, GoldLookup, GradeResult, GradedRecord, JudgeLabel, QARecord};
use crate::services::{Judge, LlmJudge, ResultWriter};
use crate::utils::logging::{log_progress, log_records_loaded, log_startup, print_final_stats};
use crate::workflow::{resolve_gold, GradingEngine, RecordCtx};

/// 应用主结构
pub struct App {
    config: Config,
    engine: Arc<GradingEngine>,
}

/// 一次评估的汇总
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationSummary {
    /// 记录总数
    pub total: usize,
    /// 有标准答案、参与统计的数量
    pub graded: usize,
    pub correct: usize,
    /// correct / graded，没有参与统计的记录时为 0
    pub accuracy: f64,
    /// 所有拿到分值的记录的平均分
    pub subjective_avg: Option<f64>,
    pub error_ids: Vec<String>,
    pub results_path: PathBuf,
    pub errors_path: PathBuf,
}

impl App {
    /// 使用 LLM 判分服务初始化应用
    pub fn initialize(config: Config) -> Self {
        let judge: Arc<dyn Judge> = Arc::new(LlmJudge::new(&config));
        Self::with_judge(config, judge)
    }

    /// 使用指定的判分服务初始化应用
    pub fn with_judge(config: Config, judge: Arc<dyn Judge>) -> Self {
        let engine = GradingEngine::new(judge).with_verbose_logging(config.verbose_logging);
        Self {
            config,
            engine: Arc::new(engine),
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<EvaluationSummary> {
        log_startup(&self.config.input_path, self.config.judge_concurrency());

        // 加载所有记录
        let batch = load_records(&self.config.input_path)
            .await
            .with_context(|| format!("无法加载输入文件: {}", self.config.input_path.display()))?;
        log_records_loaded(batch.records.len(), batch.gold_lookup.len(), batch.skipped);

        if batch.records.is_empty() {
            warn!("⚠️ 没有找到待评估的记录");
        }

        let mut writer = ResultWriter::create(self.config.results_path(), self.config.errors_path())
            .context("无法创建输出文件")?;

        let summary = self
            .grade_all(batch.records, Arc::new(batch.gold_lookup), &mut writer)
            .await?;

        print_final_stats(
            summary.correct,
            summary.graded,
            summary.error_ids.len(),
            &summary.results_path,
            &summary.errors_path,
        );

        Ok(summary)
    }

    /// 并发评分，按输入顺序写出
    pub async fn grade_all(
        &self,
        records: Vec<QARecord>,
        gold_lookup: Arc<GoldLookup>,
        writer: &mut ResultWriter,
    ) -> Result<EvaluationSummary> {
        let semaphore = Arc::new(Semaphore::new(self.config.judge_concurrency()));
        let total = records.len();

        let mut handles = Vec::with_capacity(total);
        let mut fallbacks = Vec::with_capacity(total);
        for (idx, record) in records.into_iter().enumerate() {
            let ctx = RecordCtx::new(idx + 1, record.id.clone());
            fallbacks.push(record.clone());
            let engine = self.engine.clone();
            let lookup = gold_lookup.clone();
            let semaphore = semaphore.clone();

            handles.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                engine.grade(&record, &lookup, &ctx).await
            }));
        }

        let mut stats = StatsAccumulator::default();
        drain_in_order(handles, |idx, joined| {
            let graded = match joined {
                Ok(graded) => graded,
                Err(e) => {
                    error!("[记录 #{}] 评分任务执行失败: {}", idx + 1, e);
                    failed_grade(&fallbacks[idx], &gold_lookup)
                }
            };

            writer.append_result(&graded.to_row())?;
            if let Some(entry) = graded.to_error_entry() {
                writer.append_error(&entry)?;
            }
            stats.add(&graded);
            log_progress(idx + 1, total);
            Ok(())
        })
        .await?;
        writer.flush()?;

        Ok(stats.finish(total, writer))
    }
}

/// 按提交顺序等待任务并逐个处理
///
/// 处理出错时取消剩余任务后返回错误，不再发出新的判分请求
async fn drain_in_order<T, F>(handles: Vec<JoinHandle<T>>, mut on_each: F) -> Result<()>
where
    F: FnMut(usize, Result<T, JoinError>) -> Result<()>,
{
    let mut pending = handles.into_iter().enumerate();
    while let Some((idx, handle)) = pending.next() {
        if let Err(e) = on_each(idx, handle.await) {
            let remaining: Vec<_> = pending.map(|(_, h)| h).collect();
            warn!("写出失败，取消剩余 {} 个评分任务", remaining.len());
            for handle in remaining {
                handle.abort();
            }
            return Err(e);
        }
    }
    Ok(())
}

/// 评分任务异常退出时按请求失败处理，保证每条记录都写出一次
fn failed_grade(record: &QARecord, gold_lookup: &GoldLookup) -> GradedRecord {
    let (record, bucket) = resolve_gold(record, gold_lookup);
    let result = if record.gold_answer.is_empty() {
        GradeResult::ungraded(&record.id, bucket)
    } else {
        GradeResult::from_label(&record.id, bucket, JudgeLabel::RequestFailed)
    };
    GradedRecord { record, result }
}

#[derive(Debug, Default)]
struct StatsAccumulator {
    graded: usize,
    correct: usize,
    scores: Vec<f64>,
    error_ids: Vec<String>,
}

impl StatsAccumulator {
    fn add(&mut self, graded: &GradedRecord) {
        let GradeResult {
            is_correct, score, ..
        } = &graded.result;
        let Some(is_correct) = is_correct else {
            return;
        };
        self.graded += 1;
        if let Some(score) = score {
            self.scores.push(*score);
        }
        if *is_correct {
            self.correct += 1;
        } else {
            self.error_ids.push(graded.record.id.clone());
        }
    }

    fn finish(self, total: usize, writer: &ResultWriter) -> EvaluationSummary {
        let accuracy = if self.graded == 0 {
            0.0
        } else {
            self.correct as f64 / self.graded as f64
        };
        let subjective_avg =
            (!self.scores.is_empty()).then(|| self.scores.iter().sum::<f64>() / self.scores.len() as f64);
        EvaluationSummary {
            total,
            graded: self.graded,
            correct: self.correct,
            accuracy,
            subjective_avg,
            error_ids: self.error_ids,
            results_path: writer.results_path().to_path_buf(),
            errors_path: writer.errors_path().to_path_buf(),
        }
    }
}

impl std::fmt::Display for EvaluationSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "评估完成!")?;
        writeln!(f, "{}", "=".repeat(50))?;
        if let Some(avg) = self.subjective_avg {
            writeln!(f, "主观题平均得分: {:.2}（满分为 1）", avg)?;
        }
        writeln!(
            f,
            "准确率(ACC): {:.4} ({:.2}%)",
            self.accuracy,
            self.accuracy * 100.0
        )?;
        writeln!(f, "错误回答数: {}", self.error_ids.len())?;
        writeln!(f, "错误ID列表: {:?}", self.error_ids)?;
        writeln!(f)?;
        writeln!(f, "详细结果已保存至:")?;
        writeln!(f, "- 评估结果: {}", self.results_path.display())?;
        write!(f, "- 错误记录: {}", self.errors_path.display())
    }
}
