//! 汇总报告
//!
//! 只读取已写出的结果文件，重新判定题型后统计：
//! - 各题型正确率
//! - "整体"只计入客观题（选择/判断/填空）和计算题，不计入主观题
//! - 主观题平均分与五档得分分布

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::FileError;
use crate::models::judge_label::CANONICAL_SCORES;
use crate::models::{PersistedRow, QuestionPool, QuestionTypeBucket};
use crate::services::classify_for_report;

/// 某一题型（或题型池）的正确数 / 总数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub correct: usize,
    pub total: usize,
}

impl Tally {
    fn add(&mut self, is_correct: bool) {
        self.total += 1;
        if is_correct {
            self.correct += 1;
        }
    }

    /// 百分比，分母为 0 时为 0
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64 * 100.0
        }
    }
}

impl std::ops::Add for Tally {
    type Output = Tally;

    fn add(self, rhs: Tally) -> Tally {
        Tally {
            correct: self.correct + rhs.correct,
            total: self.total + rhs.total,
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}%（{}/{}）", self.percent(), self.correct, self.total)
    }
}

/// 主观题得分统计
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubjectiveStats {
    pub score_sum: f64,
    /// 有分值的题数
    pub scored: usize,
    /// 有标签但没有分值的题数
    pub missing: usize,
    /// 按 `CANONICAL_SCORES` 顺序的计数
    pub histogram: [usize; 5],
}

impl SubjectiveStats {
    fn add(&mut self, score: Option<f64>) {
        match score {
            Some(score) => {
                self.score_sum += score;
                self.scored += 1;
                self.histogram[nearest_canonical(score)] += 1;
            }
            None => self.missing += 1,
        }
    }

    /// 只按有分值的题计算；没有时为 0
    pub fn average(&self) -> f64 {
        if self.scored == 0 {
            0.0
        } else {
            self.score_sum / self.scored as f64
        }
    }

    pub fn denominator(&self) -> usize {
        self.scored + self.missing
    }

    pub fn is_empty(&self) -> bool {
        self.denominator() == 0
    }
}

/// 最近的标准分值下标；距离相同时取升序中先出现的
pub fn nearest_canonical(score: f64) -> usize {
    let mut best = 0;
    for (idx, canonical) in CANONICAL_SCORES.iter().enumerate() {
        if (canonical - score).abs() < (CANONICAL_SCORES[best] - score).abs() {
            best = idx;
        }
    }
    best
}

/// 汇总报告
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryReport {
    pub per_type: HashMap<QuestionTypeBucket, Tally>,
    /// 选择 / 判断 / 填空
    pub objective_pool: Tally,
    pub calculation: Tally,
    pub subjective: SubjectiveStats,
    /// 读到的行数（不含空行和坏行）
    pub rows: usize,
}

impl SummaryReport {
    /// 整体 = 客观题池 + 计算题
    pub fn overall(&self) -> Tally {
        self.objective_pool + self.calculation
    }

    pub fn tally(&self, bucket: QuestionTypeBucket) -> Tally {
        self.per_type.get(&bucket).copied().unwrap_or_default()
    }

    fn add_row(&mut self, row: &PersistedRow) {
        self.rows += 1;
        let bucket = classify_for_report(&row.question, &row.gold_answer);
        debug!("汇总: ID#{} -> {}", row.id, bucket);

        if let Some(is_correct) = row.effective_correct(bucket) {
            self.per_type.entry(bucket).or_default().add(is_correct);
            match bucket.pool() {
                QuestionPool::Objective => self.objective_pool.add(is_correct),
                QuestionPool::Calculation => self.calculation.add(is_correct),
                QuestionPool::Subjective => {}
            }
        }

        if row.feeds_subjective_stats(bucket) {
            self.subjective.add(row.score);
        }
    }
}

/// 统计一组已解析的行
pub fn summarize<'a>(rows: impl IntoIterator<Item = &'a PersistedRow>) -> SummaryReport {
    let mut report = SummaryReport::default();
    for row in rows {
        report.add_row(row);
    }
    report
}

/// 解析 JSON Lines 内容，跳过空行和坏行
pub fn parse_rows(content: &str) -> Vec<PersistedRow> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| serde_json::from_str::<Value>(line).ok())
        .filter_map(|value| PersistedRow::from_value(&value))
        .collect()
}

/// 读取结果文件并统计
pub fn summarize_file(path: &Path) -> Result<SummaryReport, FileError> {
    if !path.exists() {
        return Err(FileError::not_found(path));
    }
    let content = std::fs::read_to_string(path).map_err(|e| FileError::read_failed(path, e))?;
    Ok(summarize(&parse_rows(&content)))
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "客观题（选择/判断/填空）正确率：{}", self.objective_pool)?;
        writeln!(f, "细分 & 补充")?;
        writeln!(f, "各题型正确率：")?;
        for bucket in QuestionTypeBucket::REPORTED {
            writeln!(f, "{}：{}", bucket.label(), self.tally(bucket))?;
        }
        write!(f, "整体：{}。", self.overall())?;

        if self.subjective.is_empty() {
            return Ok(());
        }

        let stats = &self.subjective;
        let denom = stats.denominator();
        writeln!(f)?;
        writeln!(f, "主观题")?;
        writeln!(
            f,
            "平均得分：{:.3}（按实际有分值的题计算均值；缺失不计入）",
            stats.average()
        )?;
        let mut parts: Vec<String> = CANONICAL_SCORES
            .iter()
            .zip(stats.histogram)
            .map(|(score, count)| format!("得{}分: {}/{}", score, count, denom))
            .collect();
        if stats.missing > 0 {
            parts.push(format!("未评分/缺失:{}/{}", stats.missing, denom));
        }
        writeln!(f, "得分分布（分母 {}）：", denom)?;
        write!(f, "  {}", parts.join("  "))
    }
}
