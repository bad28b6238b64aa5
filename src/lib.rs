//! # QA Evaluator
//!
//! 批量评估答题大模型：逐条比对模型答案与标准答案，输出正误、分值和汇总统计
//!
//! ## 架构设计
//!
//! ### ① 数据层（Models）
//! - `models/` - 严格的记录结构、题型、判分标签和持久化格式
//! - `models::loaders` - 把各种键名的原始输入解析成 `QARecord`
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单条记录
//! - `classifier` - 题型判定（评分和汇总共用）
//! - `judge` / `LlmJudge` - 判分模型调用与标签映射
//! - `ResultWriter` - 追加写出结果和错误
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条记录"的评分流程
//! - `GradingEngine` - 标准答案 → 精确匹配 → 判分模型
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量评分，管理并发和输出
//!
//! ### ⑤ 汇总层（Report）
//! - `report/` - 读取结果文件，重新判定题型并统计
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod report;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{ConfigError, FileError, JudgeFailure};
pub use models::{GradeResult, JudgeLabel, QARecord, QuestionTypeBucket};
pub use orchestrator::{App, EvaluationSummary};
pub use report::{summarize_file, SummaryReport};
pub use services::{Judge, JudgeRequest, JudgeVerdictMapper, LlmJudge};
pub use workflow::{GradingEngine, RecordCtx};
