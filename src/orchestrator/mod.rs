//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量评分和结果写出，是评估流程的"指挥中心"。
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<QARecord>)
//!     ↓
//! workflow::GradingEngine (处理单条记录)
//!     ↓
//! services (能力层：classifier / judge / writer)
//! ```
//!
//! ## 设计原则
//!
//! 1. **资源隔离**：只有编排层持有输出文件和并发许可
//! 2. **向下依赖**：编排层 → workflow → services
//! 3. **无业务逻辑**：只做调度和统计，不做具体评分判断

pub mod batch_processor;

pub use batch_processor::{App, EvaluationSummary};
