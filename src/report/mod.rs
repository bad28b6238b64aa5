//! 汇总层（Reporting）
//!
//! 独立于评分流程运行，只读取结果文件，不写任何中间状态。

pub mod summary;

pub use summary::{parse_rows, summarize, summarize_file, SubjectiveStats, SummaryReport, Tally};
