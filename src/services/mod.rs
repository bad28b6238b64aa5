pub mod classifier;
pub mod judge;
pub mod llm_service;
pub mod result_writer;

pub use classifier::{classify, classify_for_report, ClassifyPass};
pub use judge::{Judge, JudgeRequest, JudgeVerdictMapper, Verdict};
pub use llm_service::LlmJudge;
pub use result_writer::ResultWriter;
