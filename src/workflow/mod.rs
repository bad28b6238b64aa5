pub mod grading_engine;
pub mod record_ctx;

pub use grading_engine::{is_exact_match, resolve_gold, GradingEngine};
pub use record_ctx::RecordCtx;
