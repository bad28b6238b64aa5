pub mod grade;
pub mod judge_label;
pub mod loaders;
pub mod question_type;
pub mod record;

pub use grade::{ErrorEntry, GradeResult, GradedRecord, PersistedRow, ResultRow};
pub use judge_label::JudgeLabel;
pub use loaders::{load_records, LoadedBatch};
pub use question_type::{QuestionPool, QuestionTypeBucket};
pub use record::{GoldEntry, GoldLookup, QARecord};
