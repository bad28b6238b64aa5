pub mod jsonl_loader;

pub use jsonl_loader::{load_records, parse_records, LoadedBatch};
