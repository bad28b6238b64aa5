//! 结果写入服务 - 业务能力层
//!
//! 只负责"追加写出结果行/错误行"能力，不关心流程

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::FileError;
use crate::models::{ErrorEntry, ResultRow};

/// 结果写入服务
///
/// 职责：
/// - 每次运行开始时创建（清空）结果文件和错误文件
/// - 每条记录只追加一行，不回写
pub struct ResultWriter {
    results_path: PathBuf,
    errors_path: PathBuf,
    results: BufWriter<File>,
    errors: BufWriter<File>,
}

impl ResultWriter {
    /// 创建输出目录并打开两个文件
    pub fn create(results_path: impl Into<PathBuf>, errors_path: impl Into<PathBuf>) -> Result<Self, FileError> {
        let results_path = results_path.into();
        let errors_path = errors_path.into();
        for path in [&results_path, &errors_path] {
            if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
                fs::create_dir_all(dir).map_err(|e| FileError::write_failed(dir, e))?;
            }
        }
        let results = open_truncated(&results_path)?;
        let errors = open_truncated(&errors_path)?;
        Ok(Self {
            results_path,
            errors_path,
            results,
            errors,
        })
    }

    pub fn append_result(&mut self, row: &ResultRow) -> Result<(), FileError> {
        write_line(&mut self.results, &self.results_path, row)
    }

    pub fn append_error(&mut self, entry: &ErrorEntry) -> Result<(), FileError> {
        debug!("写入错误记录: ID#{}", entry.id);
        write_line(&mut self.errors, &self.errors_path, entry)
    }

    pub fn flush(&mut self) -> Result<(), FileError> {
        self.results
            .flush()
            .map_err(|e| FileError::write_failed(&self.results_path, e))?;
        self.errors
            .flush()
            .map_err(|e| FileError::write_failed(&self.errors_path, e))
    }

    pub fn results_path(&self) -> &Path {
        &self.results_path
    }

    pub fn errors_path(&self) -> &Path {
        &self.errors_path
    }
}

fn open_truncated(path: &Path) -> Result<BufWriter<File>, FileError> {
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)
        .map(BufWriter::new)
        .map_err(|e| FileError::write_failed(path, e))
}

/// 一条记录一行；serde_json 默认保留中文字符
fn write_line<T: Serialize>(out: &mut BufWriter<File>, path: &Path, value: &T) -> Result<(), FileError> {
    let line = serde_json::to_string(value)
        .map_err(|e| FileError::write_failed(path, std::io::Error::other(e)))?;
    writeln!(out, "{}", line).map_err(|e| FileError::write_failed(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GradeResult, JudgeLabel, QARecord, QuestionTypeBucket};

    #[test]
    fn test_writes_one_line_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("nested/results.jsonl");
        let errors = dir.path().join("nested/errors.jsonl");
        let mut writer = ResultWriter::create(&results, &errors).unwrap();

        let record = QARecord {
            id: "1".into(),
            question: "多行\r\n题干".into(),
            gold_answer: "红色".into(),
            pred_answer: "蓝色".into(),
            ..Default::default()
        };
        let result = GradeResult::from_label("1", QuestionTypeBucket::FillBlank, JudgeLabel::NoMatch);
        writer.append_result(&ResultRow::from_graded(&record, &result)).unwrap();
        writer.append_result(&ResultRow::from_graded(&record, &result)).unwrap();
        writer.flush().unwrap();

        let content = std::fs::read_to_string(&results).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("红色"));
        assert_eq!(std::fs::read_to_string(&errors).unwrap(), "");
    }

    #[test]
    fn test_create_truncates_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let results = dir.path().join("results.jsonl");
        let errors = dir.path().join("errors.jsonl");
        std::fs::write(&results, "old\n").unwrap();

        let mut writer = ResultWriter::create(&results, &errors).unwrap();
        writer.flush().unwrap();
        assert_eq!(std::fs::read_to_string(&results).unwrap(), "");
    }
}
