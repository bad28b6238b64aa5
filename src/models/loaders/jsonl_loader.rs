//! 从 JSON Lines 加载预测结果
//!
//! 原始输入的键名五花八门，这里按固定的候选键顺序解析成严格的 `QARecord`

use std::collections::HashSet;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::FileError;
use crate::models::record::{GoldLookup, QARecord};

const ID_KEYS: &[&str] = &["ID", "id"];
const QUESTION_KEYS: &[&str] = &["input", "prompt", "question"];
const PRED_KEYS: &[&str] = &["predict", "output", "answer"];
const GOLD_KEYS: &[&str] = &["label", "gold_answer", "reference"];
const TYPE_KEYS: &[&str] = &["question_type"];

const END_OF_TEXT: &str = "<|endoftext|>";

static PRED_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^解答[：:\s]*").expect("valid regex"));
static GOLD_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(输出|答案)[：:\s]*").expect("valid regex"));

/// 一次加载的结果
#[derive(Debug, Default)]
pub struct LoadedBatch {
    pub records: Vec<QARecord>,
    pub gold_lookup: GoldLookup,
    /// 无法解析而跳过的行数
    pub skipped: usize,
}

/// 从文件加载所有记录
pub async fn load_records(path: &Path) -> Result<LoadedBatch, FileError> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Err(FileError::not_found(path));
    }
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| FileError::read_failed(path, e))?;
    Ok(parse_records(&content))
}

/// 逐行解析，空行忽略，坏行跳过
pub fn parse_records(content: &str) -> LoadedBatch {
    let mut batch = LoadedBatch::default();
    let mut used_ids = HashSet::new();

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let entry = match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                warn!("第 {} 行不是 JSON 对象，已跳过", line_no + 1);
                batch.skipped += 1;
                continue;
            }
            Err(e) => {
                warn!("第 {} 行 JSON 解析失败，已跳过: {}", line_no + 1, e);
                batch.skipped += 1;
                continue;
            }
        };

        let record = parse_entry(&entry, &mut used_ids);
        debug!("解析记录: ID#{}", record.id);
        batch.gold_lookup.insert_record(&record);
        batch.records.push(record);
    }

    batch
}

/// 把一行原始 JSON 解析成 `QARecord`
pub fn parse_entry(entry: &Map<String, Value>, used_ids: &mut HashSet<String>) -> QARecord {
    let id = resolve_id(entry, used_ids);
    used_ids.insert(id.clone());

    let question = first_text(entry, QUESTION_KEYS)
        .trim()
        .replace(END_OF_TEXT, "");
    let pred_answer = PRED_PREFIX
        .replace(first_text(entry, PRED_KEYS).trim(), "")
        .into_owned();
    let gold_answer = GOLD_PREFIX
        .replace(first_text(entry, GOLD_KEYS).trim(), "")
        .into_owned();
    let question_type = Some(first_text(entry, TYPE_KEYS).trim().to_string()).filter(|t| !t.is_empty());

    QARecord {
        id,
        question,
        question_type,
        gold_answer,
        pred_answer,
    }
}

fn resolve_id(entry: &Map<String, Value>, used_ids: &HashSet<String>) -> String {
    let explicit = ID_KEYS
        .iter()
        .filter_map(|key| entry.get(*key))
        .chain(
            entry
                .get("metadata")
                .and_then(Value::as_object)
                .and_then(|meta| meta.get("ID")),
        )
        .find_map(scalar_text);

    match explicit {
        Some(id) if !used_ids.contains(&id) => id,
        Some(id) => {
            let fresh = fresh_id(used_ids);
            warn!("重复的 ID {}，已替换为 {}", id, fresh);
            fresh
        }
        None => fresh_id(used_ids),
    }
}

fn fresh_id(used_ids: &HashSet<String>) -> String {
    loop {
        let id = Uuid::new_v4().to_string();
        if !used_ids.contains(&id) {
            return id;
        }
    }
}

/// 第一个非空的候选字段
fn first_text(entry: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| entry.get(*key))
        .find_map(scalar_text)
        .unwrap_or_default()
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
