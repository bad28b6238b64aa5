use std::collections::HashMap;

/// 一条待评估的问答记录
///
/// 由加载器从原始输入解析得到，交给评分引擎后不再修改
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QARecord {
    pub id: String,
    pub question: String,
    /// 输入中声明的题型；没有声明时为 None
    pub question_type: Option<String>,
    pub gold_answer: String,
    pub pred_answer: String,
}

/// 标准答案
#[derive(Debug, Clone, PartialEq)]
pub struct GoldEntry {
    pub answer: String,
    pub question_type: Option<String>,
}

/// 按 ID 查找标准答案
#[derive(Debug, Clone, Default)]
pub struct GoldLookup {
    entries: HashMap<String, GoldEntry>,
}

impl GoldLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// 只收录有标准答案的记录
    pub fn insert_record(&mut self, record: &QARecord) {
        if record.gold_answer.is_empty() {
            return;
        }
        self.entries.insert(
            record.id.clone(),
            GoldEntry {
                answer: record.gold_answer.clone(),
                question_type: record.question_type.clone(),
            },
        );
    }

    pub fn insert(&mut self, id: impl Into<String>, entry: GoldEntry) {
        self.entries.insert(id.into(), entry);
    }

    pub fn get(&self, id: &str) -> Option<&GoldEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_skips_records_without_gold() {
        let records = vec![
            QARecord {
                id: "1".into(),
                gold_answer: "红色".into(),
                ..Default::default()
            },
            QARecord {
                id: "2".into(),
                ..Default::default()
            },
        ];
        let mut lookup = GoldLookup::new();
        for record in &records {
            lookup.insert_record(record);
        }
        assert_eq!(lookup.len(), 1);
        assert_eq!(lookup.get("1").map(|e| e.answer.as_str()), Some("红色"));
        assert!(lookup.get("2").is_none());
    }
}
