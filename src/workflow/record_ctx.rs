//! 记录处理上下文
//!
//! 封装"我正在处理第几条、哪个 ID"这一信息

use std::fmt::Display;

/// 记录处理上下文
#[derive(Debug, Clone)]
pub struct RecordCtx {
    /// 记录在输入中的序号（从1开始，仅用于日志显示）
    pub index: usize,

    /// 记录 ID
    pub id: String,
}

impl RecordCtx {
    pub fn new(index: usize, id: impl Into<String>) -> Self {
        Self {
            index,
            id: id.into(),
        }
    }
}

impl Display for RecordCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[记录 #{} ID#{}]", self.index, self.id)
    }
}
