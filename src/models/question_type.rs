use serde::{Deserialize, Serialize};

/// 题型分桶
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionTypeBucket {
    /// 判断题
    Judge,
    /// 填空题
    FillBlank,
    /// 选择题（单选、多选）
    Choice,
    /// 计算题
    Calculation,
    /// 简答、证明、综合分析等主观题
    Subjective,
    /// 无法判定
    Unknown,
}

/// 统计用的粗粒度题型池
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionPool {
    /// 选择 / 判断 / 填空
    Objective,
    Calculation,
    /// 主观题和未知题型
    Subjective,
}

impl QuestionTypeBucket {
    /// 报告中各题型的输出顺序
    pub const REPORTED: [QuestionTypeBucket; 4] = [
        QuestionTypeBucket::Judge,
        QuestionTypeBucket::FillBlank,
        QuestionTypeBucket::Choice,
        QuestionTypeBucket::Calculation,
    ];

    /// 中文名称，写入结果文件和报告
    pub fn label(self) -> &'static str {
        match self {
            QuestionTypeBucket::Judge => "判断",
            QuestionTypeBucket::FillBlank => "填空",
            QuestionTypeBucket::Choice => "选择",
            QuestionTypeBucket::Calculation => "计算题",
            QuestionTypeBucket::Subjective => "简答",
            QuestionTypeBucket::Unknown => "未知",
        }
    }

    pub fn pool(self) -> QuestionPool {
        match self {
            QuestionTypeBucket::Judge | QuestionTypeBucket::FillBlank | QuestionTypeBucket::Choice => {
                QuestionPool::Objective
            }
            QuestionTypeBucket::Calculation => QuestionPool::Calculation,
            QuestionTypeBucket::Subjective | QuestionTypeBucket::Unknown => QuestionPool::Subjective,
        }
    }

    /// 按客观题格式写出（选择/判断/填空/计算）
    pub fn is_objective_format(self) -> bool {
        self.pool() != QuestionPool::Subjective
    }
}

impl std::fmt::Display for QuestionTypeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pools() {
        assert_eq!(QuestionTypeBucket::Judge.pool(), QuestionPool::Objective);
        assert_eq!(QuestionTypeBucket::FillBlank.pool(), QuestionPool::Objective);
        assert_eq!(QuestionTypeBucket::Choice.pool(), QuestionPool::Objective);
        assert_eq!(QuestionTypeBucket::Calculation.pool(), QuestionPool::Calculation);
        assert_eq!(QuestionTypeBucket::Subjective.pool(), QuestionPool::Subjective);
        assert_eq!(QuestionTypeBucket::Unknown.pool(), QuestionPool::Subjective);
    }

    #[test]
    fn test_unknown_is_kept_distinct_from_subjective() {
        assert_ne!(
            QuestionTypeBucket::Unknown.label(),
            QuestionTypeBucket::Subjective.label()
        );
    }
}
