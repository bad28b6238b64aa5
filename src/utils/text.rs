//! 文本规范化
//!
//! 精确匹配比较和写出结果前都使用同一个规范化函数

/// 全角空格
const IDEOGRAPHIC_SPACE: char = '\u{3000}';

/// 规范化文本
///
/// - 去掉首尾空白
/// - 全角空格替换为半角空格
/// - `\r\n` 统一为 `\n`
///
/// 不改变大小写，也不合并中间的连续空格
pub fn normalize(text: &str) -> String {
    text.trim()
        .replace(IDEOGRAPHIC_SPACE, " ")
        .replace("\r\n", "\n")
}

/// 规范化后的字符数
pub fn normalized_len(text: &str) -> usize {
    normalize(text).chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize("  红色 \r\n"), "红色");
        assert_eq!(normalize("a\u{3000}b"), "a b");
        assert_eq!(normalize("第一行\r\n第二行"), "第一行\n第二行");
    }

    #[test]
    fn test_normalize_keeps_case_and_inner_spaces() {
        assert_eq!(normalize("Ab  C"), "Ab  C");
    }

    #[test]
    fn test_normalized_len_counts_chars() {
        assert_eq!(normalized_len(" 中文 "), 2);
    }
}
