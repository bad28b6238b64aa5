/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::path::Path;

use tracing::info;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// 初始化全局日志
///
/// `RUST_LOG` 优先；否则 `verbose` 为 true 时使用 debug 级别。
/// 日志写到 stderr，stdout 只留给评估摘要和汇总报告。
pub fn init(verbose: bool) {
    // 重复初始化（例如测试中）直接忽略
    let _ = subscriber(verbose, std::io::stderr).try_init();
}

fn subscriber<W>(verbose: bool, writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(writer)
        .finish()
}

/// 记录程序启动信息
///
/// # 参数
/// - `input_path`: 输入文件
/// - `max_concurrent`: 最大并发判分数
pub fn log_startup(input_path: &Path, max_concurrent: usize) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 开始评估答题大模型性能 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📄 输入文件: {}", input_path.display());
    info!("📊 最大并发判分数: {}", max_concurrent);
    info!("{}", "=".repeat(60));
}

/// 记录数据加载信息
pub fn log_records_loaded(records: usize, gold_answers: usize, skipped_lines: usize) {
    info!(
        "✓ 加载完成: {} 个模型回答，{} 个标准答案",
        records, gold_answers
    );
    if skipped_lines > 0 {
        info!("⚠️ 跳过 {} 行无法解析的输入", skipped_lines);
    }
}

/// 每完成约 10% 输出一次进度
///
/// # 参数
/// - `done`: 已完成数量
/// - `total`: 总数
pub fn log_progress(done: usize, total: usize) {
    if total == 0 {
        return;
    }
    let step = (total / 10).max(1);
    if done % step == 0 || done == total {
        info!("评估中: {}/{} 题 ({:.0}%)", done, total, done as f64 / total as f64 * 100.0);
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `correct`: 正确数量
/// - `graded`: 参与统计的数量
/// - `errors`: 错误数量
/// - `results_path` / `errors_path`: 输出文件
pub fn print_final_stats(
    correct: usize,
    graded: usize,
    errors: usize,
    results_path: &Path,
    errors_path: &Path,
) {
    info!("\n{}", "=".repeat(60));
    info!("📊 评估完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 正确: {}/{}", correct, graded);
    info!("❌ 错误: {}", errors);
    info!("{}", "=".repeat(60));
    info!("评估结果: {}", results_path.display());
    info!("错误记录: {}", errors_path.display());
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_logs_go_to_configured_writer() {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = subscriber(false, move || sink.clone());
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("汇总: ID#1 -> 判断");
        });
        let text = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(text.contains("汇总: ID#1 -> 判断"));
    }

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("一二三四五", 3), "一二三...");
        assert_eq!(truncate_text("一二三", 3), "一二三");
    }
}
