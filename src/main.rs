use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use qa_evaluator::utils::logging;
use qa_evaluator::{summarize_file, App, Config};

/// 默认的结果文件位置
const DEFAULT_RESULTS: &str = "results/results.jsonl";

#[derive(Parser)]
#[command(name = "qa_evaluator")]
#[command(about = "评估答题大模型：精确匹配 + 判分模型，输出正确率和得分分布")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 评分所有预测结果并写出 results.jsonl / errors.jsonl
    Evaluate {
        /// 预测结果文件（JSON Lines）
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// 输出目录
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// TOML 配置文件
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// 同时进行的判分请求数
        #[arg(long)]
        concurrency: Option<usize>,

        /// 显示详细日志
        #[arg(short, long)]
        verbose: bool,
    },
    /// 汇总 results.jsonl 评测结果
    Report {
        /// results.jsonl 路径
        #[arg(short, long, default_value = DEFAULT_RESULTS)]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            input,
            output_dir,
            config,
            concurrency,
            verbose,
        } => {
            // 加载配置：默认值 → 配置文件 → 环境变量 → 命令行
            let base = match config {
                Some(path) => Config::from_toml_file(&path)?,
                None => Config::default(),
            };
            let mut config = base.with_env_overrides()?;
            if let Some(input) = input {
                config.input_path = input;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(n) = concurrency {
                config.max_concurrent_judge_calls = n;
            }
            config.verbose_logging |= verbose;

            // 初始化日志
            logging::init(config.verbose_logging);

            let summary = App::initialize(config).run().await?;
            println!("\n{}", summary);
        }
        Commands::Report { path } => {
            logging::init(false);
            let report = summarize_file(&path)
                .with_context(|| format!("无法汇总结果文件: {}", path.display()))?;
            println!("{}", report);
        }
    }

    Ok(())
}
