use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// 评测配置
///
/// 启动时构建一次，之后以只读引用传给各组件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 模型预测结果文件（JSON Lines）
    pub input_path: PathBuf,
    /// 输出目录
    pub output_dir: PathBuf,
    /// 同时进行的判分请求数上限
    pub max_concurrent_judge_calls: usize,
    /// 单次判分请求超时（秒）
    pub judge_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("./generated_predictions.jsonl"),
            output_dir: PathBuf::from("./results"),
            max_concurrent_judge_calls: 8,
            judge_timeout_secs: 30,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.deepseek.com/v1".to_string(),
            llm_model_name: "deepseek-chat".to_string(),
        }
    }
}

impl Config {
    /// 默认值 + 环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件加载，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::TomlParseFailed { source, .. } => ConfigError::TomlParseFailed {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::TomlParseFailed {
            path: String::new(),
            source: e,
        })
    }

    /// 用环境变量覆盖当前配置
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(v) = lookup("INPUT_PATH") {
            self.input_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("MAX_CONCURRENT_JUDGE_CALLS") {
            self.max_concurrent_judge_calls = parse_var("MAX_CONCURRENT_JUDGE_CALLS", &v, "usize")?;
        }
        if let Some(v) = lookup("JUDGE_TIMEOUT_SECS") {
            self.judge_timeout_secs = parse_var("JUDGE_TIMEOUT_SECS", &v, "u64")?;
        }
        if let Some(v) = lookup("VERBOSE_LOGGING") {
            self.verbose_logging = parse_var("VERBOSE_LOGGING", &v, "bool")?;
        }
        if let Some(v) = lookup("DEEPSEEK_API_KEY").or_else(|| lookup("LLM_API_KEY")) {
            self.llm_api_key = v;
        }
        if let Some(v) = lookup("LLM_API_BASE_URL") {
            self.llm_api_base_url = v;
        }
        if let Some(v) = lookup("LLM_MODEL_NAME") {
            self.llm_model_name = v;
        }
        Ok(self)
    }

    /// 全部评估结果
    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join("results.jsonl")
    }

    /// 错误样本列表
    pub fn errors_path(&self) -> PathBuf {
        self.output_dir.join("errors.jsonl")
    }

    /// 实际使用的并发上限，至少为 1
    pub fn judge_concurrency(&self) -> usize {
        self.max_concurrent_judge_calls.max(1)
    }
}

fn parse_var<T: std::str::FromStr>(
    var_name: &str,
    value: &str,
    expected_type: &str,
) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvVarParseFailed {
            var_name: var_name.to_string(),
            value: value.to_string(),
            expected_type: expected_type.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_derived_paths() {
        let config = Config::default();
        assert_eq!(config.results_path(), PathBuf::from("./results/results.jsonl"));
        assert_eq!(config.errors_path(), PathBuf::from("./results/errors.jsonl"));
    }

    #[test]
    fn test_toml_partial_fields_keep_defaults() {
        let config = Config::from_toml_str(
            r#"
            output_dir = "out"
            max_concurrent_judge_calls = 2
            "#,
        )
        .unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.max_concurrent_judge_calls, 2);
        assert_eq!(config.llm_model_name, "deepseek-chat");
        assert_eq!(config.judge_timeout_secs, 30);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("LLM_API_KEY", "fallback"),
            ("DEEPSEEK_API_KEY", "primary"),
            ("JUDGE_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();
        let config = Config::default()
            .with_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.llm_api_key, "primary");
        assert_eq!(config.judge_timeout_secs, 5);
    }

    #[test]
    fn test_bad_env_value_is_reported() {
        let err = Config::default()
            .with_overrides(|name| (name == "MAX_CONCURRENT_JUDGE_CALLS").then(|| "many".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarParseFailed { .. }));
    }

    #[test]
    fn test_zero_concurrency_is_coerced() {
        let config = Config {
            max_concurrent_judge_calls: 0,
            ..Config::default()
        };
        assert_eq!(config.judge_concurrency(), 1);
    }
}
