use thiserror::Error;

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("未找到文件: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

/// 一次判分调用没有拿到有效标签的原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JudgeFailure {
    /// 超过配置的超时时间
    #[error("判分请求超时 ({timeout_secs}秒)")]
    Timeout { timeout_secs: u64 },
    /// 网络或 API 层面的失败
    #[error("判分请求失败: {0}")]
    Transport(String),
    /// 返回内容里没有任何一个合法标签
    #[error("无法识别的判分结果: {0}")]
    UnrecognizedResponse(String),
}

impl FileError {
    pub fn not_found(path: impl AsRef<std::path::Path>) -> Self {
        FileError::NotFound {
            path: path.as_ref().display().to_string(),
        }
    }

    pub fn read_failed(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        FileError::ReadFailed {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    pub fn write_failed(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        FileError::WriteFailed {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
