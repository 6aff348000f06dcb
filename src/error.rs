//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use thiserror::Error;

/// hc-reporter 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum ReporterError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 上报相关错误
    #[error("上报错误: {0}")]
    Report(#[from] ReportError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// 上报错误类型
///
/// ping 请求只会产生 `Transport` 和参数类错误，`UnexpectedStatus`
/// 仅由检查项创建接口返回。
#[derive(Error, Debug)]
pub enum ReportError {
    /// 传输层错误（DNS、连接、超时、读取响应体）
    #[error("HTTP请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    /// 创建检查项时返回了非 200/201 状态码
    #[error("请求 {url} 返回了意外的状态码: HTTP {status}")]
    UnexpectedStatus { url: String, status: u16 },

    /// 无效的检查项 slug
    #[error("无效的slug: {0:?}")]
    InvalidSlug(String),

    /// ping key 为空或包含 URL 保留字符
    #[error("无效的ping key：只允许字母、数字、'-' 和 '_'")]
    InvalidPingKey,

    /// 创建检查项需要 API key
    #[error("未配置API key，无法创建检查项")]
    MissingApiKey,
}

impl ReportError {
    /// 返回意外状态码（如果有）
    pub fn status(&self) -> Option<u16> {
        match self {
            ReportError::UnexpectedStatus { status, .. } => Some(*status),
            ReportError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// 是否为超时错误
    pub fn is_timeout(&self) -> bool {
        matches!(self, ReportError::Transport(e) if e.is_timeout())
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, ReporterError>;

/// 上报操作的结果类型别名
pub type ReportResult<T> = std::result::Result<T, ReportError>;
