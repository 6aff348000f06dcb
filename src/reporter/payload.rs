//! 请求数据结构
//!
//! 定义检查项创建请求体、ping 结果类型和 URL 构建逻辑

use crate::error::{ReportError, ReportResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// 检查项创建（upsert）请求体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCheckPayload {
    /// 检查项名称
    pub name: String,
    /// 检查项 slug
    pub slug: String,
    /// 超时时间（秒）
    pub timeout: u64,
    /// 宽限时间（秒）
    pub grace: u64,
    /// 判定为同一检查项所依据的字段
    pub unique: Vec<String>,
    /// 通知渠道，`*` 表示全部
    pub channels: String,
    /// 项目 API key
    pub api_key: String,
}

impl CreateCheckPayload {
    /// 以 slug 同时作为名称和 slug 创建请求体
    pub fn new(slug: &str, timeout: u64, grace: u64, api_key: &str) -> Self {
        Self {
            name: slug.to_string(),
            slug: slug.to_string(),
            timeout,
            grace,
            unique: vec!["name".to_string(), "slug".to_string()],
            channels: "*".to_string(),
            api_key: api_key.to_string(),
        }
    }
}

/// ping 上报的结果类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PingOutcome {
    /// 任务成功（存活信号）
    Success,
    /// 任务失败
    Failure,
}

impl PingOutcome {
    /// ping URL 的路径后缀
    pub fn path_suffix(&self) -> &'static str {
        match self {
            PingOutcome::Success => "",
            PingOutcome::Failure => "/fail",
        }
    }
}

impl std::fmt::Display for PingOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PingOutcome::Success => write!(f, "success"),
            PingOutcome::Failure => write!(f, "failure"),
        }
    }
}

/// 判断是否为合法的 URL 路径段（仅字母、数字、`-` 和 `_`）
///
/// slug 和 ping key 直接拼接进 URL 路径，`?`、`#`、`/`、`.` 等字符会改变请求地址。
pub fn is_path_segment(value: &str) -> bool {
    static SEGMENT_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    SEGMENT_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(value))
}

/// 校验 slug
pub fn validate_slug(slug: &str) -> ReportResult<()> {
    if !is_path_segment(slug) {
        return Err(ReportError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

/// 校验 ping key，错误信息中不包含 key 本身
pub fn validate_ping_key(ping_key: &str) -> ReportResult<()> {
    if !is_path_segment(ping_key) {
        return Err(ReportError::InvalidPingKey);
    }
    Ok(())
}

/// 构建 ping URL: `<base>/<ping_key>/<slug>[/fail]`
pub fn ping_url(base_url: &str, ping_key: &str, slug: &str, outcome: PingOutcome) -> String {
    format!(
        "{}/{}/{}{}",
        base_url.trim_end_matches('/'),
        ping_key,
        slug,
        outcome.path_suffix()
    )
}
