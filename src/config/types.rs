//! 配置数据结构定义
//!
//! 定义应用程序的配置结构体和验证逻辑

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// healthchecks.io ping 服务默认地址
pub const DEFAULT_PING_BASE_URL: &str = "https://hc-ping.com";

/// healthchecks.io 检查项管理接口默认地址
pub const DEFAULT_API_URL: &str = "https://healthchecks.io/api/v3/checks/";

/// healthchecks.io 接受的 timeout/grace 最小值（秒）
pub const MIN_PERIOD_SECONDS: u64 = 60;

/// healthchecks.io 接受的 timeout/grace 最大值（秒，365天）
pub const MAX_PERIOD_SECONDS: u64 = 31_536_000;

/// 主配置结构，包含全局配置和 healthchecks 配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// 全局配置项
    #[serde(default)]
    pub global: GlobalConfig,
    /// healthchecks.io 上报配置
    pub healthchecks: HealthchecksConfig,
}

/// 全局配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// 是否输出JSON格式日志
    #[serde(default)]
    pub json_logs: bool,
    /// 日志文件路径（不设置则输出到控制台）
    pub log_file: Option<PathBuf>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            request_timeout_seconds: default_request_timeout(),
            json_logs: false,
            log_file: None,
        }
    }
}

impl GlobalConfig {
    /// 请求超时时间
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// healthchecks.io 上报配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthchecksConfig {
    /// 是否启用上报，关闭时所有操作为空操作
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// 项目 ping key
    pub ping_key: String,
    /// 项目 API key（仅自动创建检查项时需要）
    pub api_key: Option<String>,
    /// ping 之前是否先创建（或更新）检查项
    #[serde(default)]
    pub create_new_checks: bool,
    /// 检查项超时时间（秒）
    #[serde(default = "default_check_timeout")]
    pub timeout_seconds: u64,
    /// 检查项宽限时间（秒）
    #[serde(default = "default_grace")]
    pub grace_seconds: u64,
    /// ping 服务地址
    #[serde(default = "default_ping_base_url")]
    pub ping_base_url: String,
    /// 检查项管理接口地址
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl HealthchecksConfig {
    /// 使用默认值创建配置
    pub fn new(ping_key: impl Into<String>) -> Self {
        Self {
            enabled: default_enabled(),
            ping_key: ping_key.into(),
            api_key: None,
            create_new_checks: false,
            timeout_seconds: default_check_timeout(),
            grace_seconds: default_grace(),
            ping_base_url: default_ping_base_url(),
            api_url: default_api_url(),
        }
    }
}

// 默认值函数
fn default_log_level() -> String {
    "info".to_string()
}
fn default_request_timeout() -> u64 {
    10
}
fn default_enabled() -> bool {
    true
}
fn default_check_timeout() -> u64 {
    86_400 // 1天
}
fn default_grace() -> u64 {
    3_600 // 1小时
}
fn default_ping_base_url() -> String {
    DEFAULT_PING_BASE_URL.to_string()
}
fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    // 验证全局配置
    if config.global.request_timeout_seconds == 0 {
        return Err("请求超时时间不能为0".to_string());
    }

    let valid_log_levels = ["debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&config.global.log_level.as_str()) {
        return Err(format!(
            "无效的日志级别: {}，支持的级别: {:?}",
            config.global.log_level, valid_log_levels
        ));
    }

    let hc = &config.healthchecks;

    // 关闭上报时不再校验密钥
    if !hc.enabled {
        return Ok(());
    }

    if hc.ping_key.trim().is_empty() {
        return Err("ping_key 不能为空".to_string());
    }

    if hc.create_new_checks && hc.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
        return Err("启用 create_new_checks 时必须配置 api_key".to_string());
    }

    for (name, value) in [("timeout_seconds", hc.timeout_seconds), ("grace_seconds", hc.grace_seconds)] {
        if !(MIN_PERIOD_SECONDS..=MAX_PERIOD_SECONDS).contains(&value) {
            return Err(format!(
                "{name} 必须在 {MIN_PERIOD_SECONDS} 到 {MAX_PERIOD_SECONDS} 之间，当前值: {value}"
            ));
        }
    }

    if !is_http_url(&hc.ping_base_url) {
        return Err(format!("ping_base_url 格式无效: {}", hc.ping_base_url));
    }

    if !is_http_url(&hc.api_url) {
        return Err(format!("api_url 格式无效: {}", hc.api_url));
    }

    Ok(())
}
