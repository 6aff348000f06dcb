//! hc-reporter - healthchecks.io 任务状态上报工具
//!
//! 这是一个用Rust编写的 healthchecks.io 客户端，支持：
//! - 成功/失败 ping 上报
//! - 按需创建（upsert）检查项
//! - TOML配置与环境变量替换
//! - 结构化日志记录

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod reporter;

// 重新导出主要类型
pub use config::{Config, GlobalConfig, HealthchecksConfig};
pub use error::{ReportError, ReporterError};
pub use reporter::{HealthReporter, HealthchecksReporter, NoOpReporter, PingOutcome};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
