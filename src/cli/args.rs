//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// hc-reporter - healthchecks.io 任务状态上报工具
#[derive(Parser, Debug, Clone)]
#[command(
    name = "hc-reporter",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径",
        env = "HC_REPORTER_CONFIG",
        global = true
    )]
    pub config: Option<PathBuf>,

    /// 日志级别（覆盖配置文件中的 log_level）
    #[arg(
        short,
        long,
        value_enum,
        help = "日志级别",
        env = "HC_REPORTER_LOG_LEVEL",
        global = true
    )]
    pub log_level: Option<LogLevel>,

    /// 是否启用详细输出
    #[arg(short, long, help = "启用详细输出", global = true)]
    pub verbose: bool,

    /// 子命令
    #[command(subcommand)]
    pub command: Commands,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 上报任务成功
    Success {
        /// 检查项 slug
        #[arg(value_name = "SLUG", help = "检查项slug")]
        slug: String,
    },

    /// 上报任务失败
    Fail {
        /// 检查项 slug
        #[arg(value_name = "SLUG", help = "检查项slug")]
        slug: String,
    },

    /// 创建或更新检查项
    Ensure {
        /// 检查项 slug
        #[arg(value_name = "SLUG", help = "检查项slug")]
        slug: String,
    },

    /// 初始化配置文件
    Init {
        /// 配置文件路径
        #[arg(
            value_name = "FILE",
            help = "配置文件路径",
            default_value = "config.toml"
        )]
        config_path: PathBuf,

        /// 是否覆盖现有文件
        #[arg(short, long, help = "覆盖现有文件")]
        force: bool,
    },

    /// 验证配置文件
    Validate {
        /// 配置文件路径
        #[arg(value_name = "FILE", help = "配置文件路径")]
        config_path: Option<PathBuf>,
    },

    /// 显示版本信息
    Version {
        /// 输出格式
        #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
        format: OutputFormat,
    },
}

impl Commands {
    /// 该命令是否需要加载配置文件才能执行
    pub fn requires_config(&self) -> bool {
        matches!(
            self,
            Commands::Success { .. } | Commands::Fail { .. } | Commands::Ensure { .. }
        )
    }
}

/// 输出格式枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum OutputFormat {
    /// 文本格式
    Text,
    /// JSON格式
    Json,
}

impl Args {
    /// 获取配置文件路径
    pub fn get_config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::get_default_config_path)
    }

    /// 计算最终日志级别
    ///
    /// 命令行参数优先，其次 `--verbose`，最后使用配置文件中的级别。
    pub fn effective_log_level(&self, configured: log::LevelFilter) -> log::LevelFilter {
        match &self.log_level {
            Some(level) => level.clone().into(),
            None if self.verbose => log::LevelFilter::Debug,
            None => configured,
        }
    }
}
