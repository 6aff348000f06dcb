//! hc-reporter 主程序入口
//!
//! healthchecks.io 任务状态上报工具

use anyhow::{Context, Result};
use clap::Parser;
use hc_reporter::cli::args::{Args, Commands};
use hc_reporter::cli::commands::{
    load_config, Command, EnsureCommand, InitCommand, PingCommand, ValidateCommand,
    VersionCommand,
};
use hc_reporter::config::Config;
use hc_reporter::logging::{LogConfig, LoggingSystem};
use hc_reporter::reporter::build_reporter;
use tracing::{debug, error};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 上报命令需要先加载配置，日志设置也来自配置文件
    let config = if args.command.requires_config() {
        let path = args.get_config_path();
        let config = load_config(&args)
            .await
            .with_context(|| format!("加载配置文件失败: {}", path.display()))?;
        Some(config)
    } else {
        None
    };

    let mut log_config = config
        .as_ref()
        .map(|c| LogConfig::from_global(&c.global))
        .unwrap_or_default();
    log_config.level = args.effective_log_level(log_config.level);

    let _logging_system = LoggingSystem::setup_logging(log_config).context("初始化日志系统失败")?;

    debug!("{} v{} 启动", hc_reporter::APP_NAME, hc_reporter::VERSION);

    if let Err(e) = execute_command(&args, config.as_ref()).await {
        error!("命令执行失败: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// 执行CLI命令
async fn execute_command(args: &Args, config: Option<&Config>) -> Result<()> {
    let command: Box<dyn Command> = match &args.command {
        Commands::Success { .. } | Commands::Fail { .. } => {
            Box::new(PingCommand::new(create_reporter(config)?))
        }
        Commands::Ensure { .. } => Box::new(EnsureCommand::new(create_reporter(config)?)),
        Commands::Init { .. } => Box::new(InitCommand),
        Commands::Validate { .. } => Box::new(ValidateCommand),
        Commands::Version { .. } => Box::new(VersionCommand),
    };

    command.execute(args).await.map_err(|e| anyhow::anyhow!(e))
}

/// 根据配置创建上报器
fn create_reporter(
    config: Option<&Config>,
) -> Result<Box<dyn hc_reporter::reporter::HealthReporter>> {
    let config = config.context("上报命令缺少配置")?;
    build_reporter(config).context("创建HTTP客户端失败")
}
