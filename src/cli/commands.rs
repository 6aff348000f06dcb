//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::cli::args::{Args, Commands, OutputFormat};
use crate::config::{Config, ConfigLoader, TomlConfigLoader};
use crate::error::Result;
use crate::reporter::{HealthReporter, PingOutcome};
use async_trait::async_trait;
use std::path::Path;

/// 配置文件模板
const CONFIG_TEMPLATE: &str = include_str!("../../templates/config.toml");

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    async fn execute(&self, args: &Args) -> Result<()>;
}

/// 从命令行指定的路径（或默认路径）加载配置
pub async fn load_config(args: &Args) -> Result<Config> {
    let loader = TomlConfigLoader::new(true);
    loader.load_from_file(args.get_config_path()).await
}

/// 版本命令
pub struct VersionCommand;

#[async_trait]
impl Command for VersionCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Version { format } = &args.command {
            match format {
                OutputFormat::Json => {
                    let version_info = serde_json::json!({
                        "name": crate::APP_NAME,
                        "version": crate::VERSION,
                        "description": crate::APP_DESCRIPTION
                    });
                    println!("{}", serde_json::to_string_pretty(&version_info)?);
                }
                OutputFormat::Text => {
                    println!("{} v{}", crate::APP_NAME, crate::VERSION);
                    println!("{}", crate::APP_DESCRIPTION);
                }
            }
        }
        Ok(())
    }
}

/// 初始化命令
pub struct InitCommand;

#[async_trait]
impl Command for InitCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Init { config_path, force } = &args.command {
            self.create_config_file(config_path, *force).await
        } else {
            Ok(())
        }
    }
}

impl InitCommand {
    /// 创建配置文件
    async fn create_config_file(&self, config_path: &Path, force: bool) -> Result<()> {
        if config_path.exists() && !force {
            eprintln!("配置文件已存在: {}", config_path.display());
            eprintln!("使用 --force 参数覆盖现有文件");
            return Ok(());
        }

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(config_path, CONFIG_TEMPLATE).await?;

        println!("配置文件已创建: {}", config_path.display());
        println!("请设置 HC_PING_KEY 环境变量或直接编辑配置文件");

        Ok(())
    }
}

/// 验证命令
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Validate { config_path } = &args.command {
            let config_file = config_path
                .clone()
                .unwrap_or_else(|| args.get_config_path());

            self.validate_config_file(&config_file, args.verbose).await
        } else {
            Ok(())
        }
    }
}

impl ValidateCommand {
    /// 验证配置文件
    async fn validate_config_file(&self, config_path: &Path, verbose: bool) -> Result<()> {
        println!("验证配置文件: {}", config_path.display());

        let loader = TomlConfigLoader::new(true);
        let config = loader.load_from_file(config_path).await?;
        let hc = &config.healthchecks;

        println!("✓ 配置文件验证通过");

        if verbose {
            println!("全局配置:");
            println!("  日志级别: {}", config.global.log_level);
            println!("  请求超时: {}秒", config.global.request_timeout_seconds);
            println!("healthchecks 配置:");
            println!("  启用状态: {}", if hc.enabled { "是" } else { "否" });
            println!(
                "  自动创建检查项: {}",
                if hc.create_new_checks { "是" } else { "否" }
            );
            println!("  超时时间: {}秒", hc.timeout_seconds);
            println!("  宽限时间: {}秒", hc.grace_seconds);
            println!("  ping 地址: {}", hc.ping_base_url);
            println!("  API 地址: {}", hc.api_url);
        }

        Ok(())
    }
}

/// ping 上报命令（success / fail）
pub struct PingCommand {
    reporter: Box<dyn HealthReporter>,
}

impl PingCommand {
    /// 使用指定上报器创建命令
    pub fn new(reporter: Box<dyn HealthReporter>) -> Self {
        Self { reporter }
    }
}

#[async_trait]
impl Command for PingCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let (slug, outcome) = match &args.command {
            Commands::Success { slug } => (slug, PingOutcome::Success),
            Commands::Fail { slug } => (slug, PingOutcome::Failure),
            _ => return Ok(()),
        };

        self.reporter.send(slug, outcome).await?;
        Ok(())
    }
}

/// 检查项创建命令
pub struct EnsureCommand {
    reporter: Box<dyn HealthReporter>,
}

impl EnsureCommand {
    /// 使用指定上报器创建命令
    pub fn new(reporter: Box<dyn HealthReporter>) -> Self {
        Self { reporter }
    }
}

#[async_trait]
impl Command for EnsureCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Ensure { slug } = &args.command {
            self.reporter.ensure_check(slug).await?;
            println!("✓ 检查项已就绪: {}", slug);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ReportError, ReportResult, ReporterError};
    use crate::reporter::NoOpReporter;
    use clap::Parser;
    use std::sync::{Arc, Mutex};

    /// 记录调用的上报器
    #[derive(Default, Clone)]
    struct RecordingReporter {
        calls: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl HealthReporter for RecordingReporter {
        async fn ensure_check(&self, slug: &str) -> ReportResult<()> {
            self.calls.lock().unwrap().push(format!("ensure:{slug}"));
            Ok(())
        }

        async fn send(&self, slug: &str, outcome: PingOutcome) -> ReportResult<()> {
            self.calls.lock().unwrap().push(format!("{outcome}:{slug}"));
            Ok(())
        }
    }

    /// 总是失败的上报器
    struct FailingReporter;

    #[async_trait]
    impl HealthReporter for FailingReporter {
        async fn ensure_check(&self, _slug: &str) -> ReportResult<()> {
            Err(ReportError::UnexpectedStatus {
                url: "http://localhost/api/v3/checks/".to_string(),
                status: 401,
            })
        }

        async fn send(&self, slug: &str, _outcome: PingOutcome) -> ReportResult<()> {
            Err(ReportError::InvalidSlug(slug.to_string()))
        }
    }

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[tokio::test]
    async fn test_ping_command_dispatches_outcome() {
        let reporter = RecordingReporter::default();
        let command = PingCommand::new(Box::new(reporter.clone()));

        command
            .execute(&parse(&["hc-reporter", "success", "backup"]))
            .await
            .unwrap();
        command
            .execute(&parse(&["hc-reporter", "fail", "backup"]))
            .await
            .unwrap();

        let calls = reporter.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["success:backup", "failure:backup"]);
    }

    #[tokio::test]
    async fn test_ensure_command() {
        let reporter = RecordingReporter::default();
        let command = EnsureCommand::new(Box::new(reporter.clone()));

        command
            .execute(&parse(&["hc-reporter", "ensure", "backup"]))
            .await
            .unwrap();

        assert_eq!(*reporter.calls.lock().unwrap(), vec!["ensure:backup"]);
    }

    #[tokio::test]
    async fn test_command_errors_propagate() {
        let command = EnsureCommand::new(Box::new(FailingReporter));
        let result = command
            .execute(&parse(&["hc-reporter", "ensure", "backup"]))
            .await;

        assert!(matches!(
            result,
            Err(ReporterError::Report(ReportError::UnexpectedStatus { status: 401, .. }))
        ));

        let command = PingCommand::new(Box::new(FailingReporter));
        assert!(command
            .execute(&parse(&["hc-reporter", "fail", "backup"]))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_ping_command_ignores_other_commands() {
        let command = PingCommand::new(Box::new(NoOpReporter));
        assert!(command
            .execute(&parse(&["hc-reporter", "version"]))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_init_creates_valid_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let path_str = path.to_string_lossy().to_string();

        InitCommand
            .execute(&parse(&["hc-reporter", "init", &path_str]))
            .await
            .unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.contains("[healthchecks]"));

        // 模板在未替换环境变量时也应能被解析和验证
        let loader = TomlConfigLoader::new(false);
        let config = loader.load_from_string(&content).await.unwrap();
        assert_eq!(config.healthchecks.ping_key, "${HC_PING_KEY}");
    }

    #[tokio::test]
    async fn test_init_does_not_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        tokio::fs::write(&path, "existing").await.unwrap();
        let path_str = path.to_string_lossy().to_string();

        InitCommand
            .execute(&parse(&["hc-reporter", "init", &path_str]))
            .await
            .unwrap();
        assert_eq!(tokio::fs::read_to_string(&path).await.unwrap(), "existing");

        InitCommand
            .execute(&parse(&["hc-reporter", "init", &path_str, "--force"]))
            .await
            .unwrap();
        assert_ne!(tokio::fs::read_to_string(&path).await.unwrap(), "existing");
    }

    #[tokio::test]
    async fn test_validate_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let path_str = path.to_string_lossy().to_string();

        let result = ValidateCommand
            .execute(&parse(&["hc-reporter", "validate", &path_str]))
            .await;
        assert!(result.is_err());
    }
}
