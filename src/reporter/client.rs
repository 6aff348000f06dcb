//! healthchecks.io 上报客户端实现
//!
//! 提供检查项创建（upsert）和成功/失败 ping 上报功能

use crate::config::{Config, HealthchecksConfig};
use crate::error::{ReportError, ReportResult};
use crate::reporter::payload::{
    ping_url, validate_ping_key, validate_slug, CreateCheckPayload, PingOutcome,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 健康上报器trait，定义上报接口
#[async_trait]
pub trait HealthReporter: Send + Sync {
    /// 确保检查项存在
    ///
    /// 服务端按 name+slug 去重，重复调用不会创建重复的检查项。
    ///
    /// # 参数
    /// * `slug` - 检查项 slug
    ///
    /// # 返回
    /// * `ReportResult<()>` - 仅在服务端返回 200/201 时成功
    async fn ensure_check(&self, slug: &str) -> ReportResult<()>;

    /// 发送一次 ping
    ///
    /// # 参数
    /// * `slug` - 检查项 slug
    /// * `outcome` - 上报结果
    ///
    /// # 返回
    /// * `ReportResult<()>` - 仅传输失败时返回错误，不校验响应状态码
    async fn send(&self, slug: &str, outcome: PingOutcome) -> ReportResult<()>;

    /// 发送成功信号
    async fn send_success(&self, slug: &str) -> ReportResult<()> {
        self.send(slug, PingOutcome::Success).await
    }

    /// 发送失败信号
    async fn send_failure(&self, slug: &str) -> ReportResult<()> {
        self.send(slug, PingOutcome::Failure).await
    }
}

/// healthchecks.io 上报器实现
///
/// 只持有只读配置和 `reqwest::Client`，可以克隆后在多个任务间共享。
#[derive(Clone)]
pub struct HealthchecksReporter {
    /// HTTP客户端
    client: Client,
    /// 上报配置
    config: HealthchecksConfig,
}

impl HealthchecksReporter {
    /// 创建新的上报器
    ///
    /// # 参数
    /// * `config` - healthchecks 配置
    /// * `timeout` - 单次请求超时时间
    ///
    /// # 返回
    /// * `ReportResult<Self>` - 上报器实例，ping key 不是合法路径段时返回 `InvalidPingKey`
    pub fn new(config: HealthchecksConfig, timeout: Duration) -> ReportResult<Self> {
        validate_ping_key(&config.ping_key)?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()?;

        Ok(Self { client, config })
    }

    /// 根据完整配置创建上报器
    pub fn from_config(config: &Config) -> ReportResult<Self> {
        Self::new(config.healthchecks.clone(), config.global.request_timeout())
    }

    /// 获取上报配置
    pub fn config(&self) -> &HealthchecksConfig {
        &self.config
    }

    /// 构建指定 slug 的 ping URL
    pub fn ping_url(&self, slug: &str, outcome: PingOutcome) -> String {
        ping_url(&self.config.ping_base_url, &self.config.ping_key, slug, outcome)
    }

    fn api_key(&self) -> ReportResult<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ReportError::MissingApiKey)
    }
}

#[async_trait]
impl HealthReporter for HealthchecksReporter {
    async fn ensure_check(&self, slug: &str) -> ReportResult<()> {
        validate_slug(slug)?;
        let api_key = self.api_key()?;

        let payload = CreateCheckPayload::new(
            slug,
            self.config.timeout_seconds,
            self.config.grace_seconds,
            api_key,
        );

        debug!(slug, url = %self.config.api_url, "创建或更新检查项");

        let response = self
            .client
            .post(&self.config.api_url)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED && status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(slug, status = status.as_u16(), response = %body, "创建检查项失败");
            return Err(ReportError::UnexpectedStatus {
                url: self.config.api_url.clone(),
                status: status.as_u16(),
            });
        }

        debug!(slug, status = status.as_u16(), "检查项已就绪");
        Ok(())
    }

    async fn send(&self, slug: &str, outcome: PingOutcome) -> ReportResult<()> {
        validate_slug(slug)?;
        info!(slug, %outcome, "发送ping");

        if self.config.create_new_checks {
            self.ensure_check(slug).await?;
        }

        // URL 中包含 ping key，不写入日志
        let url = self.ping_url(slug, outcome);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(slug, %outcome, status = status.as_u16(), response = %body, "收到ping响应");

        if !status.is_success() {
            warn!(slug, %outcome, status = status.as_u16(), "ping返回非成功状态码");
        }

        Ok(())
    }
}

/// 空的上报器实现（用于测试或禁用上报）
pub struct NoOpReporter;

#[async_trait]
impl HealthReporter for NoOpReporter {
    async fn ensure_check(&self, slug: &str) -> ReportResult<()> {
        debug!(slug, "上报已禁用，跳过创建检查项");
        Ok(())
    }

    async fn send(&self, slug: &str, outcome: PingOutcome) -> ReportResult<()> {
        debug!(slug, %outcome, "上报已禁用，跳过ping");
        Ok(())
    }
}

/// 根据配置创建上报器
///
/// `healthchecks.enabled = false` 时返回 [`NoOpReporter`]。
pub fn build_reporter(config: &Config) -> ReportResult<Box<dyn HealthReporter>> {
    if config.healthchecks.enabled {
        Ok(Box::new(HealthchecksReporter::from_config(config)?))
    } else {
        info!("healthchecks 上报已禁用");
        Ok(Box::new(NoOpReporter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlobalConfig;

    fn create_test_config() -> HealthchecksConfig {
        let mut config = HealthchecksConfig::new("abc123");
        config.api_key = Some("secret".to_string());
        config
    }

    #[test]
    fn test_reporter_creation() {
        let reporter = HealthchecksReporter::new(create_test_config(), Duration::from_secs(10));
        assert!(reporter.is_ok());
    }

    #[test]
    fn test_reporter_rejects_invalid_ping_key() {
        for key in ["", "abc/def", "abc?x=1", "..", "abc#frag"] {
            let mut config = create_test_config();
            config.ping_key = key.to_string();
            let result = HealthchecksReporter::new(config, Duration::from_secs(10));
            assert!(
                matches!(result, Err(ReportError::InvalidPingKey)),
                "ping key {key:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_ping_url() {
        let reporter =
            HealthchecksReporter::new(create_test_config(), Duration::from_secs(10)).unwrap();

        assert_eq!(
            reporter.ping_url("nightly-backup", PingOutcome::Success),
            "https://hc-ping.com/abc123/nightly-backup"
        );
        assert_eq!(
            reporter.ping_url("nightly-backup", PingOutcome::Failure),
            "https://hc-ping.com/abc123/nightly-backup/fail"
        );
    }

    #[tokio::test]
    async fn test_ensure_check_without_api_key() {
        let mut config = create_test_config();
        config.api_key = None;
        let reporter = HealthchecksReporter::new(config, Duration::from_secs(10)).unwrap();

        // 缺少 API key 时不会发出请求
        let result = reporter.ensure_check("nightly-backup").await;
        assert!(matches!(result, Err(ReportError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_invalid_slug_rejected_before_request() {
        let reporter =
            HealthchecksReporter::new(create_test_config(), Duration::from_secs(10)).unwrap();

        assert!(matches!(
            reporter.send_success("").await,
            Err(ReportError::InvalidSlug(_))
        ));
        assert!(matches!(
            reporter.ensure_check("a/b").await,
            Err(ReportError::InvalidSlug(_))
        ));
        for slug in ["job?x=1", "job#frag", ".."] {
            assert!(matches!(
                reporter.send_failure(slug).await,
                Err(ReportError::InvalidSlug(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_noop_reporter() {
        let reporter = NoOpReporter;
        assert!(reporter.ensure_check("job").await.is_ok());
        assert!(reporter.send_success("job").await.is_ok());
        assert!(reporter.send_failure("job").await.is_ok());
    }

    #[tokio::test]
    async fn test_build_reporter_disabled() {
        let mut healthchecks = create_test_config();
        healthchecks.enabled = false;
        // 指向不可达地址，若未走空实现则会失败
        healthchecks.ping_base_url = "http://127.0.0.1:1".to_string();

        let config = Config {
            global: GlobalConfig::default(),
            healthchecks,
        };

        let reporter = build_reporter(&config).unwrap();
        assert!(reporter.send_success("job").await.is_ok());
    }
}
