//! 健康上报模块
//!
//! 提供 healthchecks.io 检查项创建和 ping 上报功能

pub mod client;
pub mod payload;

// 重新导出主要类型
pub use client::{build_reporter, HealthReporter, HealthchecksReporter, NoOpReporter};
pub use payload::{CreateCheckPayload, PingOutcome};
