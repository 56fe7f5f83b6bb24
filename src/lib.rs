//! Page Vitals - 网页内容断言监控工具
//!
//! 周期性抓取网页，用正则断言检查页面内容，支持：
//! - 带重试的域名解析
//! - 存在/缺失/数值范围三种断言
//! - 连续异常阈值（滞回）告警
//! - 按类别位掩码把告警路由给联系人
//! - 结构化日志记录

pub mod cli;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod notification;

// 重新导出主要类型
pub use config::{Config, Contact, GlobalConfig, TargetConfig};
pub use error::PageVitalsError;
pub use health::{CheckScheduler, Outcome, Target};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
