//! 页面检测模块
//!
//! 提供域名解析、页面抓取、断言求值、告警状态机和周期调度功能

pub mod assertion;
pub mod checker;
pub mod fetcher;
pub mod outcome;
pub mod resolver;
pub mod scheduler;
pub mod target;
pub mod tracker;

// 重新导出主要类型
pub use assertion::{evaluate_all, Assertion};
pub use checker::{HttpPageChecker, PageChecker, DEFAULT_RESOLVE_ATTEMPTS};
pub use fetcher::HttpFetcher;
pub use outcome::Outcome;
pub use resolver::{HostLookup, Resolver, SystemLookup};
pub use scheduler::{CheckScheduler, SweepReport, TargetReport};
pub use target::{compile_targets, Target};
pub use tracker::{AlertKind, HysteresisTracker, TargetState};
