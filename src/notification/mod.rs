//! 通知模块
//!
//! 提供告警格式化、联系人路由和短信通知功能

pub mod alert;
pub mod dispatcher;
pub mod plivo;
pub mod sender;

// 重新导出主要类型
pub use alert::Alert;
pub use dispatcher::{AlertDispatcher, DispatchSummary};
pub use plivo::PlivoSender;
pub use sender::{create_sender, LogSender, NoOpSender, NotificationSender};
