//! 通知发送器模块
//!
//! 定义通知发送的trait和基础实现

use crate::config::{Contact, NotifierConfig, NotifierProvider};
use crate::error::NotificationError;
use crate::notification::plivo::PlivoSender;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// 通知发送器trait
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// 向一个联系人发送消息
    ///
    /// # 参数
    /// * `contact` - 联系人
    /// * `message` - 完整的消息文本
    ///
    /// # 返回
    /// * `Result<()>` - 发送结果
    async fn send(&self, contact: &Contact, message: &str) -> Result<()>;

    /// 通知提供方名称
    fn provider(&self) -> &'static str;

    /// 该发送器能否联系到此联系人（例如短信需要手机号）
    fn can_reach(&self, _contact: &Contact) -> bool {
        true
    }
}

/// 只写日志的通知发送器
pub struct LogSender;

#[async_trait]
impl NotificationSender for LogSender {
    async fn send(&self, contact: &Contact, message: &str) -> Result<()> {
        warn!(contact = %contact.alias, "告警: {}", message);
        Ok(())
    }

    fn provider(&self) -> &'static str {
        "log"
    }
}

/// 空的通知发送器实现（用于测试或禁用通知）
pub struct NoOpSender;

#[async_trait]
impl NotificationSender for NoOpSender {
    async fn send(&self, _contact: &Contact, _message: &str) -> Result<()> {
        Ok(())
    }

    fn provider(&self) -> &'static str {
        "noop"
    }
}

/// 根据配置创建通知发送器
pub fn create_sender(
    config: &NotifierConfig,
) -> std::result::Result<Arc<dyn NotificationSender>, NotificationError> {
    match config.provider {
        NotifierProvider::Log => Ok(Arc::new(LogSender)),
        NotifierProvider::Plivo => {
            let plivo = config.plivo.as_ref().ok_or_else(|| {
                NotificationError::ConfigError("缺少 [notifier.plivo] 配置".to_string())
            })?;
            Ok(Arc::new(PlivoSender::new(plivo)?))
        }
    }
}
