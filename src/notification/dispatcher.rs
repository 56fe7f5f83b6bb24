//! 告警分发
//!
//! 按类别位掩码挑选联系人，逐个发送，单个联系人失败不影响其他联系人

use crate::config::Contact;
use crate::notification::alert::Alert;
use crate::notification::sender::NotificationSender;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// 一次分发的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    /// 发送成功的联系人数
    pub delivered: usize,
    /// 发送失败的联系人数
    pub failed: usize,
    /// 发送器无法联系到而跳过的联系人数
    pub skipped: usize,
}

impl DispatchSummary {
    /// 匹配到的联系人总数
    pub fn recipients(&self) -> usize {
        self.delivered + self.failed + self.skipped
    }
}

/// 告警分发器
#[derive(Clone)]
pub struct AlertDispatcher {
    contacts: Arc<Vec<Contact>>,
    sender: Arc<dyn NotificationSender>,
}

impl AlertDispatcher {
    /// 创建新的分发器
    pub fn new(contacts: Vec<Contact>, sender: Arc<dyn NotificationSender>) -> Self {
        Self {
            contacts: Arc::new(contacts),
            sender,
        }
    }

    /// 所有联系人
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    /// 订阅了指定类别的联系人
    pub fn recipients(&self, class: u32) -> impl Iterator<Item = &Contact> {
        self.contacts.iter().filter(move |contact| contact.wants(class))
    }

    /// 把告警发送给所有订阅了该类别的联系人
    ///
    /// # 参数
    /// * `alert` - 告警
    /// * `class` - 目标的类别位掩码
    ///
    /// # 返回
    /// * `DispatchSummary` - 发送统计
    pub async fn dispatch(&self, alert: &Alert, class: u32) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        for contact in self.recipients(class) {
            if !self.sender.can_reach(contact) {
                warn!(
                    "联系人 {} 无法通过 {} 联系，跳过告警",
                    contact.alias,
                    self.sender.provider()
                );
                summary.skipped += 1;
                continue;
            }

            let message = alert.message();
            match self.sender.send(contact, &message).await {
                Ok(()) => {
                    info!("告警已发送: {} -> {}", alert.target, contact.alias);
                    summary.delivered += 1;
                }
                Err(e) => {
                    error!("告警发送失败: {} -> {} - {}", alert.target, contact.alias, e);
                    summary.failed += 1;
                }
            }
        }

        summary
    }

    /// 按联系人名称发送一条手动消息，不经过状态机
    ///
    /// # 返回
    /// * `bool` - 是否找到该联系人
    pub async fn send_to(&self, alias: &str, message: &str) -> bool {
        let Some(contact) = self.contacts.iter().find(|contact| contact.alias == alias) else {
            return false;
        };

        if !self.sender.can_reach(contact) {
            warn!(
                "联系人 {} 无法通过 {} 联系，手动消息未发送",
                contact.alias,
                self.sender.provider()
            );
            return true;
        }

        if let Err(e) = self.sender.send(contact, message).await {
            error!("手动消息发送失败: {} - {}", contact.alias, e);
        }
        true
    }
}
