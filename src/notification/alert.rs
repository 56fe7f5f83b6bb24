//! 告警消息

use crate::health::tracker::AlertKind;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// 一条待发送的告警
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    /// 告警级别
    pub kind: AlertKind,
    /// 目标名称
    pub target: String,
    /// 失败详情
    pub detail: String,
    /// 触发时间
    pub raised_at: DateTime<Utc>,
}

impl Alert {
    pub fn new(kind: AlertKind, target: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            detail: detail.into(),
            raised_at: Utc::now(),
        }
    }

    /// 发送给联系人的消息文本
    pub fn message(&self) -> String {
        match self.kind {
            AlertKind::Error => format!("Error on '{}'! {}", self.target, self.detail),
            AlertKind::Warning => format!("Warning on '{}': {}", self.target, self.detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_message_format() {
        let alert = Alert::new(AlertKind::Error, "status page", "down: exists: DOWN");
        assert_eq!(alert.message(), "Error on 'status page'! down: exists: DOWN");

        let alert = Alert::new(AlertKind::Warning, "api", "queue value 150 exceeds limit 100");
        assert_eq!(
            alert.message(),
            "Warning on 'api': queue value 150 exceeds limit 100"
        );
    }
}
