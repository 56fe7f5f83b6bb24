//! Plivo 短信通知发送器
//!
//! 通过 Plivo REST 接口发送短信告警

use crate::config::{Contact, PlivoConfig};
use crate::error::NotificationError;
use crate::notification::sender::NotificationSender;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, error, info};

/// Plivo 接口地址
const PLIVO_API_BASE: &str = "https://api.plivo.com/v1";

/// Plivo 短信发送器
pub struct PlivoSender {
    /// HTTP客户端
    client: Client,
    /// 接口地址
    base_url: String,
    auth_id: String,
    token: String,
    /// 发送方号码
    number: String,
}

impl PlivoSender {
    /// 创建新的 Plivo 发送器
    ///
    /// # 参数
    /// * `config` - Plivo 凭据
    ///
    /// # 返回
    /// * `Result<Self, NotificationError>` - 凭据不完整时返回配置错误
    pub fn new(config: &PlivoConfig) -> std::result::Result<Self, NotificationError> {
        if config.auth_id.trim().is_empty()
            || config.token.trim().is_empty()
            || config.number.trim().is_empty()
        {
            return Err(NotificationError::ConfigError(
                "Plivo 凭据不完整".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NotificationError::ConfigError(format!("创建HTTP客户端失败: {}", e)))?;

        Ok(Self {
            client,
            base_url: PLIVO_API_BASE.to_string(),
            auth_id: config.auth_id.clone(),
            token: config.token.clone(),
            number: config.number.clone(),
        })
    }

    /// 替换接口地址
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// 构建短信请求体
    fn build_message_body(&self, phone: &str, message: &str) -> Value {
        json!({
            "src": self.number,
            "dst": phone,
            "text": message,
        })
    }

    fn message_endpoint(&self) -> String {
        format!(
            "{}/Account/{}/Message/",
            self.base_url.trim_end_matches('/'),
            self.auth_id
        )
    }
}

#[async_trait]
impl NotificationSender for PlivoSender {
    async fn send(&self, contact: &Contact, message: &str) -> Result<()> {
        if !self.can_reach(contact) {
            return Err(NotificationError::SendError(format!(
                "联系人 {} 未配置手机号",
                contact.alias
            ))
            .into());
        }

        info!("发送短信给 {}", contact.alias);

        let response = self
            .client
            .post(self.message_endpoint())
            .basic_auth(&self.auth_id, Some(&self.token))
            .json(&self.build_message_body(&contact.phone, message))
            .send()
            .await
            .context("发送Plivo短信失败")?;

        if response.status().is_success() {
            debug!("Plivo短信发送成功: {}", contact.alias);
            Ok(())
        } else {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("Plivo短信发送失败: {} - {}", status, text);
            Err(NotificationError::SendError(format!("Plivo返回 {}", status)).into())
        }
    }

    fn provider(&self) -> &'static str {
        "plivo"
    }

    fn can_reach(&self, contact: &Contact) -> bool {
        !contact.phone.trim().is_empty()
    }
}
