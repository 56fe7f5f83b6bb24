//! 页面抓取器
//!
//! 单次GET请求，完整读取响应体。目标页面假定很小，不做流式处理。

use crate::error::FetchError;
use reqwest::Client;
use tracing::debug;

/// HTTP页面抓取器
#[derive(Clone)]
pub struct HttpFetcher {
    /// HTTP客户端
    client: Client,
}

impl HttpFetcher {
    /// 创建新的抓取器
    ///
    /// 不设置请求超时，重定向沿用客户端默认策略
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()?;

        Ok(Self { client })
    }

    /// 使用已有客户端
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// 抓取页面内容
    ///
    /// 不检查状态码，错误页面的内容同样交给断言判断
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        debug!("收到响应: {} -> {}", url, response.status());

        response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }
}
