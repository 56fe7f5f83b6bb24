//! 域名解析器
//!
//! 对目标主机做DNS解析，解析出错时原样重试，用于过滤偶发的DNS抖动

use crate::error::ResolutionError;
use async_trait::async_trait;
use reqwest::Url;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

/// 主机地址查询接口
#[async_trait]
pub trait HostLookup: Send + Sync {
    /// 查询主机地址
    async fn lookup(&self, host: &str, port: u16) -> std::io::Result<Vec<SocketAddr>>;
}

/// 使用系统解析器的查询实现
pub struct SystemLookup;

#[async_trait]
impl HostLookup for SystemLookup {
    async fn lookup(&self, host: &str, port: u16) -> std::io::Result<Vec<SocketAddr>> {
        Ok(tokio::net::lookup_host((host, port)).await?.collect())
    }
}

/// 域名解析器
#[derive(Clone)]
pub struct Resolver {
    lookup: Arc<dyn HostLookup>,
}

impl Resolver {
    /// 创建使用系统解析器的实例
    pub fn system() -> Self {
        Self::with_lookup(Arc::new(SystemLookup))
    }

    /// 使用自定义查询实现
    pub fn with_lookup(lookup: Arc<dyn HostLookup>) -> Self {
        Self { lookup }
    }

    /// 解析URL中的主机
    ///
    /// 查询出错时最多尝试 `attempts` 次，没有退避；查询成功但没有地址时立即失败。
    ///
    /// # 参数
    /// * `url` - 目标URL
    /// * `attempts` - 最大尝试次数
    ///
    /// # 返回
    /// * `Result<(), ResolutionError>` - 解析结果
    pub async fn resolve(&self, url: &str, attempts: u32) -> Result<(), ResolutionError> {
        let (host, port) = split_host(url).ok_or_else(|| ResolutionError::MissingHost {
            url: url.to_string(),
        })?;

        let attempts = attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.lookup.lookup(&host, port).await {
                Ok(addrs) if addrs.is_empty() => {
                    return Err(ResolutionError::NoAddresses {
                        url: url.to_string(),
                    });
                }
                Ok(addrs) => {
                    debug!("解析成功: {} -> {:?}", host, addrs);
                    return Ok(());
                }
                Err(source) if attempt >= attempts => {
                    return Err(ResolutionError::Lookup {
                        url: url.to_string(),
                        attempts,
                        source,
                    });
                }
                Err(e) => {
                    debug!("解析失败，重试 ({}/{}): {} - {}", attempt, attempts, host, e);
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::system()
    }
}

/// 从URL中取出主机名和端口
fn split_host(url: &str) -> Option<(String, u16)> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    let host = host.trim_start_matches('[').trim_end_matches(']').to_string();
    let port = parsed.port_or_known_default().unwrap_or(80);
    Some((host, port))
}
