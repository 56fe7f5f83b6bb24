//! 目标检测器
//!
//! 组合域名解析、页面抓取和断言求值，为一个目标产出一次检测结果

use crate::health::fetcher::HttpFetcher;
use crate::health::outcome::Outcome;
use crate::health::resolver::Resolver;
use crate::health::target::Target;
use async_trait::async_trait;
use tracing::debug;

/// 默认的域名解析尝试次数
pub const DEFAULT_RESOLVE_ATTEMPTS: u32 = 3;

/// 检测器trait，定义单目标检测接口
#[async_trait]
pub trait PageChecker: Send + Sync {
    /// 检测一个目标
    ///
    /// # 参数
    /// * `target` - 监控目标
    ///
    /// # 返回
    /// * `Outcome` - 检测结果，所有错误都折叠进结果详情
    async fn check(&self, target: &Target) -> Outcome;
}

/// HTTP检测器实现
pub struct HttpPageChecker {
    resolver: Resolver,
    fetcher: HttpFetcher,
    resolve_attempts: u32,
}

impl HttpPageChecker {
    /// 创建新的HTTP检测器
    pub fn new(resolver: Resolver, fetcher: HttpFetcher, resolve_attempts: u32) -> Self {
        Self {
            resolver,
            fetcher,
            resolve_attempts,
        }
    }

    /// 使用系统解析器和默认HTTP客户端创建检测器
    pub fn with_defaults(resolve_attempts: u32) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            Resolver::system(),
            HttpFetcher::new()?,
            resolve_attempts,
        ))
    }
}

#[async_trait]
impl PageChecker for HttpPageChecker {
    async fn check(&self, target: &Target) -> Outcome {
        if !target.has_url() {
            debug!("目标 {} 未配置URL，跳过检测", target.alias);
            return Outcome::Ok;
        }

        if let Err(e) = self
            .resolver
            .resolve(&target.url, self.resolve_attempts)
            .await
        {
            return Outcome::Error(e.to_string());
        }

        let body = match self.fetcher.fetch(&target.url).await {
            Ok(body) => body,
            Err(e) => return Outcome::Error(e.to_string()),
        };

        target.classify(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AssertionConfig, TargetConfig};
    use crate::health::resolver::HostLookup;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    /// 总是失败的解析器
    struct DeadDns {
        calls: AtomicU32,
    }

    #[async_trait]
    impl HostLookup for DeadDns {
        async fn lookup(&self, _host: &str, _port: u16) -> std::io::Result<Vec<SocketAddr>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(std::io::Error::other("SERVFAIL"))
        }
    }

    fn target(url: &str) -> Target {
        Target::compile(&TargetConfig {
            alias: "page".to_string(),
            url: url.to_string(),
            interval: 1,
            class: 1,
            threshold: 1,
            errors: vec![AssertionConfig {
                alias: "down".to_string(),
                regex: "DOWN".to_string(),
                exists: true,
                ..Default::default()
            }],
            warnings: vec![AssertionConfig {
                alias: "slow".to_string(),
                regex: "SLOW".to_string(),
                exists: true,
                ..Default::default()
            }],
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_check_blank_url_is_ok() {
        let checker = HttpPageChecker::with_defaults(DEFAULT_RESOLVE_ATTEMPTS).unwrap();
        assert_eq!(checker.check(&target("")).await, Outcome::Ok);
    }

    #[tokio::test]
    async fn test_check_resolution_failure_short_circuits() {
        let dns = Arc::new(DeadDns {
            calls: AtomicU32::new(0),
        });
        let checker = HttpPageChecker::new(
            Resolver::with_lookup(dns.clone()),
            HttpFetcher::new().unwrap(),
            DEFAULT_RESOLVE_ATTEMPTS,
        );

        let outcome = checker.check(&target("http://status.example.com/")).await;
        assert!(matches!(outcome, Outcome::Error(ref detail) if detail.contains("lookup failed")));
        assert_eq!(dns.calls.load(Ordering::SeqCst), DEFAULT_RESOLVE_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_check_classifies_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/down")
            .with_body("DOWN and SLOW")
            .create_async()
            .await;
        server
            .mock("GET", "/slow")
            .with_body("SLOW")
            .create_async()
            .await;
        server
            .mock("GET", "/fine")
            .with_body("fine")
            .create_async()
            .await;

        let checker = HttpPageChecker::with_defaults(DEFAULT_RESOLVE_ATTEMPTS).unwrap();

        let outcome = checker.check(&target(&format!("{}/down", server.url()))).await;
        assert_eq!(outcome, Outcome::Error("down: exists: DOWN".to_string()));

        let outcome = checker.check(&target(&format!("{}/slow", server.url()))).await;
        assert_eq!(outcome, Outcome::Warning("slow: exists: SLOW".to_string()));

        let outcome = checker.check(&target(&format!("{}/fine", server.url()))).await;
        assert_eq!(outcome, Outcome::Ok);
    }

    #[tokio::test]
    async fn test_check_fetch_failure_is_error() {
        let checker = HttpPageChecker::with_defaults(DEFAULT_RESOLVE_ATTEMPTS).unwrap();
        let outcome = checker.check(&target("http://127.0.0.1:1/")).await;
        assert!(matches!(outcome, Outcome::Error(_)));
    }
}
