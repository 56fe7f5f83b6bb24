//! 错误处理模块
//!
//! 定义应用程序的统一错误类型

use thiserror::Error;

/// Page Vitals 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum PageVitalsError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 通知相关错误
    #[error("通知错误: {0}")]
    Notification(#[from] NotificationError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },

    /// 断言正则表达式无法编译
    #[error("目标 '{target}' 的断言 '{assertion}' 正则无效: {source}")]
    InvalidRegex {
        target: String,
        assertion: String,
        #[source]
        source: regex::Error,
    },

    /// 目标URL格式无效
    #[error("目标 '{target}' 的URL无效: {url}")]
    InvalidUrl { target: String, url: String },
}

/// 域名解析错误
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// URL无法解析出主机名
    #[error("Url \"{url}\" has no resolvable host")]
    MissingHost { url: String },

    /// 解析请求失败（重试耗尽后的最后一次错误）
    #[error("Url \"{url}\" lookup failed after {attempts} attempt(s): {source}")]
    Lookup {
        url: String,
        attempts: u32,
        #[source]
        source: std::io::Error,
    },

    /// 解析成功但没有返回任何地址
    #[error("Url \"{url}\" didn't resolve to any ip address")]
    NoAddresses { url: String },
}

/// 页面抓取错误
#[derive(Error, Debug)]
pub enum FetchError {
    /// 请求发送失败
    #[error("request to \"{url}\" failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 响应体无法读取
    #[error("body of \"{url}\" could not be read: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// 断言失败
///
/// 这是业务信号而不是系统错误，`Display` 的输出直接作为告警详情发送给联系人。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssertionFailure {
    /// 页面没有返回任何内容
    #[error("{alias}: no content returned")]
    NoContent { alias: String },

    /// 不应出现的内容出现了
    #[error("{alias}: exists: {regex}")]
    Exists { alias: String, regex: String },

    /// 应出现的内容缺失
    #[error("{alias}: missing '{regex}'")]
    Missing { alias: String, regex: String },

    /// 捕获值超过上限
    #[error("{alias} value {value} exceeds limit {max}")]
    ExceedsLimit { alias: String, value: i64, max: i64 },

    /// 捕获值低于下限
    #[error("{alias} value {value} below limit {min}")]
    BelowLimit { alias: String, value: i64, min: i64 },

    /// 范围模式下找不到匹配
    #[error("{alias}: regex error, could not parse, '{regex}'")]
    Unparseable { alias: String, regex: String },
}

/// 通知错误类型
#[derive(Error, Debug)]
pub enum NotificationError {
    /// 发送失败
    #[error("通知发送失败: {0}")]
    SendError(String),

    /// 配置错误
    #[error("通知配置错误: {0}")]
    ConfigError(String),
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, PageVitalsError>;
