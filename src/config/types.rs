//! 配置数据结构定义
//!
//! 定义应用程序的配置结构体和验证逻辑

use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// 主配置结构，包含全局配置、通知配置、监控目标和联系人
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 全局配置项
    #[serde(default)]
    pub global: GlobalConfig,
    /// 通知配置
    #[serde(default)]
    pub notifier: NotifierConfig,
    /// 监控目标列表（按配置顺序检测）
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
    /// 联系人列表
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

/// 全局配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlobalConfig {
    /// 调度周期（秒）
    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: u64,
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// 域名解析尝试次数
    #[serde(default = "default_resolve_attempts")]
    pub resolve_attempts: u32,
    /// 日志文件路径，不设置时输出到标准输出
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// 按模块覆盖日志级别，例如 `reqwest = "warn"`
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub log_modules: HashMap<String, String>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            tick_seconds: default_tick_seconds(),
            log_level: default_log_level(),
            resolve_attempts: default_resolve_attempts(),
            log_file: None,
            log_modules: HashMap::new(),
        }
    }
}

/// 通知提供方
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotifierProvider {
    /// 只写日志
    #[default]
    Log,
    /// Plivo 短信
    Plivo,
}

/// 通知配置结构
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct NotifierConfig {
    /// 使用的通知提供方
    #[serde(default)]
    pub provider: NotifierProvider,
    /// Plivo 凭据
    pub plivo: Option<PlivoConfig>,
}

/// Plivo 短信凭据
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PlivoConfig {
    #[serde(default)]
    pub auth_id: String,
    #[serde(default)]
    pub token: String,
    /// 发送方号码
    #[serde(default)]
    pub number: String,
}

/// 监控目标配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetConfig {
    /// 目标名称（唯一）
    pub alias: String,
    /// 目标URL，留空表示占位目标
    #[serde(default)]
    pub url: String,
    /// 检测间隔（调度周期数）
    #[serde(default = "default_interval")]
    pub interval: u64,
    /// 告警类别位掩码
    #[serde(default = "default_class")]
    pub class: u32,
    /// 触发告警前需要的连续异常次数
    #[serde(default = "default_threshold")]
    pub threshold: u32,
    /// 错误级断言
    #[serde(default)]
    pub errors: Vec<AssertionConfig>,
    /// 警告级断言
    #[serde(default)]
    pub warnings: Vec<AssertionConfig>,
}

/// 断言配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AssertionConfig {
    pub alias: String,
    /// 正则表达式，为空时断言不生效
    #[serde(default)]
    pub regex: String,
    /// 匹配到即失败
    #[serde(default)]
    pub exists: bool,
    /// 匹配不到即失败
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub max: i64,
    #[serde(default)]
    pub min: i64,
}

/// 联系人
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Contact {
    pub alias: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    /// 关注的告警类别位掩码
    #[serde(default)]
    pub class_mask: u32,
}

impl Contact {
    /// 判断联系人是否订阅了该类别的告警
    pub fn wants(&self, class: u32) -> bool {
        self.class_mask & class != 0
    }
}

// 默认值函数
fn default_tick_seconds() -> u64 {
    60
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_resolve_attempts() -> u32 {
    3
}
fn default_interval() -> u64 {
    1
}
fn default_class() -> u32 {
    1
}
fn default_threshold() -> u32 {
    1
}

/// 检查目标URL是否可用：留空视为占位目标，否则必须是带主机名的 http(s) 地址
pub fn is_valid_target_url(url: &str) -> bool {
    if url.trim().is_empty() {
        return true;
    }
    match Url::parse(url) {
        Ok(parsed) => {
            matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some()
        }
        Err(_) => false,
    }
}

/// 配置验证函数
///
/// 正则表达式的编译检查在构建运行时目标时完成，这里只做结构性验证。
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    // 验证全局配置
    if config.global.tick_seconds == 0 {
        return Err("调度周期不能为0".to_string());
    }

    if config.global.resolve_attempts == 0 {
        return Err("域名解析尝试次数不能为0".to_string());
    }

    let valid_log_levels = ["debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&config.global.log_level.as_str()) {
        return Err(format!(
            "无效的日志级别: {}，支持的级别: {:?}",
            config.global.log_level, valid_log_levels
        ));
    }

    for (module, level) in &config.global.log_modules {
        if !valid_log_levels.contains(&level.as_str()) {
            return Err(format!("模块 {} 的日志级别无效: {}", module, level));
        }
    }

    // 验证通知凭据
    if config.notifier.provider == NotifierProvider::Plivo {
        match &config.notifier.plivo {
            Some(plivo)
                if !plivo.auth_id.trim().is_empty()
                    && !plivo.token.trim().is_empty()
                    && !plivo.number.trim().is_empty() => {}
            _ => return Err("使用plivo通知时必须配置 auth_id、token 和 number".to_string()),
        }
    }

    // 验证监控目标
    if config.targets.is_empty() {
        return Err("至少需要配置一个监控目标".to_string());
    }

    let mut aliases = HashSet::new();
    for target in &config.targets {
        if target.alias.trim().is_empty() {
            return Err("目标名称不能为空".to_string());
        }

        if !aliases.insert(target.alias.as_str()) {
            return Err(format!("目标名称重复: {}", target.alias));
        }

        if !is_valid_target_url(&target.url) {
            return Err(format!("目标 {} 的URL格式无效", target.alias));
        }

        if target.interval == 0 {
            return Err(format!("目标 {} 的检测间隔不能为0", target.alias));
        }

        if target.threshold == 0 {
            return Err(format!("目标 {} 的告警阈值不能为0", target.alias));
        }
    }

    // 验证联系人
    if config.contacts.is_empty() {
        return Err("至少需要配置一个联系人".to_string());
    }

    for contact in &config.contacts {
        if contact.alias.trim().is_empty() {
            return Err("联系人名称不能为空".to_string());
        }
    }

    Ok(())
}
