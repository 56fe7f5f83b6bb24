//! 日志系统模块
//!
//! 基于 tracing 的结构化日志：`log` 宏的输出经 LogTracer 转发，
//! 支持纯文本或JSON格式、输出到标准输出或文件、按模块覆盖级别

use crate::config::GlobalConfig;
use log::LevelFilter;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use tracing_log::LogTracer;
use tracing_subscriber::filter::{Directive, LevelFilter as TracingLevel};
use tracing_subscriber::fmt::{self, writer::BoxMakeWriter};
use tracing_subscriber::{prelude::*, registry, EnvFilter, Layer};

/// 全局只初始化一次，之后的调用返回第一次的结果
static LOGGING_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// 日志配置结构
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 日志级别
    pub level: LevelFilter,
    /// 日志文件路径（可选）
    pub file_path: Option<PathBuf>,
    /// 是否使用JSON格式
    pub json_format: bool,
    /// 模块级别日志控制
    pub module_levels: HashMap<String, LevelFilter>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
            file_path: None,
            json_format: false,
            module_levels: HashMap::new(),
        }
    }
}

impl LogConfig {
    /// 从配置文件的 `[global]` 段构建日志配置
    pub fn from_global(global: &GlobalConfig) -> Self {
        Self {
            level: parse_level(&global.log_level),
            file_path: global.log_file.clone(),
            json_format: false,
            module_levels: global
                .log_modules
                .iter()
                .map(|(module, level)| (module.clone(), parse_level(level)))
                .collect(),
        }
    }

    /// 全局级别和模块级别中最详细的一个，用作 `log` 宏的上限
    fn max_level(&self) -> LevelFilter {
        self.module_levels
            .values()
            .copied()
            .fold(self.level, std::cmp::Ord::max)
    }

    /// 构建过滤器：在 `RUST_LOG` 之上叠加全局级别和模块级别
    pub fn env_filter(&self) -> anyhow::Result<EnvFilter> {
        let mut filter = EnvFilter::from_default_env().add_directive(level_directive(self.level));

        for (module, level) in &self.module_levels {
            let directive: Directive = format!(
                "{}={}",
                module,
                level.as_str().to_ascii_lowercase()
            )
            .parse()
            .map_err(|e| anyhow::anyhow!("无效的模块日志级别 {}: {}", module, e))?;
            filter = filter.add_directive(directive);
        }

        Ok(filter)
    }
}

/// 把配置文件中的日志级别字符串转换为级别过滤器
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_ascii_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    }
}

fn level_directive(level: LevelFilter) -> Directive {
    let level = match level {
        LevelFilter::Off => TracingLevel::OFF,
        LevelFilter::Error => TracingLevel::ERROR,
        LevelFilter::Warn => TracingLevel::WARN,
        LevelFilter::Info => TracingLevel::INFO,
        LevelFilter::Debug => TracingLevel::DEBUG,
        LevelFilter::Trace => TracingLevel::TRACE,
    };
    Directive::from(level)
}

/// 初始化日志系统
///
/// # 参数
/// * `config` - 日志配置
///
/// # 返回
/// * `anyhow::Result<()>` - 初始化结果，重复调用返回第一次的结果
pub fn setup_logging(config: &LogConfig) -> anyhow::Result<()> {
    LOGGING_INIT
        .get_or_init(|| init_subscriber(config).map_err(|e| e.to_string()))
        .clone()
        .map_err(|e| anyhow::anyhow!("日志系统初始化失败: {}", e))
}

fn init_subscriber(config: &LogConfig) -> anyhow::Result<()> {
    let filter = config.env_filter()?;

    let (writer, ansi) = match &config.file_path {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow::anyhow!("打开日志文件失败 {}: {}", path.display(), e))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stdout), true),
    };

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_timer(fmt::time::ChronoUtc::rfc_3339())
        .with_target(true);
    let layer = if config.json_format {
        layer.json().with_file(true).with_line_number(true).boxed()
    } else {
        layer.boxed()
    };

    LogTracer::init_with_filter(config.max_level())
        .map_err(|e| anyhow::anyhow!("LogTracer初始化失败: {}", e))?;
    tracing::subscriber::set_global_default(registry().with(filter).with(layer))
        .map_err(|e| anyhow::anyhow!("tracing subscriber初始化失败: {}", e))?;

    tracing::debug!("日志配置: {:?}", config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level("WARN"), LevelFilter::Warn);
        assert_eq!(parse_level("error"), LevelFilter::Error);
        assert_eq!(parse_level("bogus"), LevelFilter::Info);
    }

    #[test]
    fn test_from_global_config() {
        let mut global = GlobalConfig {
            log_level: "warn".to_string(),
            log_file: Some(PathBuf::from("/var/log/page-vitals.log")),
            ..Default::default()
        };
        global
            .log_modules
            .insert("page_vitals::health".to_string(), "debug".to_string());

        let config = LogConfig::from_global(&global);
        assert_eq!(config.level, LevelFilter::Warn);
        assert_eq!(
            config.file_path.as_deref(),
            Some(std::path::Path::new("/var/log/page-vitals.log"))
        );
        assert_eq!(
            config.module_levels.get("page_vitals::health"),
            Some(&LevelFilter::Debug)
        );
        assert_eq!(config.max_level(), LevelFilter::Debug);
    }

    #[test]
    fn test_env_filter_with_module_levels() {
        let mut config = LogConfig::default();
        config
            .module_levels
            .insert("reqwest".to_string(), LevelFilter::Warn);
        config
            .module_levels
            .insert("page_vitals::notification".to_string(), LevelFilter::Trace);

        assert!(config.env_filter().is_ok());
    }

    #[test]
    fn test_setup_logging_only_once() {
        let config = LogConfig {
            level: LevelFilter::Debug,
            ..Default::default()
        };

        assert!(setup_logging(&config).is_ok());
        // 第二次调用不会重复初始化
        assert!(setup_logging(&LogConfig::default()).is_ok());
    }
}
