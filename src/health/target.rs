//! 运行时监控目标
//!
//! 由配置编译而来，加载后只读

use crate::config::{AssertionConfig, TargetConfig};
use crate::error::ConfigError;
use crate::health::assertion::{evaluate_all, Assertion};
use crate::health::outcome::Outcome;

/// 监控目标
#[derive(Debug, Clone)]
pub struct Target {
    pub alias: String,
    pub url: String,
    /// 检测间隔（调度周期数）
    pub interval: u64,
    /// 告警类别位掩码
    pub class: u32,
    /// 触发告警前需要的连续异常次数
    pub threshold: u32,
    pub errors: Vec<Assertion>,
    pub warnings: Vec<Assertion>,
}

impl Target {
    /// 从配置编译目标
    ///
    /// URL无效、检测间隔或告警阈值为0、任一断言正则无效都会失败
    pub fn compile(config: &TargetConfig) -> Result<Self, ConfigError> {
        let compile_all = |assertions: &[AssertionConfig]| {
            assertions
                .iter()
                .map(|assertion| {
                    Assertion::compile(assertion).map_err(|source| ConfigError::InvalidRegex {
                        target: config.alias.clone(),
                        assertion: assertion.alias.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        };

        if !crate::config::types::is_valid_target_url(&config.url) {
            return Err(ConfigError::InvalidUrl {
                target: config.alias.clone(),
                url: config.url.clone(),
            });
        }

        if config.interval == 0 {
            return Err(ConfigError::ValidationError(format!(
                "目标 {} 的检测间隔不能为0",
                config.alias
            )));
        }

        if config.threshold == 0 {
            return Err(ConfigError::ValidationError(format!(
                "目标 {} 的告警阈值不能为0",
                config.alias
            )));
        }

        Ok(Self {
            alias: config.alias.clone(),
            url: config.url.clone(),
            interval: config.interval,
            class: config.class,
            threshold: config.threshold,
            errors: compile_all(&config.errors)?,
            warnings: compile_all(&config.warnings)?,
        })
    }

    /// 是否有可检测的URL
    pub fn has_url(&self) -> bool {
        !self.url.trim().is_empty()
    }

    /// 判断目标在给定周期是否需要检测，第0个周期检测所有目标
    pub fn is_due(&self, tick: u64) -> bool {
        tick == 0 || tick % self.interval == 0
    }

    /// 根据页面内容分类：先求值所有错误断言，全部通过后才求值警告断言
    pub fn classify(&self, body: &str) -> Outcome {
        if let Err(failure) = evaluate_all(&self.errors, body) {
            return Outcome::Error(failure.to_string());
        }
        match evaluate_all(&self.warnings, body) {
            Err(failure) => Outcome::Warning(failure.to_string()),
            Ok(()) => Outcome::Ok,
        }
    }
}

/// 编译整个目标列表
pub fn compile_targets(configs: &[TargetConfig]) -> Result<Vec<Target>, ConfigError> {
    configs.iter().map(Target::compile).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_config() -> TargetConfig {
        TargetConfig {
            alias: "status".to_string(),
            url: "https://example.com/status".to_string(),
            interval: 3,
            class: 1,
            threshold: 1,
            errors: vec![AssertionConfig {
                alias: "down".to_string(),
                regex: "DOWN".to_string(),
                exists: true,
                ..Default::default()
            }],
            warnings: vec![AssertionConfig {
                alias: "queue".to_string(),
                regex: r"queue=(\d+)".to_string(),
                max: 10,
                ..Default::default()
            }],
        }
    }

    #[test]
    fn test_classify_errors_before_warnings() {
        let target = Target::compile(&target_config()).unwrap();

        assert_eq!(
            target.classify("DOWN queue=50"),
            Outcome::Error("down: exists: DOWN".to_string())
        );
        assert_eq!(
            target.classify("UP queue=50"),
            Outcome::Warning("queue value 50 exceeds limit 10".to_string())
        );
        assert_eq!(target.classify("UP queue=5"), Outcome::Ok);
    }

    #[test]
    fn test_classify_empty_body_is_error() {
        let target = Target::compile(&target_config()).unwrap();
        assert!(matches!(target.classify(""), Outcome::Error(_)));
    }

    #[test]
    fn test_is_due() {
        let target = Target::compile(&target_config()).unwrap();
        assert!(target.is_due(0));
        assert!(!target.is_due(1));
        assert!(!target.is_due(2));
        assert!(target.is_due(3));
        assert!(target.is_due(6));
    }

    #[test]
    fn test_invalid_regex_is_config_error() {
        let mut config = target_config();
        config.warnings[0].regex = "[".to_string();

        let err = Target::compile(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegex { ref assertion, .. } if assertion == "queue"));
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let mut config = target_config();
        config.url = "ftp//broken".to_string();
        assert!(matches!(
            Target::compile(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let mut config = target_config();
        config.interval = 0;
        assert!(matches!(
            Target::compile(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let mut config = target_config();
        config.threshold = 0;
        assert!(matches!(
            compile_targets(&[target_config(), config]),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
