//! 页面断言求值
//!
//! 断言有两种互斥的模式：
//! - 存在模式（`exists` 或 `missing` 被设置）：只关心正则能否匹配
//! - 范围模式：取第一个匹配的第一个捕获组，按整数与 `[min, max]` 比较

use crate::config::AssertionConfig;
use crate::error::AssertionFailure;
use regex::Regex;

/// 编译后的断言
#[derive(Debug, Clone)]
pub struct Assertion {
    /// 断言名称，出现在告警详情中
    pub alias: String,
    /// 为 `None` 时断言不生效
    regex: Option<Regex>,
    pub exists: bool,
    pub missing: bool,
    pub max: i64,
    pub min: i64,
}

impl Assertion {
    /// 从配置编译断言
    ///
    /// # 返回
    /// * `Result<Self, regex::Error>` - 正则无法编译时返回错误
    pub fn compile(config: &AssertionConfig) -> Result<Self, regex::Error> {
        let regex = if config.regex.is_empty() {
            None
        } else {
            Some(Regex::new(&config.regex)?)
        };

        Ok(Self {
            alias: config.alias.clone(),
            regex,
            exists: config.exists,
            missing: config.missing,
            max: config.max,
            min: config.min,
        })
    }

    /// 原始正则文本
    pub fn pattern(&self) -> &str {
        self.regex.as_ref().map(Regex::as_str).unwrap_or("")
    }

    /// 是否处于存在模式
    pub fn is_existence_mode(&self) -> bool {
        self.exists || self.missing
    }

    /// 对页面内容求值
    ///
    /// # 参数
    /// * `body` - 页面内容
    ///
    /// # 返回
    /// * `Result<(), AssertionFailure>` - 通过或失败原因
    pub fn evaluate(&self, body: &str) -> Result<(), AssertionFailure> {
        let Some(regex) = &self.regex else {
            return Ok(());
        };

        if body.is_empty() {
            return Err(AssertionFailure::NoContent {
                alias: self.alias.clone(),
            });
        }

        if self.is_existence_mode() {
            let found = regex.is_match(body);
            if self.exists && found {
                return Err(AssertionFailure::Exists {
                    alias: self.alias.clone(),
                    regex: regex.as_str().to_string(),
                });
            }
            if self.missing && !found {
                return Err(AssertionFailure::Missing {
                    alias: self.alias.clone(),
                    regex: regex.as_str().to_string(),
                });
            }
            return Ok(());
        }

        let Some(captures) = regex.captures(body) else {
            return Err(AssertionFailure::Unparseable {
                alias: self.alias.clone(),
                regex: regex.as_str().to_string(),
            });
        };

        // 捕获组缺失或不是整数时无法比较，直接放行
        let value = match captures.get(1).map(|m| m.as_str().parse::<i64>()) {
            Some(Ok(value)) => value,
            _ => return Ok(()),
        };

        if value > self.max {
            Err(AssertionFailure::ExceedsLimit {
                alias: self.alias.clone(),
                value,
                max: self.max,
            })
        } else if value < self.min {
            Err(AssertionFailure::BelowLimit {
                alias: self.alias.clone(),
                value,
                min: self.min,
            })
        } else {
            Ok(())
        }
    }
}

/// 按顺序求值一组断言，遇到第一个失败立即返回
pub fn evaluate_all(assertions: &[Assertion], body: &str) -> Result<(), AssertionFailure> {
    assertions
        .iter()
        .try_for_each(|assertion| assertion.evaluate(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(regex: &str, min: i64, max: i64) -> Assertion {
        Assertion::compile(&AssertionConfig {
            alias: "load".to_string(),
            regex: regex.to_string(),
            min,
            max,
            ..Default::default()
        })
        .unwrap()
    }

    fn existence(regex: &str, exists: bool, missing: bool) -> Assertion {
        Assertion::compile(&AssertionConfig {
            alias: "marker".to_string(),
            regex: regex.to_string(),
            exists,
            missing,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_empty_regex_is_noop() {
        let assertion = existence("", true, true);
        assert!(assertion.evaluate("").is_ok());
        assert!(assertion.evaluate("anything").is_ok());
    }

    #[test]
    fn test_range_within_limits() {
        let assertion = range(r"load=(-?\d+)", 0, 100);
        assert!(assertion.evaluate("load=50").is_ok());
        assert!(assertion.evaluate("load=0").is_ok());
        assert!(assertion.evaluate("load=100").is_ok());
    }

    #[test]
    fn test_range_exceeds_limit() {
        let assertion = range(r"load=(-?\d+)", 0, 100);
        let failure = assertion.evaluate("load=150").unwrap_err();
        assert_eq!(
            failure,
            AssertionFailure::ExceedsLimit {
                alias: "load".to_string(),
                value: 150,
                max: 100
            }
        );
        assert_eq!(failure.to_string(), "load value 150 exceeds limit 100");
    }

    #[test]
    fn test_range_below_limit() {
        let assertion = range(r"load=(-?\d+)", 0, 100);
        let failure = assertion.evaluate("load=-5").unwrap_err();
        assert!(matches!(failure, AssertionFailure::BelowLimit { value: -5, .. }));
        assert_eq!(failure.to_string(), "load value -5 below limit 0");
    }

    #[test]
    fn test_range_non_numeric_capture_passes() {
        let assertion = range(r"load=(\w+)", 0, 100);
        assert!(assertion.evaluate("load=high").is_ok());
    }

    #[test]
    fn test_range_without_capture_group_passes() {
        let assertion = range(r"load=\d+", 0, 100);
        assert!(assertion.evaluate("load=500").is_ok());
    }

    #[test]
    fn test_range_no_match_reports_parse_failure() {
        let assertion = range(r"load=(\d+)", 0, 100);
        let failure = assertion.evaluate("nothing here").unwrap_err();
        assert_eq!(
            failure.to_string(),
            r"load: regex error, could not parse, 'load=(\d+)'"
        );
    }

    #[test]
    fn test_exists_mode() {
        let assertion = existence("DOWN", true, false);
        let failure = assertion.evaluate("service is DOWN").unwrap_err();
        assert_eq!(failure.to_string(), "marker: exists: DOWN");
        assert!(assertion.evaluate("service is UP").is_ok());
    }

    #[test]
    fn test_missing_mode() {
        let assertion = existence("All systems go", false, true);
        let failure = assertion.evaluate("partial outage").unwrap_err();
        assert_eq!(failure.to_string(), "marker: missing 'All systems go'");
        assert!(assertion.evaluate("All systems go").is_ok());
    }

    #[test]
    fn test_empty_body_fails_regardless_of_mode() {
        for assertion in [
            existence("x", true, false),
            existence("x", false, true),
            existence("x", false, false),
            range(r"(\d+)", 0, 10),
        ] {
            let failure = assertion.evaluate("").unwrap_err();
            assert!(matches!(failure, AssertionFailure::NoContent { .. }));
            assert!(failure.to_string().ends_with("no content returned"));
        }
    }

    #[test]
    fn test_evaluate_all_first_failure_wins() {
        let assertions = vec![
            existence("OK", false, true),
            existence("DOWN", true, false),
            range(r"load=(\d+)", 0, 10),
        ];

        let failure = evaluate_all(&assertions, "OK DOWN load=99").unwrap_err();
        assert!(matches!(failure, AssertionFailure::Exists { .. }));

        assert!(evaluate_all(&assertions, "OK load=3").is_ok());
        assert!(evaluate_all(&[], "").is_ok());
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let config = AssertionConfig {
            alias: "broken".to_string(),
            regex: "(unclosed".to_string(),
            ..Default::default()
        };
        assert!(Assertion::compile(&config).is_err());
    }
}
