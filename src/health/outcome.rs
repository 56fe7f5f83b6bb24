//! 单次检测结果

use serde::Serialize;

/// 一个目标在一个检测周期内的结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "lowercase")]
pub enum Outcome {
    /// 正常
    Ok,
    /// 警告断言失败
    Warning(String),
    /// 解析、请求或错误断言失败
    Error(String),
}

impl Outcome {
    /// 判断结果是否正常
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }

    /// 失败详情
    pub fn detail(&self) -> Option<&str> {
        match self {
            Outcome::Ok => None,
            Outcome::Warning(detail) | Outcome::Error(detail) => Some(detail),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Ok => write!(f, "OK"),
            Outcome::Warning(detail) => write!(f, "WARNING: {}", detail),
            Outcome::Error(detail) => write!(f, "ERROR: {}", detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_json() {
        let json = serde_json::to_value(Outcome::Error("boom".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"status": "error", "detail": "boom"}));

        let json = serde_json::to_value(Outcome::Ok).unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok"}));
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(Outcome::Ok.to_string(), "OK");
        assert_eq!(
            Outcome::Warning("slow".to_string()).to_string(),
            "WARNING: slow"
        );
    }
}
