//! 告警滞回状态机
//!
//! 把每个周期的检测结果转换为告警事件：
//! - 连续异常次数达到阈值才告警，每次故障最多告警一次
//! - 任何一次正常结果立即清零，恢复不需要阈值
//! - 错误告警会覆盖已发出的警告告警，不单独发送“警告解除”

use crate::health::outcome::Outcome;
use serde::Serialize;

/// 告警级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Error,
    Warning,
}

/// 单个目标的告警状态
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetState {
    /// 已发出错误告警
    pub err_active: bool,
    /// 已发出警告告警
    pub warn_active: bool,
    /// 连续错误次数
    pub err_count: u32,
    /// 连续警告次数
    pub warn_count: u32,
}

impl TargetState {
    /// 是否处于完全健康状态
    pub fn is_healthy(&self) -> bool {
        *self == Self::default()
    }

    /// 根据本周期结果推进状态
    ///
    /// # 参数
    /// * `outcome` - 本周期检测结果
    /// * `threshold` - 告警阈值
    ///
    /// # 返回
    /// * `Option<AlertKind>` - 需要发送的告警
    pub fn advance(&mut self, outcome: &Outcome, threshold: u32) -> Option<AlertKind> {
        match outcome {
            Outcome::Ok => {
                *self = Self::default();
                None
            }
            Outcome::Error(_) => {
                if self.err_active {
                    return None;
                }
                self.err_count = self.err_count.saturating_add(1);
                if self.err_count >= threshold {
                    self.err_active = true;
                    self.warn_active = false;
                    Some(AlertKind::Error)
                } else {
                    None
                }
            }
            Outcome::Warning(_) => {
                if self.err_active || self.warn_active {
                    return None;
                }
                self.warn_count = self.warn_count.saturating_add(1);
                if self.warn_count >= threshold {
                    self.warn_active = true;
                    Some(AlertKind::Warning)
                } else {
                    None
                }
            }
        }
    }
}

/// 所有目标的告警状态，按目标在配置中的位置索引
#[derive(Debug, Clone, Default)]
pub struct HysteresisTracker {
    states: Vec<TargetState>,
}

impl HysteresisTracker {
    /// 为 `targets` 个目标创建全零状态
    pub fn new(targets: usize) -> Self {
        Self {
            states: vec![TargetState::default(); targets],
        }
    }

    /// 记录某个目标的检测结果
    pub fn observe(&mut self, index: usize, outcome: &Outcome, threshold: u32) -> Option<AlertKind> {
        self.states
            .get_mut(index)
            .and_then(|state| state.advance(outcome, threshold))
    }

    /// 查询某个目标的状态
    pub fn state(&self, index: usize) -> Option<&TargetState> {
        self.states.get(index)
    }

    /// 目标数量
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
