//! 检测调度器模块
//!
//! 固定周期触发一次顺序检测：按配置顺序逐个检测到期的目标，
//! 结果交给滞回状态机，需要告警时交给分发器。

use crate::config::{validate_config, Config};
use crate::error::{ConfigError, Result};
use crate::health::checker::{HttpPageChecker, PageChecker};
use crate::health::outcome::Outcome;
use crate::health::target::{compile_targets, Target};
use crate::health::tracker::{AlertKind, HysteresisTracker, TargetState};
use crate::notification::{create_sender, Alert, AlertDispatcher, DispatchSummary};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// 单个目标在一次检测中的记录
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    /// 目标名称
    pub alias: String,
    /// 检测结果
    pub outcome: Outcome,
    /// 本次触发的告警
    pub alert: Option<AlertKind>,
    /// 告警发送统计
    pub delivery: Option<DispatchSummary>,
}

/// 一次检测的汇总
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    /// 本次检测的周期序号
    pub tick: u64,
    /// 被检测的目标，按配置顺序
    pub targets: Vec<TargetReport>,
}

impl SweepReport {
    /// 本次触发的告警数量
    pub fn alerts(&self) -> usize {
        self.targets.iter().filter(|t| t.alert.is_some()).count()
    }
}

/// 检测调度器
pub struct CheckScheduler {
    /// 监控目标，加载后只读
    targets: Vec<Target>,
    /// 检测器
    checker: Arc<dyn PageChecker>,
    /// 告警分发器
    dispatcher: AlertDispatcher,
    /// 告警状态，与 `targets` 按位置对应
    tracker: HysteresisTracker,
    /// 已完成的检测次数
    tick: u64,
    /// 调度周期
    tick_interval: Duration,
}

impl CheckScheduler {
    /// 创建新的调度器
    ///
    /// # 参数
    /// * `targets` - 监控目标
    /// * `checker` - 检测器
    /// * `dispatcher` - 告警分发器
    /// * `tick_interval` - 调度周期
    pub fn new(
        targets: Vec<Target>,
        checker: Arc<dyn PageChecker>,
        dispatcher: AlertDispatcher,
        tick_interval: Duration,
    ) -> Self {
        let tracker = HysteresisTracker::new(targets.len());
        Self {
            targets,
            checker,
            dispatcher,
            tracker,
            tick: 0,
            tick_interval,
        }
    }

    /// 根据配置构建调度器：验证配置、编译断言、创建通知发送器和HTTP检测器
    pub fn from_config(config: &Config) -> Result<Self> {
        validate_config(config).map_err(ConfigError::ValidationError)?;
        let targets = compile_targets(&config.targets)?;
        let sender = create_sender(&config.notifier)?;
        debug!("通知方式: {}", sender.provider());
        let checker = HttpPageChecker::with_defaults(config.global.resolve_attempts)
            .map_err(|e| anyhow::anyhow!("创建HTTP客户端失败: {}", e))?;

        Ok(Self::new(
            targets,
            Arc::new(checker),
            AlertDispatcher::new(config.contacts.clone(), sender),
            Duration::from_secs(config.global.tick_seconds),
        ))
    }

    /// 监控目标
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// 查询目标的告警状态
    pub fn state(&self, index: usize) -> Option<&TargetState> {
        self.tracker.state(index)
    }

    /// 下一次检测的周期序号
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// 执行一次完整检测
    ///
    /// 目标按配置顺序逐个检测，一个目标的失败不会影响其他目标
    pub async fn run_cycle(&mut self) -> SweepReport {
        let tick = self.tick;
        debug!("开始第 {} 次检测", tick);

        let mut reports = Vec::new();
        for (index, target) in self.targets.iter().enumerate() {
            if !target.is_due(tick) {
                continue;
            }

            let outcome = self.checker.check(target).await;
            match &outcome {
                Outcome::Ok => debug!("目标检测正常: {}", target.alias),
                other => warn!("目标检测异常: {} - {}", target.alias, other),
            }

            let alert = self.tracker.observe(index, &outcome, target.threshold);
            let delivery = match (alert, outcome.detail()) {
                (Some(kind), Some(detail)) => {
                    let alert = Alert::new(kind, &target.alias, detail);
                    warn!("触发告警: {}", alert.message());
                    Some(self.dispatcher.dispatch(&alert, target.class).await)
                }
                _ => None,
            };

            reports.push(TargetReport {
                alias: target.alias.clone(),
                outcome,
                alert,
                delivery,
            });
        }

        self.tick = self.tick.wrapping_add(1);

        let report = SweepReport {
            tick,
            targets: reports,
        };
        info!(
            "第 {} 次检测完成，检测目标 {} 个，告警 {} 条",
            tick,
            report.targets.len(),
            report.alerts()
        );
        report
    }

    /// 向指定联系人发送手动消息，不读写告警状态
    ///
    /// # 返回
    /// * `bool` - 是否找到该联系人
    pub async fn send_contact_alert(&self, alias: &str, message: &str) -> bool {
        self.dispatcher.send_to(alias, message).await
    }

    /// 周期运行直到收到关闭信号
    ///
    /// 第一次检测立即执行；关闭信号只打断周期之间的等待，不会中断正在进行的检测。
    /// 发送端全部关闭后不再监听关闭信号，调度器继续运行。
    pub async fn run(&mut self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "启动检测调度器，目标数量: {}，周期: {:?}",
            self.targets.len(),
            self.tick_interval
        );

        let mut listening = true;
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                signal = shutdown.recv(), if listening => match signal {
                    Ok(()) | Err(RecvError::Lagged(_)) => {
                        info!("收到关闭信号，检测调度器已停止");
                        break;
                    }
                    Err(RecvError::Closed) => {
                        warn!("关闭信号通道已断开，检测调度器将持续运行");
                        listening = false;
                    }
                },
            }
        }
    }
}
