//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::cli::args::{Args, Commands, OutputFormat};
use crate::config::{Config, ConfigLoader, TomlConfigLoader};
use crate::error::Result;
use crate::health::{CheckScheduler, SweepReport};
use async_trait::async_trait;
use tokio::signal;
use tokio::sync::broadcast;
use tracing::{error, info};

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    async fn execute(&self, args: &Args) -> Result<()>;
}

/// 加载并验证命令行指定（或默认位置）的配置文件
async fn load_config(args: &Args) -> Result<Config> {
    let loader = TomlConfigLoader::new(true);
    loader.load_from_file(args.get_config_path()).await
}

/// 版本命令
pub struct VersionCommand;

#[async_trait]
impl Command for VersionCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Version { format } = &args.command {
            match format {
                OutputFormat::Json => {
                    let version_info = serde_json::json!({
                        "name": crate::APP_NAME,
                        "version": crate::VERSION,
                        "description": crate::APP_DESCRIPTION
                    });
                    println!("{}", serde_json::to_string_pretty(&version_info)?);
                }
                OutputFormat::Text => {
                    println!("{} v{}", crate::APP_NAME, crate::VERSION);
                    println!("{}", crate::APP_DESCRIPTION);
                }
            }
        }
        Ok(())
    }
}

/// 验证命令
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Validate { verbose } = &args.command {
            println!("验证配置文件: {}", args.get_config_path().display());

            let config = load_config(args).await?;
            // 断言在这里编译一次，正则错误也算验证失败
            let scheduler = CheckScheduler::from_config(&config)?;

            if *verbose {
                self.print_details(&config, &scheduler);
            } else {
                println!("✓ 配置文件验证通过");
                println!(
                    "✓ 找到 {} 个监控目标，{} 个联系人",
                    config.targets.len(),
                    config.contacts.len()
                );
            }
        }
        Ok(())
    }
}

impl ValidateCommand {
    fn print_details(&self, config: &Config, scheduler: &CheckScheduler) {
        println!("配置验证通过！");
        println!("全局配置:");
        println!("  调度周期: {}秒", config.global.tick_seconds);
        println!("  日志级别: {}", config.global.log_level);
        println!("  解析尝试次数: {}", config.global.resolve_attempts);
        println!("  通知方式: {:?}", config.notifier.provider);

        println!("监控目标:");
        for (i, target) in scheduler.targets().iter().enumerate() {
            let url = if target.has_url() {
                target.url.as_str()
            } else {
                "(未配置)"
            };
            println!("  {}. {} ({})", i + 1, target.alias, url);
            println!(
                "     间隔: {}  类别: {:#b}  阈值: {}",
                target.interval, target.class, target.threshold
            );
            for assertion in &target.errors {
                println!("     [error] {}: {}", assertion.alias, assertion.pattern());
            }
            for assertion in &target.warnings {
                println!("     [warning] {}: {}", assertion.alias, assertion.pattern());
            }
        }

        println!("联系人:");
        for contact in &config.contacts {
            println!("  - {} (类别掩码: {:#b})", contact.alias, contact.class_mask);
        }
    }
}

/// 单次检测命令
pub struct CheckCommand;

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Check { format } = &args.command {
            let config = load_config(args).await?;
            let mut scheduler = CheckScheduler::from_config(&config)?;

            let report = scheduler.run_cycle().await;

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                OutputFormat::Text => self.print_text_results(&report),
            }
        }
        Ok(())
    }
}

impl CheckCommand {
    /// 打印文本格式结果
    fn print_text_results(&self, report: &SweepReport) {
        for target in &report.targets {
            let status_icon = if target.outcome.is_ok() { "✓" } else { "✗" };
            println!("{} {} - {}", status_icon, target.alias, target.outcome);

            if let (Some(kind), Some(delivery)) = (target.alert, target.delivery) {
                println!(
                    "  告警({:?}): 成功 {} 个联系人，失败 {} 个，跳过 {} 个",
                    kind, delivery.delivered, delivery.failed, delivery.skipped
                );
            }
        }
    }
}

/// 手动告警命令
pub struct AlertCommand;

#[async_trait]
impl Command for AlertCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Alert { contact, message } = &args.command {
            let config = load_config(args).await?;
            let scheduler = CheckScheduler::from_config(&config)?;

            if !scheduler.send_contact_alert(contact, message).await {
                return Err(anyhow::anyhow!("未找到联系人: {}", contact).into());
            }
            println!("✓ 已向 {} 发送告警", contact);
        }
        Ok(())
    }
}

/// 启动命令
pub struct StartCommand;

#[async_trait]
impl Command for StartCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        let config = load_config(args).await?;
        let mut scheduler = CheckScheduler::from_config(&config)?;

        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        // 设置Ctrl+C信号处理
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("收到中断信号，正在停止服务...");
                    let _ = shutdown_tx.send(());
                }
                Err(err) => {
                    // 保留发送端，调度器继续运行
                    error!("监听中断信号失败: {}", err);
                    std::future::pending::<()>().await;
                    drop(shutdown_tx);
                }
            }
        });

        scheduler.run(shutdown_rx).await;

        info!("服务已停止");
        Ok(())
    }
}
