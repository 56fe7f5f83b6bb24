//! Page Vitals 主程序入口
//!
//! 网页内容断言监控工具

use anyhow::{Context, Result};
use clap::Parser;
use page_vitals::cli::args::{Args, Commands};
use page_vitals::cli::commands::{
    AlertCommand, CheckCommand, Command, StartCommand, ValidateCommand, VersionCommand,
};
use page_vitals::config::{ConfigLoader, TomlConfigLoader};
use page_vitals::logging::{setup_logging, LogConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志系统
    let mut log_config = configured_logging(&args).await;
    if let Some(level) = args.log_level.clone() {
        log_config.level = level.into();
    }
    log_config.json_format = args.json_logs;

    setup_logging(&log_config).context("初始化日志系统失败")?;

    info!("Page Vitals v{} 启动", page_vitals::VERSION);

    // 执行命令
    if let Err(e) = execute_command(&args).await {
        error!("命令执行失败: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// 读取配置文件中的日志设置，配置不可用时输出 info 级别到标准输出
///
/// 此时日志系统尚未初始化，加载失败的原因会在命令执行时再次报告
async fn configured_logging(args: &Args) -> LogConfig {
    if matches!(args.command, Commands::Version { .. }) {
        return LogConfig::default();
    }

    TomlConfigLoader::new(true)
        .load_from_file(args.get_config_path())
        .await
        .map(|config| LogConfig::from_global(&config.global))
        .unwrap_or_default()
}

/// 执行CLI命令
async fn execute_command(args: &Args) -> Result<()> {
    let command: Box<dyn Command> = match &args.command {
        Commands::Start => Box::new(StartCommand),
        Commands::Check { .. } => Box::new(CheckCommand),
        Commands::Alert { .. } => Box::new(AlertCommand),
        Commands::Validate { .. } => Box::new(ValidateCommand),
        Commands::Version { .. } => Box::new(VersionCommand),
    };

    command.execute(args).await.map_err(|e| anyhow::anyhow!(e))
}
