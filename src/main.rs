use anyhow::Context;
use clap::Parser;
use event_checkin::utils::logger;
use event_checkin::{start_server, CliConfig, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(cli.verbose, cli.json_logs);

    tracing::info!("Starting event-checkin");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match ServerConfig::resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    start_server(config)
        .await
        .context("HTTP server stopped unexpectedly")?;

    Ok(())
}
