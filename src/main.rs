use clap::Parser;
use subscription_rollup::core::ConfigProvider;
use subscription_rollup::utils::error::ErrorSeverity;
use subscription_rollup::utils::{logger, validation::Validate};
use subscription_rollup::{CliConfig, LocalStorage, RollupConfig, RollupEngine, RollupPipeline};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliConfig::parse();

    // 載入配置（TOML + 命令列覆蓋）
    let config = match args.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(config.log_level());
    } else {
        logger::init_cli_logger(args.verbose, config.log_level());
    }

    tracing::info!("Starting subscription-rollup");
    if args.verbose {
        tracing::debug!("CLI args: {:?}", args);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    display_config_summary(&config);

    let source = match config.subscription_source() {
        Ok(source) => source,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No output will be written");
        println!("Would read subscriptions from {}", source.describe());
        println!(
            "Would write {} to {}",
            config.output_formats().join(", "),
            config.output_path()
        );
        return Ok(());
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = RollupPipeline::new(source, storage, config);
    let engine = RollupEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Rollup completed successfully!");
            println!("✅ Rollup completed successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Rollup failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &RollupConfig) {
    tracing::info!("📋 Rollup: {}", config.report_name());
    tracing::info!(
        "📋 Qualifying statuses: {}",
        config.qualifying_statuses().join(", ")
    );
    if let Some(base_url) = config.base_url() {
        tracing::info!("🔗 Record links: {}", base_url);
    }
    tracing::info!(
        "📁 Output: {} ({}{})",
        config.output_path(),
        config.output_formats().join(", "),
        if config.compress_output() { ", zipped" } else { "" }
    );
}
