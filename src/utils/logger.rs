use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `--verbose` 優先於 `[monitoring] log_level`
fn cli_directive(verbose: bool, level: Option<&str>) -> String {
    if verbose {
        "subscription_rollup=debug,info".to_string()
    } else {
        format!("subscription_rollup={}", level.unwrap_or("info"))
    }
}

pub fn init_cli_logger(verbose: bool, level: Option<&str>) {
    let directive = cli_directive(verbose, level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// JSON 格式日誌，給收集器使用
pub fn init_json_logger(level: Option<&str>) {
    let directive = format!("subscription_rollup={}", level.unwrap_or("info"));
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .json(),
        )
        .init();
}
