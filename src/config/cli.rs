use crate::config::toml_config::{CompressionConfig, RollupConfig};
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "subscription-rollup")]
#[command(about = "Group subscriptions by contract and roll up their MRR")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Read subscriptions from a JSON file instead of the configured source
    #[arg(long, conflicts_with = "endpoint")]
    pub input: Option<String>,

    /// Fetch subscriptions from an HTTP endpoint instead of the configured source
    #[arg(long)]
    pub endpoint: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    /// Qualifying contract status (repeatable, replaces the configured set)
    #[arg(long = "status")]
    pub statuses: Vec<String>,

    #[arg(long)]
    pub base_url: Option<String>,

    /// Bundle all outputs into a single zip archive
    #[arg(long)]
    pub compress: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Show what would be processed without writing output
    #[arg(long)]
    pub dry_run: bool,
}

impl CliConfig {
    /// 載入 TOML（若有指定），再套用命令列覆蓋設定
    pub fn resolve(&self) -> Result<RollupConfig> {
        let mut config = match &self.config {
            Some(path) => RollupConfig::from_file(path)?,
            None => RollupConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut RollupConfig) {
        if let Some(input) = &self.input {
            config.source.r#type = "file".to_string();
            config.source.path = Some(input.clone());
        }
        if let Some(endpoint) = &self.endpoint {
            config.source.r#type = "api".to_string();
            config.source.endpoint = Some(endpoint.clone());
        }
        if let Some(output_path) = &self.output_path {
            config.load.output_path = output_path.clone();
        }
        if !self.statuses.is_empty() {
            config.rollup.qualifying_statuses = self.statuses.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.rollup.base_url = Some(base_url.clone());
        }
        if self.compress {
            let filename = config.load.compression.take().and_then(|c| c.filename);
            config.load.compression = Some(CompressionConfig {
                enabled: true,
                filename,
            });
        }
    }
}
