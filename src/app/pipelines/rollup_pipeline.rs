use crate::core::grouping::StatusFilter;
use crate::core::report::{build_report, render_contracts_csv, render_json, render_subscriptions_csv};
use crate::core::rollup::SubscriptionRollup;
use crate::core::{ConfigProvider, Pipeline, RollupReport, Storage, Subscription, SubscriptionSource};
use crate::domain::model::{MessageSeverity, ProfileMessage};
use crate::utils::error::Result;
use std::io::Write;
use tokio::sync::Mutex;
use zip::write::{FileOptions, ZipWriter};

/// 訂閱彙總管道：來源 → 分組排序 → 輸出
pub struct RollupPipeline<Src: SubscriptionSource, S: Storage, C: ConfigProvider> {
    source: Src,
    storage: S,
    config: C,
    messages: Mutex<Vec<ProfileMessage>>,
}

impl<Src: SubscriptionSource, S: Storage, C: ConfigProvider> RollupPipeline<Src, S, C> {
    pub fn new(source: Src, storage: S, config: C) -> Self {
        Self {
            source,
            storage,
            config,
            messages: Mutex::new(Vec::new()),
        }
    }

    fn rendered_outputs(&self, report: &RollupReport) -> Result<Vec<(&'static str, String)>> {
        let mut outputs = Vec::new();
        for format in self.config.output_formats() {
            match format.as_str() {
                "json" => outputs.push(("rollup.json", render_json(report)?)),
                "csv" => {
                    outputs.push(("subscriptions.csv", render_subscriptions_csv(report)?));
                    outputs.push(("contracts.csv", render_contracts_csv(report)?));
                }
                other => tracing::warn!("Skipping unsupported output format: {}", other),
            }
        }
        Ok(outputs)
    }
}

#[async_trait::async_trait]
impl<Src, S, C> Pipeline for RollupPipeline<Src, S, C>
where
    Src: SubscriptionSource,
    S: Storage,
    C: ConfigProvider,
{
    async fn extract(&self) -> Result<Vec<Subscription>> {
        tracing::info!("🚀 Loading subscriptions from {}", self.source.describe());

        match self.source.fetch_subscriptions().await {
            Ok(subscriptions) => Ok(subscriptions),
            Err(e) => {
                // 來源失敗不中斷流程：記錄訊息並輸出空的彙總
                tracing::warn!("⚠️ Error loading subscriptions: {}", e);
                self.messages.lock().await.push(ProfileMessage {
                    severity: MessageSeverity::Error,
                    text: format!("Error loading subscriptions: {}", e),
                });
                Ok(Vec::new())
            }
        }
    }

    async fn transform(&self, data: Vec<Subscription>) -> Result<RollupReport> {
        let filter = StatusFilter::new(self.config.qualifying_statuses().iter().cloned());
        let rollup = SubscriptionRollup::build(&data, &filter)?;

        let messages = std::mem::take(&mut *self.messages.lock().await);
        Ok(build_report(
            self.config.report_name(),
            &rollup,
            self.config.base_url(),
            messages,
        ))
    }

    async fn load(&self, report: RollupReport) -> Result<String> {
        let outputs = self.rendered_outputs(&report)?;

        if self.config.compress_output() {
            let bundle_name = self.config.bundle_name();
            tracing::debug!("Creating ZIP file with {} files", outputs.len());

            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, content) in &outputs {
                    zip.start_file::<_, ()>(*name, FileOptions::default())?;
                    zip.write_all(content.as_bytes())?;
                }
                let cursor = zip.finish()?;
                cursor.into_inner()
            };

            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(bundle_name, &zip_data).await?;
            return Ok(format!("{}/{}", self.config.output_path(), bundle_name));
        }

        for (name, content) in &outputs {
            tracing::debug!("Writing {} ({} bytes)", name, content.len());
            self.storage.write_file(name, content.as_bytes()).await?;
        }

        Ok(self.config.output_path().to_string())
    }
}
