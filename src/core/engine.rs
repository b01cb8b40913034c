use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct RollupEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> RollupEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting subscription rollup...");

        // Extract
        let subscriptions = self.pipeline.extract().await?;
        tracing::info!("📥 Extracted {} subscriptions", subscriptions.len());

        // Transform
        let report = self.pipeline.transform(subscriptions).await?;
        tracing::info!(
            "🔄 Rolled up {} subscriptions across {} contracts (total MRR {})",
            report.subscription_count(),
            report.contracts.len(),
            report.total_mrr
        );

        // Load
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("📁 Output saved to: {}", output_path);

        Ok(output_path)
    }
}
