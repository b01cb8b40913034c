use crate::domain::model::{RollupReport, Subscription};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 外部資料來源：交出已過濾（未終止、屬於目標帳戶）的扁平訂閱清單
#[async_trait]
pub trait SubscriptionSource: Send + Sync {
    async fn fetch_subscriptions(&self) -> Result<Vec<Subscription>>;

    fn describe(&self) -> String;
}

#[async_trait]
impl SubscriptionSource for Box<dyn SubscriptionSource> {
    async fn fetch_subscriptions(&self) -> Result<Vec<Subscription>> {
        (**self).fetch_subscriptions().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

pub trait ConfigProvider: Send + Sync {
    fn report_name(&self) -> &str;
    fn qualifying_statuses(&self) -> &[String];
    fn base_url(&self) -> Option<&str>;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn compress_output(&self) -> bool;
    fn bundle_name(&self) -> &str;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Subscription>>;
    async fn transform(&self, data: Vec<Subscription>) -> Result<RollupReport>;
    async fn load(&self, report: RollupReport) -> Result<String>;
}
