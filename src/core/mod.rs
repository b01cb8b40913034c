pub mod engine;
pub mod grouping;
pub mod ordering;
pub mod report;
pub mod rollup;

pub use crate::domain::model::{Contract, RollupReport, Subscription};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage, SubscriptionSource};
pub use crate::utils::error::Result;
