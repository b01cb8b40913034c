pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::RollupConfig;

pub use adapters::LocalStorage;
pub use app::pipelines::RollupPipeline;
pub use core::{
    engine::RollupEngine,
    grouping::StatusFilter,
    rollup::{ContractBucket, SubscriptionRollup},
};
pub use domain::model::{Contract, Product, Subscription};
pub use utils::error::{Result, RollupError};
