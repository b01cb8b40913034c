pub mod rollup_pipeline;

pub use rollup_pipeline::RollupPipeline;
