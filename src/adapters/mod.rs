// Adapters layer: concrete implementations of the domain ports (storage, subscription sources).

pub mod source;
pub mod storage;

pub use source::{decode_subscriptions, ApiSource, FileSource};
pub use storage::LocalStorage;
