//! Adapters that feed documents into the pipeline and persist its results.

mod document;
pub mod event;
mod local;
mod store;

pub use document::ProcessedDocument;
pub use event::{
    EventRecord, EventRunner, EventRunnerConfig, HandlerResponse, ResponseBody, StorageEvent,
};
pub use local::{LocalRunner, LocalSource};
pub use store::s3_store;
