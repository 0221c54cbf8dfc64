pub mod config;
pub mod error;
pub mod logging;

// Pipeline stages, leaves first.
pub mod agent;
pub mod cover;
pub mod downloader;
pub mod har;
pub mod pipeline;
pub mod probe;
pub mod request;
pub mod retry;
pub mod transcode;
pub mod url_model;

pub use error::{CoverError, PipelineError};
pub use pipeline::{CoverRequest, Pipeline, RunReport};
pub use request::RequestDescriptor;
pub use transcode::{NoProgress, ProgressSink};
