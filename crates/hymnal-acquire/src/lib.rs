pub mod catalog;
pub mod config;
pub mod detail;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod transport;

pub use config::{PipelineConfig, SourceConfig};
pub use error::AcquireError;
pub use pipeline::{Pipeline, RunSummary};
pub use transport::{HttpResponse, HttpTransport, Transport};
