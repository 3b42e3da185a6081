// Infrastructure for Tributary: file discovery, the C++ front end, the
// parallel ingestion pipeline, logging and configuration loading.

pub mod concurrency;
pub mod config;
pub mod cpp;
pub mod discovery;
pub mod ingestion;
pub mod logging;
pub mod path_resolver;

pub use cpp::CppAstProvider;
pub use discovery::{DiscoveryService, FileSelection};
pub use ingestion::{IngestionPipeline, IngestionVerdict};
pub use logging::TracingDiagnosticSink;
