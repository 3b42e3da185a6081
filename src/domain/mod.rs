// Domain model for Tributary: declaration trees, record selection,
// member classification and code emission.

pub mod ast;
pub mod classifier;
pub mod config;
pub mod diagnostic;
pub mod emitter;
pub mod filter;
pub mod generator;
