// Main library entry point for Tributary.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;
