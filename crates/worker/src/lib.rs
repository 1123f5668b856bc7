//! HTTP client for the external generation pipeline service.

pub mod client;

pub use client::{PipelineClient, PipelineClientError, StartGeneration};
