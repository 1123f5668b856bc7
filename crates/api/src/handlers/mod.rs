//! HTTP handlers, grouped by concern.

pub mod decision;
pub mod jobs;
pub mod stream;
pub mod webhooks;
