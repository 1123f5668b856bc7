//! Pure domain logic for the reelforge job orchestrator.
//!
//! Everything here is side-effect free: the step vocabulary, the
//! canonical job status machine and worker-status mapper, storyboard
//! shape normalization, quality-gate scoring, and webhook signature
//! helpers. Persistence and HTTP concerns live in the other crates.

pub mod error;
pub mod quality_gate;
pub mod signature;
pub mod status;
pub mod step;
pub mod storyboard;
pub mod types;
