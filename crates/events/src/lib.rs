//! Orchestration services between webhook ingestion and the job store:
//! the artifact merge service ([`ingest::Ingest`]) and the milestone
//! bridge ([`bridge::MilestoneBridge`]).

pub mod bridge;
pub mod ingest;

pub use bridge::MilestoneBridge;
pub use ingest::{Ingest, IngestError, IngestOutcome};
