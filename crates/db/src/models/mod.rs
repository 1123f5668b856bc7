//! Row structs and DTOs for the persistence layer.

pub mod job;
pub mod timeline_event;
