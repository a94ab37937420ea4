//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable key/value contract the calibration store writes through.
//! - Isolate SQLite query details from service orchestration.

pub mod kv_repo;
