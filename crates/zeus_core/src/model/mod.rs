//! Value types shared by calibration, visibility and workflow code.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep persisted JSON shapes next to the types that own them.
//!
//! # Invariants
//! - Body parts are identified by stable string ids.
//! - Effective positions are derived on read and never stored.

pub mod body_part;
pub mod calibration;
pub mod issue;
pub mod position;
