//! Core use-case services.
//!
//! # Responsibility
//! - Own calibration state and its write-through persistence.
//! - Orchestrate interactive editing on top of the store.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod calibration_store;
pub mod calibration_workflow;
