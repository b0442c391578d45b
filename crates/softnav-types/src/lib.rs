//! Foundation types and traits for softnav.
//!
//! This crate contains the platform-agnostic types shared by all softnav
//! crates: canonical paths, history records, configuration, error types,
//! and the port traits the navigation controller talks through.

pub mod backend;
pub mod config;
pub mod error;
pub mod path;
