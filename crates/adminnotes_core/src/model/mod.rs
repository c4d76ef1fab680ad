//! Domain model for the notes panel.
//!
//! # Responsibility
//! - Define the note record, its configuration blob and the acting user.
//! - Normalize loosely typed configuration values once, at parse time.
//!
//! # Invariants
//! - Every note record is identified by a positive `ModuleId`.
//! - Allow-lists are always held as normalized integer sets.

pub mod actor;
pub mod id_set;
pub mod module;
pub mod params;
