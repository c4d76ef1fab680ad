//! Repository layer for note records.
//!
//! # Responsibility
//! - Define the persistence contract used by services and provisioning.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Missing records read as `None`, never as an error.
//! - Writes against a missing record report `RepoError::NotFound`.

pub mod module_repo;
