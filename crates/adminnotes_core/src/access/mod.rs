//! Edit permission checks for the notes panel.
//!
//! # Invariants
//! - Super users can always edit, whatever the allow-lists say.
//! - Malformed configuration fails closed.

pub mod policy;
