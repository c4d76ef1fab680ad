//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository, throttle, sanitizer and cache calls.
//! - Convert faults into notices so presentation code only sees results.

pub mod notes_service;
