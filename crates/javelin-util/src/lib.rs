//! Shared utilities for the javelin dependency tool.
//!
//! This crate provides the cross-cutting concerns used by all other javelin
//! crates: error types and small filesystem helpers.

pub mod errors;
pub mod fs;

use std::path::{Path, PathBuf};

/// Returns the path to the javelin data directory (`~/.javelin/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".javelin")
}
