//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as autocomplete.

/// Autocomplete handlers for package names, service keys, file categories and settings
pub mod autocomplete;
