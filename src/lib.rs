//! Glob and semver patterns for selecting image tags
//!
//! A [`pattern::Pattern`] is parsed from a prefixed string (`glob:...` or `semver:...`),
//! decides which tags match, and supplies the ordering function used to rank the matches.
//!
//! # Modules
//!
//! - [`pattern`]: pattern parsing, matching and validity
//! - [`image`]: tag metadata and the newest-first ordering functions
//! - [`config`]: per-container tag policy configuration

pub mod config;
pub mod image;
pub mod pattern;
