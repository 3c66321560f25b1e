//! USB3 PIPE configuration management
//!
//! This crate provides configuration loading and parsing for the link layer:
//! - TOML configuration file parsing
//! - Pipe configuration structures and validation

pub mod pipe_config;
pub mod toml_config;

pub use pipe_config::*;
pub use toml_config::*;
