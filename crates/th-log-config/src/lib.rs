//! Configuration for th-log-parser
//!
//! This crate provides:
//! - Config file discovery (CWD, home directory, user config directory)
//! - Parser configuration (ParserConfig) loaded from TOML

pub mod config_file;
pub mod parser_config;

pub use config_file::{config_file_candidates, load_config_file};
pub use parser_config::{ConfigError, ParserConfig};
