//! Configuration loading for chef-ssh.
//!
//! This module handles:
//! - Optional TOML config file parsing
//! - Environment variable overrides
//! - Defaults for the domain tag, user, key path and client binary

pub mod layers;
pub mod parser;
pub mod types;

pub use layers::{
	config_file_path, default_config_path, load_config, load_config_file, resolve_config,
};
pub use parser::{parse_config_file, parse_config_str};
pub use types::{Config, FileConfig, LoadedConfig};
