//! chef-ssh - an `ssh` stand-in that resolves Chef hostnames.
//!
//! `ssh deploy@web01.node.chef` connects to the address stored on node
//! `web01`; `ssh build.role.chef:2222` connects to the first node (by name)
//! in role `build`. Everything else is handed to `ssh` untouched.
//!
//! This library provides:
//! - Configuration from an optional TOML file and `CHEF_*` variables
//! - Destination scanning, parsing and rewriting
//! - Lookup classification and resolution against the Chef server API
//! - The exec handoff to the real client
//!
//! # Example
//!
//! ```no_run
//! use chef_ssh::config::{LoadedConfig, load_config};
//! use chef_ssh::exec::{find_client, handoff};
//! use chef_ssh::inventory::ChefClient;
//! use chef_ssh::pipeline::prepare_args;
//!
//! let LoadedConfig { config, file_error } = load_config();
//! let args = std::env::args_os().skip(1).collect();
//! let args = prepare_args(args, &config, file_error, ChefClient::from_config)?;
//!
//! let binary = find_client(&config.client)?;
//! handoff(&binary, &config.client, &args)?;
//! # Ok::<(), chef_ssh::ChefSshError>(())
//! ```

pub mod config;
pub mod destination;
pub mod error;
pub mod exec;
pub mod inventory;
pub mod lookup;
pub mod pipeline;

pub use error::{ChefSshError, RequestError, Result};
