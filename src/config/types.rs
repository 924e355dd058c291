use crate::error::{ChefSshError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings read from the optional `ssh.toml` file.
///
/// Every key is optional; environment variables override whatever is set here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
	/// Domain tag a hostname must end with to be resolved, e.g. `.chef`.
	pub tld: Option<String>,

	/// Chef user the requests are signed as.
	pub user: Option<String>,

	/// Chef server base URL, including the organization path.
	pub server_url: Option<String>,

	/// Path to the user's PEM private key. A leading `~` is expanded.
	pub user_key: Option<PathBuf>,

	/// Node attribute (under `normal`) holding the address to connect to.
	pub ip_attribute: Option<String>,

	/// Binary to hand off to.
	pub client: Option<String>,
}

/// Effective configuration, resolved once at startup and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	/// Domain tag, `.chef` unless overridden.
	pub tld: String,

	/// Acting Chef user. `None` only when nothing in the environment names one.
	pub user: Option<String>,

	/// Chef server base URL.
	pub server_url: Option<String>,

	/// Expanded path to the user's PEM key.
	pub user_key: Option<PathBuf>,

	/// Attribute holding the IP address. No default.
	pub ip_attribute: Option<String>,

	/// Terminal client binary name, `ssh` unless overridden.
	pub client: String,
}

/// Configuration as loaded at startup, with the config file failure kept aside.
///
/// When the file cannot be used, `config` is built from the environment and
/// defaults alone. The file error only matters once a destination has to be
/// resolved.
#[derive(Debug)]
pub struct LoadedConfig {
	pub config: Config,
	pub file_error: Option<ChefSshError>,
}

impl Config {
	pub fn user(&self) -> Result<&str> {
		self.user
			.as_deref()
			.ok_or(ChefSshError::MissingSetting { name: "CHEF_USER" })
	}

	pub fn server_url(&self) -> Result<&str> {
		self.server_url
			.as_deref()
			.ok_or(ChefSshError::MissingSetting {
				name: "CHEF_SERVER_URL",
			})
	}

	pub fn user_key(&self) -> Result<&Path> {
		self.user_key
			.as_deref()
			.ok_or(ChefSshError::MissingSetting {
				name: "CHEF_USER_KEY",
			})
	}

	pub fn ip_attribute(&self) -> Result<&str> {
		self.ip_attribute
			.as_deref()
			.ok_or(ChefSshError::MissingSetting {
				name: "CHEF_IP_ATTRIBUTE",
			})
	}
}
