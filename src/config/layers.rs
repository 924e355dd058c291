use crate::config::parser::parse_config_file;
use crate::config::types::{Config, FileConfig, LoadedConfig};
use crate::error::{ChefSshError, Result};
use std::path::{Path, PathBuf};

pub const ENV_TLD: &str = "CHEF_TLD";
pub const ENV_USER: &str = "CHEF_USER";
pub const ENV_SERVER_URL: &str = "CHEF_SERVER_URL";
pub const ENV_USER_KEY: &str = "CHEF_USER_KEY";
pub const ENV_IP_ATTRIBUTE: &str = "CHEF_IP_ATTRIBUTE";
pub const ENV_CLIENT: &str = "CHEF_SSH_CLIENT";
pub const ENV_CONFIG: &str = "CHEF_SSH_CONFIG";

pub const DEFAULT_TLD: &str = ".chef";
pub const DEFAULT_CLIENT: &str = "ssh";

/// Environment variables naming the OS user, checked in order when the
/// account database has no name for the current uid.
const OS_USER_VARS: [&str; 3] = ["USER", "LOGNAME", "USERNAME"];

/// Load the effective configuration from the process environment.
///
/// Layers, lowest precedence first:
/// 1. Built-in defaults
/// 2. The config file (`$CHEF_SSH_CONFIG`, or `~/.chef/ssh.toml` if present)
/// 3. `CHEF_*` environment variables
///
/// A config file that is missing or malformed is left out of the merge and
/// reported in `LoadedConfig::file_error`.
pub fn load_config() -> LoadedConfig {
	let lookup = |name: &str| std::env::var(name).ok();
	let account = whoami::fallible::username().ok();

	let (file, file_error) = match load_config_file(lookup) {
		Ok(file) => (file, None),
		Err(e) => {
			log::warn!("ignoring config file: {e}");
			(FileConfig::default(), Some(e))
		}
	};

	LoadedConfig {
		config: resolve_config(file, lookup, account),
		file_error,
	}
}

/// Parse the config file, or an empty layer when there is none.
pub fn load_config_file<F>(lookup: F) -> Result<FileConfig>
where
	F: Fn(&str) -> Option<String>,
{
	match config_file_path(lookup)? {
		Some(path) => {
			log::debug!("loading config file {}", path.display());
			parse_config_file(&path)
		}
		None => Ok(FileConfig::default()),
	}
}

/// Locate the config file.
///
/// An explicit `CHEF_SSH_CONFIG` must exist; the default location is optional.
pub fn config_file_path<F>(lookup: F) -> Result<Option<PathBuf>>
where
	F: Fn(&str) -> Option<String>,
{
	if let Some(explicit) = non_empty(lookup(ENV_CONFIG)) {
		let path = expand_home(Path::new(&explicit));
		if !path.exists() {
			return Err(ChefSshError::ConfigNotFound { path });
		}
		return Ok(Some(path));
	}

	Ok(default_config_path().filter(|path| path.exists()))
}

/// `~/.chef/ssh.toml`, next to the knife configuration.
pub fn default_config_path() -> Option<PathBuf> {
	dirs::home_dir().map(|home| home.join(".chef").join("ssh.toml"))
}

/// Merge defaults, file settings and environment variables into a `Config`.
///
/// `account` is the login name of the current OS user. It is the default Chef
/// user, ahead of the `USER`-style variables. Empty values at any layer count
/// as unset.
pub fn resolve_config<F>(file: FileConfig, lookup: F, account: Option<String>) -> Config
where
	F: Fn(&str) -> Option<String>,
{
	let env = |name: &str| non_empty(lookup(name));

	let tld = env(ENV_TLD)
		.or(non_empty(file.tld))
		.unwrap_or_else(|| DEFAULT_TLD.to_string());

	let user = env(ENV_USER)
		.or(non_empty(file.user))
		.or(non_empty(account))
		.or_else(|| OS_USER_VARS.iter().find_map(|&name| env(name)));

	let user_key = env(ENV_USER_KEY)
		.map(PathBuf::from)
		.or(file.user_key.filter(|path| !path.as_os_str().is_empty()))
		.or_else(|| {
			user.as_ref()
				.map(|user| PathBuf::from(format!("~/.chef/{user}.pem")))
		})
		.map(|path| expand_home(&path));

	Config {
		tld,
		user,
		server_url: env(ENV_SERVER_URL).or(non_empty(file.server_url)),
		user_key,
		ip_attribute: env(ENV_IP_ATTRIBUTE).or(non_empty(file.ip_attribute)),
		client: env(ENV_CLIENT)
			.or(non_empty(file.client))
			.unwrap_or_else(|| DEFAULT_CLIENT.to_string()),
	}
}

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|value| !value.is_empty())
}

/// Expand a leading `~` to the home directory.
fn expand_home(path: &Path) -> PathBuf {
	PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}
