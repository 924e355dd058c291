//! Process handoff for chef-ssh.
//!
//! This module handles:
//! - Locating the client binary on PATH
//! - Replacing the current process with it

use crate::error::{ChefSshError, Result};
use std::convert::Infallible;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Resolve a command name to its full path.
///
/// Names containing a path separator are used as given if they exist.
/// Otherwise, searches PATH for the command.
pub fn resolve_command(command: &str) -> Option<PathBuf> {
	let path = Path::new(command);

	if path.components().count() > 1 {
		return path.is_file().then(|| path.to_path_buf());
	}

	let path_var = std::env::var_os("PATH")?;
	std::env::split_paths(&path_var)
		.map(|dir| dir.join(command))
		.find(|full_path| full_path.is_file())
}

/// Like `resolve_command`, but a missing binary is an error.
pub fn find_client(command: &str) -> Result<PathBuf> {
	resolve_command(command).ok_or_else(|| ChefSshError::BinaryNotFound {
		command: command.to_string(),
	})
}

/// Replace the current process with `binary`.
///
/// The client sees `client_name` as argv[0], then `args`, with the current
/// environment. Only returns if the exec itself fails.
#[cfg(unix)]
pub fn handoff(binary: &Path, client_name: &str, args: &[OsString]) -> Result<Infallible> {
	use std::os::unix::process::CommandExt;

	log::debug!("exec {} {:?}", binary.display(), args);
	let source = Command::new(binary).arg0(client_name).args(args).exec();

	Err(ChefSshError::ExecFailed {
		binary: binary.to_path_buf(),
		source,
	})
}

/// Run `binary` to completion and exit with its status.
///
/// Without exec, the closest equivalent: nothing else runs in this process
/// after the client exits.
#[cfg(not(unix))]
pub fn handoff(binary: &Path, _client_name: &str, args: &[OsString]) -> Result<Infallible> {
	log::debug!("spawn {} {:?}", binary.display(), args);
	let status = Command::new(binary)
		.args(args)
		.status()
		.map_err(|source| ChefSshError::ExecFailed {
			binary: binary.to_path_buf(),
			source,
		})?;

	std::process::exit(status.code().unwrap_or(1))
}
