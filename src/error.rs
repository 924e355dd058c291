use std::path::PathBuf;

use crate::inventory::attributes::AttributeError;

/// Library-level structured errors for chef-ssh.
///
/// Every variant is fatal: the binary prints the chain and exits non-zero.
/// Conditions that forward the arguments untouched are not errors and never
/// show up here (see `pipeline::PassThrough`).
#[derive(Debug, thiserror::Error)]
pub enum ChefSshError {
	#[error("Config file not found: {path}")]
	ConfigNotFound { path: PathBuf },

	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Missing required setting: {name}")]
	MissingSetting { name: &'static str },

	#[error("Couldn't read pem file: {path}")]
	KeyReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Invalid RSA private key: {path}")]
	InvalidKey {
		path: PathBuf,
		#[source]
		source: rsa::pkcs8::Error,
	},

	#[error("Issue setting up client: {reason}")]
	ClientSetup { reason: String },

	#[error("Invalid lookup: {hostname} (expected a .node or .role suffix)")]
	InvalidLookup { hostname: String },

	#[error("Couldn't get node: {name}")]
	CouldNotFetchEntity {
		name: String,
		#[source]
		source: RequestError,
	},

	#[error("Couldn't run search: {query}")]
	CouldNotQuery {
		query: String,
		#[source]
		source: RequestError,
	},

	#[error("Couldn't find node in role: {role}")]
	EntityNotInGroup { role: String },

	#[error("No ip address could be found for node: attribute {attribute}")]
	MissingAttribute {
		attribute: String,
		#[source]
		source: AttributeError,
	},

	#[error("Destination argument {index} is missing from the argument list")]
	DestinationMissing { index: usize },

	#[error("Cannot find `{command}` binary")]
	BinaryNotFound { command: String },

	#[error("Couldn't execute {binary}")]
	ExecFailed {
		binary: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

/// Failure of a single Chef server round trip.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
	#[error("request failed")]
	Transport(#[from] reqwest::Error),

	#[error("server responded with {status}: {body}")]
	Status { status: u16, body: String },

	#[error("failed to sign request")]
	Signing(#[from] rsa::Error),

	#[error("cannot build request URL from {base}")]
	InvalidUrl { base: String },
}

/// Result type alias using ChefSshError.
pub type Result<T> = std::result::Result<T, ChefSshError>;
