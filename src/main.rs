use anyhow::{Context, Result};
use std::convert::Infallible;
use std::ffi::OsString;
use std::process::ExitCode;

use chef_ssh::config::{LoadedConfig, load_config};
use chef_ssh::exec::{find_client, handoff};
use chef_ssh::inventory::ChefClient;
use chef_ssh::pipeline::prepare_args;

const LOG_ENV: &str = "CHEF_SSH_LOG";

fn main() -> ExitCode {
	env_logger::Builder::from_env(env_logger::Env::default().filter_or(LOG_ENV, "warn"))
		.format_timestamp(None)
		.init();

	match run() {
		Ok(never) => match never {},
		Err(e) => {
			eprintln!("chef-ssh: {e:#}");
			ExitCode::FAILURE
		}
	}
}

fn run() -> Result<Infallible> {
	// Everything after argv[0] belongs to the client; nothing is parsed here.
	let args: Vec<OsString> = std::env::args_os().skip(1).collect();

	// A broken config file only matters once a destination needs the Chef server.
	let LoadedConfig { config, file_error } = load_config();

	let args = prepare_args(args, &config, file_error, ChefClient::from_config)
		.context("Failed to resolve destination")?;

	let binary = find_client(&config.client)?;
	Ok(handoff(&binary, &config.client, &args)?)
}
