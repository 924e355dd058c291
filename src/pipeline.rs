//! The pass-through state machine.
//!
//! ```text
//! scan -> parse -> domain tag? -> classify -> resolve -> rewrite -> handoff
//!   \        \          \ no
//!    `--------`----------`-----------------------------------------> handoff
//! ```
//!
//! Until the domain tag matches, anything unexpected forwards the arguments
//! untouched. Once it matches, every failure is fatal.

use crate::config::Config;
use crate::destination::{Destination, find_destination, rewrite_destination};
use crate::error::{ChefSshError, Result};
use crate::inventory::{Inventory, resolve};
use crate::lookup::{Lookup, classify, strip_domain_tag};
use std::ffi::OsString;
use std::fmt;
use std::net::IpAddr;

/// Why the arguments are forwarded unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassThrough {
	/// No argument without a leading `-`, or it was empty.
	NoDestination,
	/// The destination is not valid UTF-8.
	NotUtf8,
	/// The destination is not `[user@]host[:port]`.
	Unparseable,
	/// The host does not end with the domain tag.
	ForeignDomain,
}

impl fmt::Display for PassThrough {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			PassThrough::NoDestination => "no destination argument",
			PassThrough::NotUtf8 => "destination is not valid UTF-8",
			PassThrough::Unparseable => "destination could not be parsed",
			PassThrough::ForeignDomain => "destination is outside the domain tag",
		})
	}
}

/// A destination that carries the domain tag and a valid lookup suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
	/// Position of the destination in the argument vector.
	pub index: usize,
	pub destination: Destination,
	pub lookup: Lookup,
}

impl Candidate {
	/// Resolve the lookup to the value of `attribute`.
	pub fn resolve(&self, inventory: &impl Inventory, attribute: &str) -> Result<String> {
		resolve(inventory, &self.lookup, attribute)
	}

	/// Write `address` into `args` in place of the destination host.
	///
	/// `args` must be the vector this candidate was screened from.
	pub fn rewrite(&self, args: &mut [OsString], address: &str) -> Result<String> {
		rewrite_destination(args, self.index, &self.destination, address)
			.ok_or(ChefSshError::DestinationMissing { index: self.index })
	}
}

/// Outcome of the soft stages of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screening {
	PassThrough(PassThrough),
	Eligible(Candidate),
}

/// Scan, parse, check the domain tag and classify.
///
/// Only classification can fail: it runs after the domain tag matched.
pub fn screen(args: &[OsString], config: &Config) -> Result<Screening> {
	let Some(index) = find_destination(args) else {
		return Ok(Screening::PassThrough(PassThrough::NoDestination));
	};
	let Some(token) = args[index].to_str() else {
		return Ok(Screening::PassThrough(PassThrough::NotUtf8));
	};
	if token.is_empty() {
		return Ok(Screening::PassThrough(PassThrough::NoDestination));
	}
	let Some(destination) = Destination::parse(token) else {
		return Ok(Screening::PassThrough(PassThrough::Unparseable));
	};
	let Some(name) = strip_domain_tag(&destination.host, &config.tld) else {
		return Ok(Screening::PassThrough(PassThrough::ForeignDomain));
	};

	let lookup = classify(name)?;
	Ok(Screening::Eligible(Candidate {
		index,
		destination,
		lookup,
	}))
}

/// Run the pipeline up to the handoff and return the arguments to forward.
///
/// `connect` is only called for eligible destinations, so pass-through never
/// touches the key file or the network. Likewise `file_error`, a config file
/// that could not be loaded, only fails destinations that need resolving.
pub fn prepare_args<I, F>(
	mut args: Vec<OsString>,
	config: &Config,
	file_error: Option<ChefSshError>,
	connect: F,
) -> Result<Vec<OsString>>
where
	I: Inventory,
	F: FnOnce(&Config) -> Result<I>,
{
	let candidate = match screen(&args, config)? {
		Screening::PassThrough(reason) => {
			log::debug!("forwarding arguments unchanged: {reason}");
			return Ok(args);
		}
		Screening::Eligible(candidate) => candidate,
	};
	if let Some(e) = file_error {
		return Err(e);
	}

	log::debug!("resolving {} through the chef server", candidate.lookup);
	let attribute = config.ip_attribute()?;
	let inventory = connect(config)?;
	let address = candidate.resolve(&inventory, attribute)?;

	if address.parse::<IpAddr>().is_err() {
		log::warn!("attribute {attribute} of {} is not an IP address: {address}", candidate.lookup);
	}
	let rewritten = candidate.rewrite(&mut args, &address)?;
	log::info!("{} resolved to {rewritten}", candidate.lookup);

	Ok(args)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::inventory::{SearchQuery, SearchResult};
	use crate::lookup::LookupKind;
	use serde_json::{Value, json};
	use std::cell::Cell;

	struct StaticInventory {
		node: Value,
		rows: Vec<Value>,
	}

	impl Inventory for StaticInventory {
		fn node(&self, _name: &str) -> Result<Value> {
			Ok(self.node.clone())
		}

		fn search(&self, _query: &SearchQuery) -> Result<SearchResult> {
			Ok(SearchResult {
				total: self.rows.len() as u64,
				start: 0,
				rows: self.rows.clone(),
			})
		}
	}

	fn config() -> Config {
		Config {
			tld: ".chef".to_string(),
			user: Some("alice".to_string()),
			server_url: Some("https://chef.example.com".to_string()),
			user_key: None,
			ip_attribute: Some("ipaddress".to_string()),
			client: "ssh".to_string(),
		}
	}

	fn args(items: &[&str]) -> Vec<OsString> {
		items.iter().map(OsString::from).collect()
	}

	fn inventory_with_ip(ip: &str) -> StaticInventory {
		StaticInventory {
			node: json!({ "name": "web01", "normal": { "ipaddress": ip } }),
			rows: vec![json!({ "name": "build01", "normal": { "ipaddress": ip } })],
		}
	}

	#[test]
	fn test_screen_pass_through_reasons() {
		let config = config();
		let cases = [
			(args(&["-V"]), PassThrough::NoDestination),
			(args(&["-v", ""]), PassThrough::NoDestination),
			(args(&["host:notaport"]), PassThrough::Unparseable),
			(args(&["user@example.com"]), PassThrough::ForeignDomain),
			(args(&["-p", "2222", "web01.node.chef"]), PassThrough::ForeignDomain),
		];

		for (argv, expected) in cases {
			assert_eq!(
				screen(&argv, &config).unwrap(),
				Screening::PassThrough(expected),
				"{argv:?}"
			);
		}
	}

	#[cfg(unix)]
	#[test]
	fn test_screen_non_utf8() {
		use std::os::unix::ffi::OsStringExt;

		let argv = vec![OsString::from_vec(vec![b'h', 0xff, b'.', b'c'])];
		assert_eq!(
			screen(&argv, &config()).unwrap(),
			Screening::PassThrough(PassThrough::NotUtf8)
		);
	}

	#[test]
	fn test_screen_eligible() {
		let screening = screen(&args(&["-A", "user@myhost.node.chef"]), &config()).unwrap();

		let Screening::Eligible(candidate) = screening else {
			panic!("Expected an eligible destination");
		};
		assert_eq!(candidate.index, 1);
		assert_eq!(candidate.destination.user.as_deref(), Some("user"));
		assert_eq!(candidate.lookup.kind, LookupKind::Node);
		assert_eq!(candidate.lookup.name, "myhost");
	}

	#[test]
	fn test_screen_invalid_lookup_is_fatal() {
		match screen(&args(&["web01.env.chef"]), &config()) {
			Err(ChefSshError::InvalidLookup { hostname }) => assert_eq!(hostname, "web01.env"),
			other => panic!("Expected InvalidLookup, got {other:?}"),
		}
	}

	#[test]
	fn test_pass_through_never_connects() {
		let connected = Cell::new(false);
		let argv = args(&["-o", "StrictHostKeyChecking=no", "git@github.com", "--", "ls"]);

		let forwarded = prepare_args(argv.clone(), &config(), None, |_| {
			connected.set(true);
			Ok(inventory_with_ip("10.0.0.5"))
		})
		.unwrap();

		assert_eq!(forwarded, argv);
		assert!(!connected.get());
	}

	#[test]
	fn test_node_destination_rewritten() {
		let forwarded = prepare_args(
			args(&["-A", "user@myhost.node.chef", "uptime"]),
			&config(),
			None,
			|_| Ok(inventory_with_ip("10.0.0.5")),
		)
		.unwrap();

		assert_eq!(forwarded, args(&["-A", "user@10.0.0.5", "uptime"]));
	}

	#[test]
	fn test_role_destination_keeps_port() {
		let forwarded = prepare_args(args(&["build.role.chef:2222"]), &config(), None, |_| {
			Ok(inventory_with_ip("10.1.0.1"))
		})
		.unwrap();

		assert_eq!(forwarded, args(&["10.1.0.1:2222"]));
	}

	#[test]
	fn test_custom_domain_tag() {
		let config = Config {
			tld: ".internal".to_string(),
			..config()
		};

		let forwarded = prepare_args(args(&["web01.node.internal"]), &config, None, |_| {
			Ok(inventory_with_ip("10.0.0.9"))
		})
		.unwrap();
		assert_eq!(forwarded, args(&["10.0.0.9"]));

		let untouched = args(&["web01.node.chef"]);
		let forwarded = prepare_args(untouched.clone(), &config, None, |_| {
			Ok(inventory_with_ip("10.0.0.9"))
		})
		.unwrap();
		assert_eq!(forwarded, untouched);
	}

	#[test]
	fn test_empty_role_is_fatal() {
		let result = prepare_args(args(&["build.role.chef:2222"]), &config(), None, |_| {
			Ok(StaticInventory {
				node: Value::Null,
				rows: vec![],
			})
		});

		assert!(matches!(result, Err(ChefSshError::EntityNotInGroup { .. })));
	}

	#[test]
	fn test_missing_ip_attribute_setting() {
		let config = Config {
			ip_attribute: None,
			..config()
		};
		let connected = Cell::new(false);

		let result = prepare_args(args(&["web01.node.chef"]), &config, None, |_| {
			connected.set(true);
			Ok(inventory_with_ip("10.0.0.5"))
		});

		assert!(matches!(
			result,
			Err(ChefSshError::MissingSetting {
				name: "CHEF_IP_ATTRIBUTE"
			})
		));
		assert!(!connected.get());
	}

	#[test]
	fn test_connect_failure_is_fatal() {
		let result = prepare_args(args(&["web01.node.chef"]), &config(), None, |_| {
			Err::<StaticInventory, _>(ChefSshError::MissingSetting {
				name: "CHEF_SERVER_URL",
			})
		});

		assert!(matches!(result, Err(ChefSshError::MissingSetting { .. })));
	}

	fn broken_file() -> Option<ChefSshError> {
		Some(ChefSshError::ConfigNotFound {
			path: "/nonexistent/ssh.toml".into(),
		})
	}

	#[test]
	fn test_config_file_error_ignored_for_pass_through() {
		let argv = args(&["git@github.com", "ls"]);

		let forwarded = prepare_args(argv.clone(), &config(), broken_file(), |_| {
			Ok(inventory_with_ip("10.0.0.5"))
		})
		.unwrap();

		assert_eq!(forwarded, argv);
	}

	#[test]
	fn test_config_file_error_fails_lookup() {
		let connected = Cell::new(false);

		let result = prepare_args(args(&["web01.node.chef"]), &config(), broken_file(), |_| {
			connected.set(true);
			Ok(inventory_with_ip("10.0.0.5"))
		});

		assert!(matches!(result, Err(ChefSshError::ConfigNotFound { .. })));
		assert!(!connected.get());
	}

	#[test]
	fn test_user_with_at_sign_survives_rewrite() {
		let forwarded = prepare_args(
			args(&["user@corp.com@web01.node.chef", "uptime"]),
			&config(),
			None,
			|_| Ok(inventory_with_ip("10.0.0.5")),
		)
		.unwrap();

		assert_eq!(forwarded, args(&["user@corp.com@10.0.0.5", "uptime"]));
	}

	#[test]
	fn test_rewrite_on_other_arguments_is_an_error() {
		let Screening::Eligible(candidate) =
			screen(&args(&["-A", "web01.node.chef"]), &config()).unwrap()
		else {
			panic!("Expected an eligible destination");
		};

		let mut shorter = args(&["-A"]);
		match candidate.rewrite(&mut shorter, "10.0.0.5") {
			Err(ChefSshError::DestinationMissing { index }) => assert_eq!(index, 1),
			other => panic!("Expected DestinationMissing, got {other:?}"),
		}
		assert_eq!(shorter, args(&["-A"]));
	}
}
