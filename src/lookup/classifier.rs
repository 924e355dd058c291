use crate::error::{ChefSshError, Result};
use std::fmt;

const NODE_TAG: &str = ".node";
const ROLE_TAG: &str = ".role";

/// How a tagged hostname is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
	/// Fetch the node with this name.
	Node,
	/// Search for a node whose role list contains this name.
	Role,
}

impl LookupKind {
	pub fn tag(&self) -> &'static str {
		match self {
			LookupKind::Node => NODE_TAG,
			LookupKind::Role => ROLE_TAG,
		}
	}
}

/// A classified lookup: the kind plus the bare node or role name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
	pub kind: LookupKind,
	pub name: String,
}

impl fmt::Display for Lookup {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}{}", self.name, self.kind.tag())
	}
}

/// Strip the domain tag from `host`, or `None` if the host does not carry it.
///
/// The match is an exact, case-sensitive suffix comparison.
pub fn strip_domain_tag<'a>(host: &'a str, tld: &str) -> Option<&'a str> {
	host.strip_suffix(tld)
}

/// Classify a hostname that already had its domain tag removed.
///
/// Anything other than a `.node` or `.role` suffix is an error: the domain tag
/// matched, so forwarding the hostname unchanged is no longer an option.
pub fn classify(name: &str) -> Result<Lookup> {
	[LookupKind::Role, LookupKind::Node]
		.into_iter()
		.find_map(|kind| {
			name.strip_suffix(kind.tag()).map(|bare| Lookup {
				kind,
				name: bare.to_string(),
			})
		})
		.ok_or_else(|| ChefSshError::InvalidLookup {
			hostname: name.to_string(),
		})
}
