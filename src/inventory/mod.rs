//! Chef server access for chef-ssh.
//!
//! This module handles:
//! - The `Inventory` seam the resolver talks to
//! - Typed attribute lookup over node JSON
//! - Node and role resolution to a single address
//! - The signed HTTPS client for the Chef server API

pub mod attributes;
pub mod client;
pub mod resolver;
pub mod signing;

pub use attributes::{AttributeError, string_at};
pub use client::ChefClient;
pub use resolver::{node_address, resolve, role_address};
pub use signing::RequestSigner;

use crate::error::Result;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// Read access to the node inventory.
///
/// Each call is a single round trip; implementations do not retry.
pub trait Inventory {
	/// Fetch a node object by name.
	fn node(&self, name: &str) -> Result<Value>;

	/// Run a search query against an index.
	fn search(&self, query: &SearchQuery) -> Result<SearchResult>;
}

/// A search request against the Chef search API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
	/// Search index, e.g. `node`.
	pub index: String,
	/// Query expression, e.g. `role:web`.
	pub q: String,
	/// Maximum number of rows returned.
	pub rows: u32,
	/// Offset of the first row.
	pub start: u32,
	/// Sort expression, e.g. `name asc`.
	pub sort: String,
}

impl SearchQuery {
	/// First node in `role`, ordered by node name.
	pub fn role_members(role: &str) -> Self {
		SearchQuery {
			index: "node".to_string(),
			q: format!("role:{role}"),
			rows: 1,
			start: 0,
			sort: "name asc".to_string(),
		}
	}

	/// Query string parameters, in the order the server documents them.
	pub fn params(&self) -> Vec<(&'static str, String)> {
		vec![
			("q", self.q.clone()),
			("sort", self.sort.clone()),
			("start", self.start.to_string()),
			("rows", self.rows.to_string()),
		]
	}
}

impl fmt::Display for SearchQuery {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.index, self.q)
	}
}

/// Response body of a search request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResult {
	/// Number of matches on the server, not the number of rows returned.
	#[serde(default)]
	pub total: u64,
	#[serde(default)]
	pub start: u64,
	#[serde(default)]
	pub rows: Vec<Value>,
}
