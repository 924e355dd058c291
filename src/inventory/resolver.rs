use crate::error::{ChefSshError, Result};
use crate::inventory::attributes::string_at;
use crate::inventory::{Inventory, SearchQuery};
use crate::lookup::{Lookup, LookupKind};
use serde_json::Value;

/// Section of a node object holding user-set attributes.
const NORMAL_ATTRIBUTES: &str = "normal";

/// Resolve a classified lookup to the value of `attribute`.
pub fn resolve(inventory: &impl Inventory, lookup: &Lookup, attribute: &str) -> Result<String> {
	match lookup.kind {
		LookupKind::Node => node_address(inventory, &lookup.name, attribute),
		LookupKind::Role => role_address(inventory, &lookup.name, attribute),
	}
}

/// Fetch node `name` and read `normal.<attribute>`.
pub fn node_address(inventory: &impl Inventory, name: &str, attribute: &str) -> Result<String> {
	let node = inventory.node(name)?;
	address_of(&node, attribute)
}

/// Find the first node in `role` and read its `normal.<attribute>`.
///
/// The server is asked for one row sorted by name; the row with the smallest
/// name is picked again locally, so the choice does not depend on the order
/// the server returns rows in.
pub fn role_address(inventory: &impl Inventory, role: &str, attribute: &str) -> Result<String> {
	let query = SearchQuery::role_members(role);
	let result = inventory.search(&query)?;

	let not_found = || ChefSshError::EntityNotInGroup {
		role: role.to_string(),
	};
	if result.total == 0 {
		return Err(not_found());
	}
	let row = first_by_name(&result.rows).ok_or_else(not_found)?;

	address_of(row, attribute)
}

/// Row with the lexicographically smallest `name`; rows without one sort last.
fn first_by_name(rows: &[Value]) -> Option<&Value> {
	rows.iter().min_by_key(|&row| {
		let name = row.get("name").and_then(Value::as_str);
		(name.is_none(), name)
	})
}

fn address_of(node: &Value, attribute: &str) -> Result<String> {
	string_at(node, &[NORMAL_ATTRIBUTES, attribute])
		.map(str::to_string)
		.map_err(|source| ChefSshError::MissingAttribute {
			attribute: attribute.to_string(),
			source,
		})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::RequestError;
	use crate::inventory::{AttributeError, SearchResult};
	use serde_json::json;
	use std::cell::RefCell;
	use std::collections::HashMap;

	/// In-memory inventory that records every call it receives.
	#[derive(Default)]
	struct FakeInventory {
		nodes: HashMap<String, Value>,
		search_result: Option<SearchResult>,
		calls: RefCell<Vec<String>>,
	}

	impl Inventory for FakeInventory {
		fn node(&self, name: &str) -> Result<Value> {
			self.calls.borrow_mut().push(format!("node {name}"));
			self.nodes
				.get(name)
				.cloned()
				.ok_or_else(|| ChefSshError::CouldNotFetchEntity {
					name: name.to_string(),
					source: RequestError::Status {
						status: 404,
						body: "not found".to_string(),
					},
				})
		}

		fn search(&self, query: &SearchQuery) -> Result<SearchResult> {
			self.calls.borrow_mut().push(format!("search {query}"));
			self.search_result
				.clone()
				.ok_or_else(|| ChefSshError::CouldNotQuery {
					query: query.to_string(),
					source: RequestError::Status {
						status: 500,
						body: "solr is down".to_string(),
					},
				})
		}
	}

	fn node(name: &str, ip: Value) -> Value {
		json!({ "name": name, "normal": { "ipaddress": ip } })
	}

	fn with_rows(total: u64, rows: Vec<Value>) -> FakeInventory {
		FakeInventory {
			search_result: Some(SearchResult {
				total,
				start: 0,
				rows,
			}),
			..Default::default()
		}
	}

	#[test]
	fn test_node_address() {
		let mut inventory = FakeInventory::default();
		inventory
			.nodes
			.insert("web01".to_string(), node("web01", json!("10.0.0.5")));

		let address = node_address(&inventory, "web01", "ipaddress").unwrap();

		assert_eq!(address, "10.0.0.5");
		assert_eq!(*inventory.calls.borrow(), vec!["node web01"]);
	}

	#[test]
	fn test_node_not_found() {
		let inventory = FakeInventory::default();

		match node_address(&inventory, "ghost", "ipaddress") {
			Err(ChefSshError::CouldNotFetchEntity { name, .. }) => assert_eq!(name, "ghost"),
			other => panic!("Expected CouldNotFetchEntity, got {other:?}"),
		}
	}

	#[test]
	fn test_node_missing_attribute() {
		let mut inventory = FakeInventory::default();
		inventory.nodes.insert(
			"web01".to_string(),
			json!({ "name": "web01", "normal": {} }),
		);

		match node_address(&inventory, "web01", "ipaddress") {
			Err(ChefSshError::MissingAttribute { attribute, source }) => {
				assert_eq!(attribute, "ipaddress");
				assert!(matches!(source, AttributeError::Absent { .. }));
			}
			other => panic!("Expected MissingAttribute, got {other:?}"),
		}
	}

	#[test]
	fn test_node_attribute_wrong_type() {
		let mut inventory = FakeInventory::default();
		inventory
			.nodes
			.insert("web01".to_string(), node("web01", json!(167772165)));

		match node_address(&inventory, "web01", "ipaddress") {
			Err(ChefSshError::MissingAttribute { source, .. }) => {
				assert!(matches!(source, AttributeError::WrongType { .. }));
			}
			other => panic!("Expected MissingAttribute, got {other:?}"),
		}
	}

	#[test]
	fn test_role_address() {
		let inventory = with_rows(1, vec![node("build01", json!("10.1.0.1"))]);

		let address = role_address(&inventory, "build", "ipaddress").unwrap();

		assert_eq!(address, "10.1.0.1");
		assert_eq!(*inventory.calls.borrow(), vec!["search node:role:build"]);
	}

	#[test]
	fn test_role_picks_smallest_name() {
		let inventory = with_rows(
			3,
			vec![
				node("web03", json!("10.0.0.3")),
				json!({ "normal": { "ipaddress": "10.0.0.99" } }),
				node("web01", json!("10.0.0.1")),
				node("web02", json!("10.0.0.2")),
			],
		);

		let address = role_address(&inventory, "web", "ipaddress").unwrap();
		assert_eq!(address, "10.0.0.1");
	}

	#[test]
	fn test_role_without_nodes() {
		for inventory in [with_rows(0, vec![]), with_rows(2, vec![])] {
			match role_address(&inventory, "build", "ipaddress") {
				Err(ChefSshError::EntityNotInGroup { role }) => assert_eq!(role, "build"),
				other => panic!("Expected EntityNotInGroup, got {other:?}"),
			}
		}
	}

	#[test]
	fn test_role_search_failure() {
		let inventory = FakeInventory::default();

		match role_address(&inventory, "build", "ipaddress") {
			Err(ChefSshError::CouldNotQuery { query, .. }) => assert_eq!(query, "node:role:build"),
			other => panic!("Expected CouldNotQuery, got {other:?}"),
		}
	}

	#[test]
	fn test_role_row_missing_attribute() {
		let inventory = with_rows(1, vec![json!({ "name": "build01", "automatic": {} })]);

		assert!(matches!(
			role_address(&inventory, "build", "ipaddress"),
			Err(ChefSshError::MissingAttribute { .. })
		));
	}

	#[test]
	fn test_resolve_dispatches_on_kind() {
		let mut inventory = with_rows(1, vec![node("db01", json!("10.2.0.1"))]);
		inventory
			.nodes
			.insert("db02".to_string(), node("db02", json!("10.2.0.2")));

		let by_node = Lookup {
			kind: LookupKind::Node,
			name: "db02".to_string(),
		};
		let by_role = Lookup {
			kind: LookupKind::Role,
			name: "db".to_string(),
		};

		assert_eq!(resolve(&inventory, &by_node, "ipaddress").unwrap(), "10.2.0.2");
		assert_eq!(resolve(&inventory, &by_role, "ipaddress").unwrap(), "10.2.0.1");
		assert_eq!(
			*inventory.calls.borrow(),
			vec!["node db02", "search node:role:db"]
		);
	}
}
