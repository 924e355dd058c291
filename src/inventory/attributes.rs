use serde_json::Value;

/// Why an attribute could not be read as a string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
	#[error("attribute `{path}` is not set")]
	Absent { path: String },

	#[error("attribute `{path}` is {found}, expected a string")]
	WrongType { path: String, found: &'static str },
}

/// Read the string at `path` inside a nested JSON object.
///
/// A missing key or an explicit `null` anywhere along the path is `Absent`.
/// A non-object in the middle of the path, or a non-string at the end, is
/// `WrongType`.
pub fn string_at<'a>(value: &'a Value, path: &[&str]) -> Result<&'a str, AttributeError> {
	let mut current = value;

	for (depth, segment) in path.iter().enumerate() {
		let object = current
			.as_object()
			.ok_or_else(|| AttributeError::WrongType {
				path: path[..depth].join("."),
				found: type_name(current),
			})?;

		current = object
			.get(*segment)
			.filter(|value| !value.is_null())
			.ok_or_else(|| AttributeError::Absent {
				path: path[..=depth].join("."),
			})?;
	}

	current.as_str().ok_or_else(|| AttributeError::WrongType {
		path: path.join("."),
		found: type_name(current),
	})
}

fn type_name(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}
