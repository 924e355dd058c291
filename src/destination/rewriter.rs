use crate::destination::parser::Destination;
use std::ffi::OsString;

/// Substitute `address` for the destination host and write the result back
/// into `args` at `index`.
///
/// Returns the new token, or `None` when `index` is out of range (in which
/// case `args` is left untouched).
pub fn rewrite_destination(
	args: &mut [OsString],
	index: usize,
	destination: &Destination,
	address: &str,
) -> Option<String> {
	let slot = args.get_mut(index)?;
	let rewritten = destination.with_host(address).to_string();
	*slot = OsString::from(&rewritten);
	Some(rewritten)
}
