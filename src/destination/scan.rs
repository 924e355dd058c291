use std::ffi::OsString;

/// Index of the destination argument: the first one not starting with `-`.
///
/// Flag values are not understood: in `ssh -p 2222 host` the destination found
/// is `2222`. Such tokens never carry the domain tag, so they fall through to
/// the client untouched.
pub fn find_destination(args: &[OsString]) -> Option<usize> {
	args.iter()
		.position(|arg| !arg.as_encoded_bytes().starts_with(b"-"))
}
