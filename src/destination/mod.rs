//! Destination handling for chef-ssh.
//!
//! This module handles:
//! - Finding the destination token in an ssh argument vector
//! - Parsing `[user@]host[:port]` and writing it back out
//! - Patching the argument vector with a resolved address

pub mod parser;
pub mod rewriter;
pub mod scan;

pub use parser::Destination;
pub use rewriter::rewrite_destination;
pub use scan::find_destination;
