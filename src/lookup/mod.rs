//! Hostname classification for chef-ssh.
//!
//! A hostname is ours when it ends with the configured domain tag. What is
//! left must then end with `.node` (fetch that node) or `.role` (search for a
//! node in that role).

pub mod classifier;

pub use classifier::{Lookup, LookupKind, classify, strip_domain_tag};
