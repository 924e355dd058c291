//! Chef server request signing, authentication protocol version 1.3.
//!
//! Each request carries the user id, a timestamp and a SHA-256 hash of the
//! body, and an RSA PKCS#1 v1.5 signature over a canonical string built from
//! those. The base64 signature is spread over `X-Ops-Authorization-N` headers
//! of at most 60 characters each.

use crate::error::{ChefSshError, Result};
use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use chrono::{DateTime, Utc};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha2::{Digest, Sha256};
use std::path::Path;

pub const SIGN_VERSION: &str = "1.3";
pub const SERVER_API_VERSION: &str = "1";

const AUTHORIZATION_LINE_WIDTH: usize = 60;

/// Signs requests on behalf of one Chef user.
pub struct RequestSigner {
	user: String,
	key: RsaPrivateKey,
}

impl std::fmt::Debug for RequestSigner {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("RequestSigner")
			.field("user", &self.user)
			.finish_non_exhaustive()
	}
}

impl RequestSigner {
	pub fn new(user: impl Into<String>, key: RsaPrivateKey) -> Self {
		RequestSigner {
			user: user.into(),
			key,
		}
	}

	/// Read and parse the user's PEM key. PKCS#1 (`BEGIN RSA PRIVATE KEY`) is
	/// what Chef hands out; PKCS#8 is accepted too.
	pub fn from_key_file(user: &str, path: &Path) -> Result<Self> {
		let pem = std::fs::read_to_string(path).map_err(|source| ChefSshError::KeyReadError {
			path: path.to_path_buf(),
			source,
		})?;

		let key = RsaPrivateKey::from_pkcs1_pem(&pem)
			.or_else(|_| RsaPrivateKey::from_pkcs8_pem(&pem))
			.map_err(|source| ChefSshError::InvalidKey {
				path: path.to_path_buf(),
				source,
			})?;

		Ok(Self::new(user, key))
	}

	pub fn user(&self) -> &str {
		&self.user
	}

	/// Authentication headers for one request.
	pub fn sign(
		&self,
		method: &str,
		path: &str,
		body: &[u8],
		timestamp: DateTime<Utc>,
	) -> std::result::Result<Vec<(String, String)>, rsa::Error> {
		let content_hash = content_hash(body);
		let timestamp = format_timestamp(timestamp);
		let canonical = string_to_sign(method, path, &content_hash, &timestamp, &self.user);

		let digest = Sha256::digest(canonical.as_bytes());
		let signature = self.key.sign(Pkcs1v15Sign::new::<Sha256>(), &digest)?;

		let mut headers = vec![
			(
				"X-Ops-Sign".to_string(),
				format!("algorithm=sha256;version={SIGN_VERSION}"),
			),
			("X-Ops-Userid".to_string(), self.user.clone()),
			("X-Ops-Timestamp".to_string(), timestamp),
			("X-Ops-Content-Hash".to_string(), content_hash),
			(
				"X-Ops-Server-API-Version".to_string(),
				SERVER_API_VERSION.to_string(),
			),
		];
		headers.extend(
			authorization_lines(&BASE64_STANDARD.encode(signature))
				.into_iter()
				.enumerate()
				.map(|(i, line)| (format!("X-Ops-Authorization-{}", i + 1), line)),
		);

		Ok(headers)
	}
}

/// Base64 SHA-256 of the request body.
pub fn content_hash(body: &[u8]) -> String {
	BASE64_STANDARD.encode(Sha256::digest(body))
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
	timestamp.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Path as the server sees it: no repeated slashes, no trailing slash.
pub fn canonical_path(path: &str) -> String {
	let mut canonical = String::with_capacity(path.len());
	for c in path.chars() {
		if c == '/' && canonical.ends_with('/') {
			continue;
		}
		canonical.push(c);
	}
	if canonical.len() > 1 && canonical.ends_with('/') {
		canonical.pop();
	}
	canonical
}

pub fn string_to_sign(
	method: &str,
	path: &str,
	content_hash: &str,
	timestamp: &str,
	user: &str,
) -> String {
	[
		format!("Method:{}", method.to_uppercase()),
		format!("Path:{}", canonical_path(path)),
		format!("X-Ops-Content-Hash:{content_hash}"),
		format!("X-Ops-Sign:version={SIGN_VERSION}"),
		format!("X-Ops-Timestamp:{timestamp}"),
		format!("X-Ops-UserId:{user}"),
		format!("X-Ops-Server-API-Version:{SERVER_API_VERSION}"),
	]
	.join("\n")
}

fn authorization_lines(signature: &str) -> Vec<String> {
	signature
		.as_bytes()
		.chunks(AUTHORIZATION_LINE_WIDTH)
		.map(|chunk| String::from_utf8_lossy(chunk).into_owned())
		.collect()
}
