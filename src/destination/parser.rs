use reqwest::Url;
use std::fmt;

/// A parsed ssh destination, `[user@]host[:port]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
	pub user: Option<String>,
	pub host: String,
	pub port: Option<u16>,
}

impl Destination {
	/// Parse a command-line token by reading it as `ssh://<token>`.
	///
	/// Returns `None` when the token is not valid URL authority syntax
	/// (bad port, forbidden characters, ...). Passwords, paths and queries
	/// are dropped; IPv6 brackets are removed from the host. The user is kept
	/// exactly as typed, since `Url::username` percent-encodes characters such
	/// as `@` and `=`.
	pub fn parse(token: &str) -> Option<Self> {
		let url = Url::parse(&format!("ssh://{token}")).ok()?;
		let host = url.host_str()?;
		let host = host
			.strip_prefix('[')
			.and_then(|inner| inner.strip_suffix(']'))
			.unwrap_or(host);

		Some(Destination {
			user: raw_username(token).map(str::to_string),
			host: host.to_string(),
			port: url.port(),
		})
	}

	/// Same user and port, different host.
	pub fn with_host(&self, host: impl Into<String>) -> Self {
		Destination {
			user: self.user.clone(),
			host: host.into(),
			port: self.port,
		}
	}
}

/// The userinfo before the last `@` of the authority, up to its first `:`.
fn raw_username(token: &str) -> Option<&str> {
	let authority = token.split(['/', '?', '#']).next().unwrap_or(token);
	let (userinfo, _) = authority.rsplit_once('@')?;
	let name = userinfo.split(':').next().unwrap_or(userinfo);
	(!name.is_empty()).then_some(name)
}

impl fmt::Display for Destination {
	/// Formats as `[user@]host[:port]`, bracketing IPv6 hosts when a port follows.
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if let Some(ref user) = self.user {
			write!(f, "{user}@")?;
		}
		match self.port {
			Some(port) if self.host.contains(':') => write!(f, "[{}]:{port}", self.host),
			Some(port) => write!(f, "{}:{port}", self.host),
			None => f.write_str(&self.host),
		}
	}
}
