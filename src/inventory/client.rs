use crate::config::Config;
use crate::error::{ChefSshError, RequestError, Result};
use crate::inventory::signing::RequestSigner;
use crate::inventory::{Inventory, SearchQuery, SearchResult};
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Chef client version advertised to the server.
const CHEF_VERSION: &str = "18.0.0";

/// Blocking client for the Chef server REST API.
#[derive(Debug)]
pub struct ChefClient {
	base: Url,
	signer: RequestSigner,
	http: Client,
}

impl ChefClient {
	/// Create a client for `server_url`, e.g.
	/// `https://chef.example.com/organizations/acme`.
	pub fn new(server_url: &str, signer: RequestSigner) -> Result<Self> {
		let base = Url::parse(server_url).map_err(|e| ChefSshError::ClientSetup {
			reason: format!("invalid server URL {server_url}: {e}"),
		})?;
		if base.cannot_be_a_base() {
			return Err(ChefSshError::ClientSetup {
				reason: format!("server URL {server_url} cannot be used as a base"),
			});
		}

		let http = Client::builder()
			.user_agent(concat!("chef-ssh/", env!("CARGO_PKG_VERSION")))
			.build()
			.map_err(|e| ChefSshError::ClientSetup {
				reason: e.to_string(),
			})?;

		Ok(ChefClient { base, signer, http })
	}

	/// Read the user's key and build a client from the configuration.
	pub fn from_config(config: &Config) -> Result<Self> {
		let signer = RequestSigner::from_key_file(config.user()?, config.user_key()?)?;
		Self::new(config.server_url()?, signer)
	}

	/// Base URL with `parts` appended as path segments (percent-encoded).
	pub fn endpoint(&self, parts: &[&str]) -> std::result::Result<Url, RequestError> {
		let mut url = self.base.clone();
		url.path_segments_mut()
			.map_err(|()| RequestError::InvalidUrl {
				base: self.base.to_string(),
			})?
			.pop_if_empty()
			.extend(parts);
		Ok(url)
	}

	fn get<T: DeserializeOwned>(&self, url: Url) -> std::result::Result<T, RequestError> {
		let headers = self
			.signer
			.sign("GET", url.path(), b"", chrono::Utc::now())?;

		log::debug!("GET {url}");
		let mut request = self
			.http
			.get(url)
			.header(ACCEPT, "application/json")
			.header("X-Chef-Version", CHEF_VERSION);
		for (name, value) in headers {
			request = request.header(name, value);
		}

		let response = request.send()?;
		let status = response.status();
		if !status.is_success() {
			let body = response.text().unwrap_or_default();
			return Err(RequestError::Status {
				status: status.as_u16(),
				body,
			});
		}

		Ok(response.json()?)
	}
}

impl Inventory for ChefClient {
	fn node(&self, name: &str) -> Result<Value> {
		self.endpoint(&["nodes", name])
			.and_then(|url| self.get(url))
			.map_err(|source| ChefSshError::CouldNotFetchEntity {
				name: name.to_string(),
				source,
			})
	}

	fn search(&self, query: &SearchQuery) -> Result<SearchResult> {
		self.endpoint(&["search", query.index.as_str()])
			.and_then(|mut url| {
				url.query_pairs_mut().extend_pairs(query.params());
				self.get(url)
			})
			.map_err(|source| ChefSshError::CouldNotQuery {
				query: query.to_string(),
				source,
			})
	}
}
