//! Client configuration: API base URL and resend cooldown policy.

// self
use crate::{_prelude::*, cooldown::CooldownPolicy, error::ConfigError};

/// Base URL used when no other is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";

/// Settings shared by every request an [`ApiClient`](crate::client::ApiClient) makes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// API root; endpoint paths are appended to it verbatim.
	pub base_url: Url,
	/// Throttle applied to forgot-password requests.
	pub cooldown: CooldownPolicy,
}
impl ClientConfig {
	/// Creates a configuration for the provided base URL.
	pub fn new(base_url: &str) -> Result<Self, ConfigError> {
		Ok(Self { base_url: parse_base_url(base_url)?, cooldown: CooldownPolicy::default() })
	}

	/// Replaces the base URL after validating it.
	pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
		self.base_url = parse_base_url(base_url)?;

		Ok(self)
	}

	/// Replaces the forgot-password cooldown policy.
	pub fn with_cooldown(mut self, cooldown: CooldownPolicy) -> Self {
		self.cooldown = cooldown;

		self
	}

	/// Resolves `path` (e.g. `/users/me`) against the base URL.
	///
	/// Paths are appended rather than joined so the base URL's own path (`/api/v1`) is kept.
	pub fn endpoint(&self, path: &str) -> Result<Url, ConfigError> {
		let base = self.base_url.as_str().trim_end_matches('/');
		let joined = if path.starts_with('/') {
			format!("{base}{path}")
		} else {
			format!("{base}/{path}")
		};

		Url::parse(&joined)
			.map_err(|source| ConfigError::InvalidEndpoint { path: path.to_owned(), source })
	}
}
impl Default for ClientConfig {
	fn default() -> Self {
		Self {
			base_url: Url::parse(DEFAULT_BASE_URL).expect("Default base URL must parse."),
			cooldown: CooldownPolicy::default(),
		}
	}
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
	let url = Url::parse(raw).map_err(|source| ConfigError::InvalidBaseUrl { source })?;

	if !matches!(url.scheme(), "http" | "https") {
		return Err(ConfigError::UnsupportedScheme { scheme: url.scheme().to_owned() });
	}
	if url.query().is_some() || url.fragment().is_some() {
		return Err(ConfigError::BaseUrlHasQuery);
	}

	Ok(url)
}
