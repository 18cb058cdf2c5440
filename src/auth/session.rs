//! Persisted session state: the token pair and the cached user summary.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Access/refresh credentials persisted between requests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenPair {
	/// Short-lived bearer credential with an embedded `exp` claim.
	pub access_token: TokenSecret,
	/// Longer-lived credential used only to mint new access tokens; some sign-up responses omit
	/// it.
	pub refresh_token: Option<TokenSecret>,
}
impl TokenPair {
	/// Builds a pair carrying both tokens.
	pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
		Self {
			access_token: TokenSecret::new(access_token),
			refresh_token: Some(TokenSecret::new(refresh_token)),
		}
	}

	/// Builds a pair without a refresh token.
	pub fn access_only(access_token: impl Into<String>) -> Self {
		Self { access_token: TokenSecret::new(access_token), refresh_token: None }
	}
}

/// User identifier as issued by the API, which may encode it as a number or a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
	/// Numeric identifier.
	Numeric(i64),
	/// Opaque string identifier (e.g. a UUID).
	Text(String),
}
impl Display for UserId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Numeric(id) => write!(f, "{id}"),
			Self::Text(id) => f.write_str(id),
		}
	}
}

/// User summary cached under the `user` storage key after registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUser {
	/// Display name chosen at registration.
	pub username: String,
	/// Contact email.
	pub email: String,
	/// Server-side identifier, when the API returned one.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<UserId>,
}
