//! Client-level error types shared across requests, refresh, account flows, and stores.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration or request-construction problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, timeouts).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Input rejected before any request was sent.
	#[error(transparent)]
	Validation(#[from] ValidationError),

	/// No usable access token could be obtained; the caller should sign in again.
	#[error("Session expired. Please login again.")]
	SessionExpired,
	/// The API answered with a non-success status (or a failing envelope code).
	#[error("{message}")]
	ApiRequest {
		/// HTTP status code returned by the API.
		status: u16,
		/// Server-provided message, or a generic fallback.
		message: String,
	},
	/// A successful response body did not match the expected shape.
	#[error("API response could not be parsed.")]
	ResponseParse {
		/// Structured parsing failure including the JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
	/// A successful response omitted a field the flow depends on.
	#[error("API response is missing `{field}`.")]
	IncompleteResponse {
		/// Wire name of the missing field.
		field: &'static str,
	},
	/// A password reset email was sent recently; the caller must wait.
	#[error("Password reset requests are cooling down for another {remaining}.")]
	CooldownActive {
		/// Time left before another request is allowed.
		remaining: Duration,
	},
	/// Another password reset request from this client has not finished yet.
	#[error("A password reset request is already in progress.")]
	ResendInFlight,
}
impl Error {
	/// Returns `true` when the error means the stored session is no longer usable.
	pub fn is_session_expired(&self) -> bool {
		matches!(self, Self::SessionExpired)
	}

	/// HTTP status attached to the error, when one is known.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::ApiRequest { status, .. } | Self::ResponseParse { status, .. } => Some(*status),
			_ => None,
		}
	}
}

/// Configuration and request-construction failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] http::Error),
	/// A header value contains characters that cannot be sent.
	#[error("Header value is invalid.")]
	InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
	/// Base URL cannot be parsed.
	#[error("Base URL is invalid.")]
	InvalidBaseUrl {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Base URL uses a scheme other than http or https.
	#[error("Base URL must use http or https, got `{scheme}`.")]
	UnsupportedScheme {
		/// Scheme found in the configured URL.
		scheme: String,
	},
	/// Base URL carries a query string or fragment.
	#[error("Base URL must not contain a query or fragment.")]
	BaseUrlHasQuery,
	/// Endpoint path could not be joined onto the base URL.
	#[error("Endpoint `{path}` is invalid.")]
	InvalidEndpoint {
		/// Path supplied by the caller.
		path: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Request body could not be serialized.
	#[error("Request body could not be encoded.")]
	BodyEncode(#[from] serde_json::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Client-side input rules enforced before contacting the API.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// Username length falls outside the accepted range.
	#[error("Username must be between {min} and {max} characters.")]
	UsernameLength {
		/// Minimum accepted length.
		min: usize,
		/// Maximum accepted length.
		max: usize,
	},
	/// Email address does not look like `local@domain.tld`.
	#[error("Email address is invalid.")]
	InvalidEmail,
	/// Password is shorter than the accepted minimum.
	#[error("Password must be at least {min} characters.")]
	PasswordTooShort {
		/// Minimum accepted length.
		min: usize,
	},
	/// Password and confirmation differ.
	#[error("Passwords do not match.")]
	PasswordMismatch,
	/// Reset token is empty.
	#[error("Reset token is missing.")]
	MissingResetToken,
}
