//! The uniform `{code, data, message, status, timestamp}` wrapper around API bodies.

// self
use crate::_prelude::*;

/// Wrapper the API places around every successful response body.
///
/// Metadata fields default when absent; `data` is required unless `T` is an [`Option`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResult<T> {
	/// Application-level status code (mirrors the HTTP status on success).
	#[serde(default)]
	pub code: i64,
	/// Endpoint-specific payload.
	pub data: T,
	/// Human-readable summary.
	#[serde(default)]
	pub message: String,
	/// Textual status label.
	#[serde(default)]
	pub status: String,
	/// Server-formatted timestamp.
	#[serde(default)]
	pub timestamp: String,
}
impl<T> ApiResult<T> {
	/// Returns `true` when `code` is unset or reports success.
	pub fn is_success_code(&self) -> bool {
		matches!(self.code, 0 | 200)
	}

	/// Discards the metadata and keeps the payload.
	pub fn into_data(self) -> T {
		self.data
	}
}

/// Error body shape: only the message matters to the client.
#[derive(Clone, Debug, Default, Deserialize)]
struct ErrorBody {
	#[serde(default)]
	message: Option<String>,
}

/// Builds an [`Error::ApiRequest`] preferring the server message.
///
/// `unparseable` is used when the body is empty or not JSON; `missing` when it is JSON without
/// a non-blank message.
pub(crate) fn api_error(
	status: u16,
	body: &[u8],
	unparseable: impl FnOnce() -> String,
	missing: impl FnOnce() -> String,
) -> Error {
	let message = match serde_json::from_slice::<ErrorBody>(body) {
		Ok(ErrorBody { message: Some(message) }) if !message.trim().is_empty() => message,
		Ok(_) => missing(),
		Err(_) => unparseable(),
	};

	Error::ApiRequest { status, message }
}

/// Decodes a JSON body, reporting the failing path on error.
pub(crate) fn decode<T>(status: u16, body: &[u8]) -> Result<T>
where
	T: serde::de::DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de)
		.map_err(|source| Error::ResponseParse { source, status })
}
