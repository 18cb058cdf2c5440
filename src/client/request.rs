//! Authorized requests against the API.

// crates.io
use http::{
	HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
	header::{AUTHORIZATION, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	client::{APPLICATION_JSON, ApiClient, observed},
	envelope,
	error::ConfigError,
	http::{ApiHttpClient, HttpResponse},
	obs::OpKind,
};

/// Fallback message when an error body is empty or not JSON.
pub const UNKNOWN_API_ERROR: &str = "An unknown API error occurred";

/// Method, extra headers, and body of an authorized request.
///
/// `Authorization` and `Content-Type` are always set by the client; values supplied here for
/// either header are replaced.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
	/// HTTP method; defaults to `GET`.
	pub method: Method,
	/// Additional request headers.
	pub headers: HeaderMap,
	/// Raw request body.
	pub body: Option<Vec<u8>>,
}
impl RequestOptions {
	/// Options for a `GET` request without extra headers.
	pub fn get() -> Self {
		Self::default()
	}

	/// Options for the provided method.
	pub fn new(method: Method) -> Self {
		Self { method, ..Default::default() }
	}

	/// Adds a header, replacing earlier values under the same name.
	pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
		self.headers.insert(name, value);

		self
	}

	/// Sets a raw body.
	pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Serializes `body` as JSON.
	pub fn with_json<T>(mut self, body: &T) -> Result<Self, ConfigError>
	where
		T: ?Sized + Serialize,
	{
		self.body = Some(serde_json::to_vec(body)?);

		Ok(self)
	}
}

/// Successful response returned by [`ApiClient::request`].
#[derive(Clone, Debug)]
pub struct ApiResponse {
	status: StatusCode,
	headers: HeaderMap,
	body: Vec<u8>,
}
impl ApiResponse {
	/// Response status.
	pub fn status(&self) -> StatusCode {
		self.status
	}

	/// Response headers.
	pub fn headers(&self) -> &HeaderMap {
		&self.headers
	}

	/// Raw body bytes.
	pub fn body(&self) -> &[u8] {
		&self.body
	}

	/// Body decoded as UTF-8, replacing invalid sequences.
	pub fn text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	/// Decodes the body as JSON, reporting the failing path on mismatch.
	pub fn json<T>(&self) -> Result<T>
	where
		T: serde::de::DeserializeOwned,
	{
		envelope::decode(self.status.as_u16(), &self.body)
	}
}
impl From<HttpResponse> for ApiResponse {
	fn from(response: HttpResponse) -> Self {
		let (parts, body) = response.into_parts();

		Self { status: parts.status, headers: parts.headers, body }
	}
}

impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Sends an authorized request to `path` (relative to the base URL).
	///
	/// A valid token is obtained first, refreshing it if needed. Non-success statuses fail with
	/// [`Error::ApiRequest`] carrying the server message when one is present.
	pub async fn request(&self, path: &str, options: RequestOptions) -> Result<ApiResponse> {
		observed(OpKind::Request, "request", self.send_authorized(path, options)).await
	}

	async fn send_authorized(&self, path: &str, options: RequestOptions) -> Result<ApiResponse> {
		let token = self.valid_token().await?;
		let url = self.config.endpoint(path)?;
		let mut request = http::Request::builder()
			.method(options.method)
			.uri(url.as_str())
			.body(options.body.unwrap_or_default())
			.map_err(ConfigError::from)?;
		let mut authorization = HeaderValue::try_from(format!("Bearer {}", token.expose()))
			.map_err(ConfigError::from)?;

		authorization.set_sensitive(true);

		let headers = request.headers_mut();

		*headers = options.headers;
		headers.insert(AUTHORIZATION, authorization);
		headers.insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));

		let response = self.http_client.execute(request).await?;
		let status = response.status();

		if !status.is_success() {
			let status = status.as_u16();

			return Err(envelope::api_error(
				status,
				response.body(),
				|| UNKNOWN_API_ERROR.to_owned(),
				|| format!("API request to {path} failed with status {status}"),
			));
		}

		Ok(response.into())
	}
}
