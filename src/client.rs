//! The authenticated API client and its operations.
//!
//! [`ApiClient`] owns the transport, the session store, the configuration, and the refresh
//! single-flight slot. Clones share all of them, so every clone observes the same in-flight
//! refresh.

pub mod account;
pub mod refresh;
pub mod request;

pub use account::*;
pub use refresh::*;
pub use request::*;

// crates.io
use http::{
	Method,
	header::{ACCEPT, CONTENT_TYPE},
};
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	config::ClientConfig,
	cooldown::ResendCooldown,
	error::ConfigError,
	http::{ApiHttpClient, HttpRequest},
	obs::{self, OpKind, OpOutcome, OpSpan},
	singleflight::SingleFlight,
	store::SessionStore,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

pub(crate) const APPLICATION_JSON: &str = "application/json";

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestApiClient = ApiClient<ReqwestHttpClient>;

/// Authenticated client for the NexusPlay API.
///
/// Every authorized call goes through [`ApiClient::request`], which obtains a bearer token via
/// [`ApiClient::valid_token`]. Expired tokens are refreshed through a single shared flight, so
/// concurrent callers trigger at most one call to the refresh endpoint.
pub struct ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// HTTP transport used for every outbound request.
	pub http_client: Arc<C>,
	/// Session storage holding the token pair and cached user.
	pub store: Arc<dyn SessionStore>,
	/// Base URL and policies.
	pub config: ClientConfig,
	/// Shared counters for refresh outcomes.
	pub refresh_metrics: Arc<RefreshMetrics>,
	refresh_flight: Arc<SingleFlight<Option<TokenSecret>>>,
	reset_cooldown: Arc<Mutex<ResendCooldown>>,
}
impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Creates a client around a caller-provided transport.
	pub fn with_http_client(
		store: Arc<dyn SessionStore>,
		config: ClientConfig,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		let reset_cooldown = ResendCooldown::new(config.cooldown);

		Self {
			http_client: http_client.into(),
			store,
			config,
			refresh_metrics: Default::default(),
			refresh_flight: Default::default(),
			reset_cooldown: Arc::new(Mutex::new(reset_cooldown)),
		}
	}

	/// Returns `true` while a token refresh is outstanding.
	pub fn refresh_in_flight(&self) -> bool {
		self.refresh_flight.in_flight()
	}

	/// Builds an unauthenticated JSON request for `path`.
	pub(crate) fn json_request<B>(
		&self,
		method: Method,
		path: &str,
		body: &B,
	) -> Result<HttpRequest, ConfigError>
	where
		B: ?Sized + Serialize,
	{
		let url = self.config.endpoint(path)?;
		let body = serde_json::to_vec(body)?;

		Ok(http::Request::builder()
			.method(method)
			.uri(url.as_str())
			.header(CONTENT_TYPE, APPLICATION_JSON)
			.header(ACCEPT, APPLICATION_JSON)
			.body(body)?)
	}

	/// Builds an unauthenticated `GET` request for a fully resolved URL.
	pub(crate) fn get_request(&self, url: &Url) -> Result<HttpRequest, ConfigError> {
		Ok(http::Request::builder()
			.method(Method::GET)
			.uri(url.as_str())
			.header(ACCEPT, APPLICATION_JSON)
			.body(Vec::new())?)
	}
}
#[cfg(feature = "reqwest")]
impl ApiClient<ReqwestHttpClient> {
	/// Creates a client that provisions its own reqwest-backed transport.
	pub fn new(store: Arc<dyn SessionStore>, config: ClientConfig) -> Self {
		Self::with_http_client(store, config, ReqwestHttpClient::default())
	}
}
impl<C> Clone for ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			store: self.store.clone(),
			config: self.config.clone(),
			refresh_metrics: self.refresh_metrics.clone(),
			refresh_flight: self.refresh_flight.clone(),
			reset_cooldown: self.reset_cooldown.clone(),
		}
	}
}
impl<C> Debug for ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ApiClient")
			.field("base_url", &self.config.base_url.as_str())
			.field("refresh_in_flight", &self.refresh_flight.in_flight())
			.finish()
	}
}

/// Runs `fut` inside an operation span and records its attempt and outcome.
pub(crate) async fn observed<T, Fut>(kind: OpKind, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OpSpan::new(kind, stage);

	obs::record_op_outcome(kind, OpOutcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => obs::record_op_outcome(kind, OpOutcome::Success),
		Err(_) => obs::record_op_outcome(kind, OpOutcome::Failure),
	}

	result
}
