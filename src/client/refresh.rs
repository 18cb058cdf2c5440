//! Token validity checks and access token refresh behind a singleflight guard.
//!
//! [`ApiClient::valid_token`] returns the stored access token while its `exp` claim lies in
//! the future. Otherwise it joins the refresh already in flight, or starts one; all callers
//! that overlap with a refresh receive its single outcome. A refresh that the API rejects
//! clears both stored tokens, which moves the session to the logged-out state.

mod metrics;

pub use metrics::RefreshMetrics;

// crates.io
use http::Method;
// self
use crate::{
	_prelude::*,
	auth::{TokenSecret, claims},
	client::ApiClient,
	envelope::{self, ApiResult},
	http::ApiHttpClient,
	obs::{self, OpKind, OpOutcome, OpSpan, RefreshFailure},
	store::StoreError,
};

/// Refresh endpoint, relative to the base URL.
pub const REFRESH_TOKEN_PATH: &str = "/auth/refresh-token";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenBody<'a> {
	refresh_token: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshedToken {
	#[serde(default)]
	access_token: Option<String>,
}

impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Returns a usable access token, refreshing it when it is missing or expired.
	///
	/// Fails with [`Error::SessionExpired`] when no token can be obtained.
	pub async fn valid_token(&self) -> Result<TokenSecret> {
		if let Some(token) = self.unexpired_access_token()? {
			return Ok(token);
		}

		// A flight that finished between the read above and joining the slot may already have
		// stored a fresh token.
		self.refresh_flight
			.run(|| async {
				match self.unexpired_access_token() {
					Ok(Some(token)) => Some(token),
					_ => self.refresh_access_token().await,
				}
			})
			.await
			.ok_or(Error::SessionExpired)
	}

	fn unexpired_access_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self
			.store
			.access_token()?
			.filter(|token| !claims::is_token_expired(token.expose())))
	}

	/// Exchanges the stored refresh token for a new access token and stores it.
	///
	/// Returns `None` when no refresh token is stored (without any request), when the API
	/// rejects the refresh (both stored tokens are removed), or when the transport, body, or
	/// storage fails. Failures never propagate as errors.
	///
	/// Calling this directly bypasses the singleflight guard; use [`ApiClient::valid_token`]
	/// from concurrent code.
	pub async fn refresh_access_token(&self) -> Option<TokenSecret> {
		const KIND: OpKind = OpKind::Refresh;

		let span = OpSpan::new(KIND, "refresh_access_token");

		obs::record_op_outcome(KIND, OpOutcome::Attempt);
		self.refresh_metrics.record_started();

		let outcome = span.instrument(self.exchange_refresh_token()).await;

		self.refresh_metrics.record_finished(outcome.is_ok());

		match outcome {
			Ok(token) => {
				obs::record_op_outcome(KIND, OpOutcome::Success);

				Some(token)
			},
			Err(reason) => {
				obs::record_refresh_failure(reason);
				obs::record_op_outcome(KIND, OpOutcome::Failure);

				None
			},
		}
	}

	async fn exchange_refresh_token(&self) -> Result<TokenSecret, RefreshFailure> {
		let refresh_token = match self.store.refresh_token() {
			Ok(Some(token)) => token,
			Ok(None) =>
				return Err(refresh_failed(
					RefreshFailure::MissingRefreshToken,
					"no refresh token is stored",
				)),
			Err(e) => return Err(refresh_failed(RefreshFailure::Storage, e)),
		};
		let request = self
			.json_request(
				Method::POST,
				REFRESH_TOKEN_PATH,
				&RefreshTokenBody { refresh_token: refresh_token.expose() },
			)
			.map_err(|e| refresh_failed(RefreshFailure::InvalidRequest, e))?;
		let response = self
			.http_client
			.execute(request)
			.await
			.map_err(|e| refresh_failed(RefreshFailure::Transport, e))?;
		let status = response.status();

		if !status.is_success() {
			if let Err(e) = self.store.clear_tokens() {
				obs::log_refresh_failure(RefreshFailure::Storage, &e);
			}

			return Err(refresh_failed(
				RefreshFailure::Rejected,
				format_args!("refresh endpoint answered {}", status.as_u16()),
			));
		}

		let envelope: ApiResult<Option<RefreshedToken>> =
			envelope::decode(status.as_u16(), response.body())
				.map_err(|e| refresh_failed(RefreshFailure::InvalidResponse, e))?;
		let access_token = envelope
			.data
			.and_then(|data| data.access_token)
			.filter(|token| !token.is_empty())
			.map(TokenSecret::new)
			.ok_or_else(|| {
				refresh_failed(
					RefreshFailure::MissingAccessToken,
					"refresh response carried no access token",
				)
			})?;

		self.store
			.save_access_token(&access_token)
			.map_err(|e| refresh_failed(RefreshFailure::Storage, e))?;

		Ok(access_token)
	}
}

fn refresh_failed(reason: RefreshFailure, detail: impl Display) -> RefreshFailure {
	obs::log_refresh_failure(reason, &detail);

	reason
}
