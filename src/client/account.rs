//! Account flows: registration, password reset, and the signed-in user.
//!
//! Input rules are checked locally before any request leaves the client. Registration persists
//! the issued tokens and a [`StoredUser`] summary; the reset flows never touch stored tokens.

// crates.io
use http::Method;
// self
use crate::{
	_prelude::*,
	auth::{StoredUser, TokenPair, UserId},
	client::{ApiClient, RequestOptions, observed},
	cooldown::{ResendBlocked, ResendCooldown, ResendTicket},
	envelope::{self, ApiResult},
	error::ValidationError,
	http::{ApiHttpClient, HttpResponse},
	obs::OpKind,
};

/// Shortest accepted username.
pub const USERNAME_MIN_LEN: usize = 3;
/// Longest accepted username.
pub const USERNAME_MAX_LEN: usize = 50;
/// Shortest accepted password.
pub const PASSWORD_MIN_LEN: usize = 6;

const SIGN_UP_PATH: &str = "/auth/sign-up";
const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";
const VERIFY_RESET_TOKEN_PATH: &str = "/auth/reset-password/verify";
const RESET_PASSWORD_PATH: &str = "/auth/reset-password";
const CURRENT_USER_PATH: &str = "/users/me";

/// Registration form submitted to the sign-up endpoint.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct SignUpRequest {
	/// Requested display name.
	pub username: String,
	/// Contact email.
	pub email: String,
	/// Plain-text password; only ever sent to the API.
	pub password: String,
}
impl SignUpRequest {
	/// Builds a registration form.
	pub fn new(
		username: impl Into<String>,
		email: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		Self { username: username.into(), email: email.into(), password: password.into() }
	}

	/// Checks the username, email, and password rules.
	pub fn validate(&self) -> Result<(), ValidationError> {
		let username_len = self.username.trim().chars().count();

		if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&username_len) {
			return Err(ValidationError::UsernameLength {
				min: USERNAME_MIN_LEN,
				max: USERNAME_MAX_LEN,
			});
		}

		validate_email(&self.email)?;
		validate_password(&self.password)
	}
}
impl Debug for SignUpRequest {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SignUpRequest")
			.field("username", &self.username)
			.field("email", &self.email)
			.field("password", &"<redacted>")
			.finish()
	}
}

/// Profile of the signed-in user as returned by `/users/me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
	/// Server-side identifier.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<UserId>,
	/// Display name.
	pub username: String,
	/// Contact email.
	pub email: String,
	/// Granted roles.
	#[serde(default)]
	pub roles: Vec<String>,
	/// Account creation time, as formatted by the server.
	#[serde(default)]
	pub created_at: Option<String>,
	/// Last sign-in time, as formatted by the server.
	#[serde(default)]
	pub last_login_at: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignUpData {
	#[serde(default)]
	access_token: Option<String>,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	username: Option<String>,
	#[serde(default)]
	email: Option<String>,
	#[serde(default)]
	id: Option<UserId>,
}

#[derive(Serialize)]
struct ForgotPasswordBody<'a> {
	email: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordBody<'a> {
	token: &'a str,
	new_password: &'a str,
}

impl<C> ApiClient<C>
where
	C: ?Sized + ApiHttpClient,
{
	/// Registers a new account, then stores its tokens and user summary.
	pub async fn sign_up(&self, form: &SignUpRequest) -> Result<StoredUser> {
		observed(OpKind::SignUp, "sign_up", async {
			form.validate()?;

			let request = self.json_request(Method::POST, SIGN_UP_PATH, form)?;
			let response = self.http_client.execute(request).await?;
			let response = ensure_success(response, "Registration failed")?;
			let envelope: ApiResult<Option<SignUpData>> =
				envelope::decode(response.status().as_u16(), response.body())?;

			if !envelope.is_success_code() {
				let status = u16::try_from(envelope.code)
					.ok()
					.filter(|code| (100..=599).contains(code))
					.unwrap_or(response.status().as_u16());
				let message = if envelope.message.trim().is_empty() {
					"Registration failed".to_owned()
				} else {
					envelope.message
				};

				return Err(Error::ApiRequest { status, message });
			}

			let data = envelope.data.ok_or(Error::IncompleteResponse { field: "accessToken" })?;
			let access_token = data
				.access_token
				.filter(|token| !token.is_empty())
				.ok_or(Error::IncompleteResponse { field: "accessToken" })?;
			let pair = match data.refresh_token.filter(|token| !token.is_empty()) {
				Some(refresh_token) => TokenPair::new(access_token, refresh_token),
				None => TokenPair::access_only(access_token),
			};
			let user = StoredUser {
				username: data.username.unwrap_or_else(|| form.username.clone()),
				email: data.email.unwrap_or_else(|| form.email.clone()),
				id: data.id,
			};

			self.store.save_tokens(&pair)?;
			self.store.save_user(&user)?;

			Ok(user)
		})
		.await
	}

	/// Asks the API to email a password reset link, subject to the resend cooldown.
	///
	/// Only successful sends start a cooldown; the returned ticket describes it. While one call
	/// is outstanding, concurrent calls fail with [`Error::ResendInFlight`] without sending.
	pub async fn forgot_password(&self, email: &str) -> Result<ResendTicket> {
		observed(OpKind::ForgotPassword, "forgot_password", async {
			let reservation = ResendReservation::acquire(&self.reset_cooldown)?;
			let email = email.trim();

			validate_email(email)?;

			let request =
				self.json_request(Method::POST, FORGOT_PASSWORD_PATH, &ForgotPasswordBody { email })?;
			let response = self.http_client.execute(request).await?;

			ensure_success(response, "An error occurred")?;

			Ok(reservation.commit())
		})
		.await
	}

	/// Time left before [`ApiClient::forgot_password`] may send again.
	pub fn forgot_password_cooldown(&self) -> Option<Duration> {
		self.reset_cooldown.lock().remaining_at(OffsetDateTime::now_utc())
	}

	/// Returns whether the API still accepts `token` for a password reset.
	pub async fn verify_reset_token(&self, token: &str) -> Result<bool> {
		observed(OpKind::VerifyResetToken, "verify_reset_token", async {
			if token.is_empty() {
				return Err(ValidationError::MissingResetToken.into());
			}

			let mut url = self.config.endpoint(VERIFY_RESET_TOKEN_PATH)?;

			url.query_pairs_mut().append_pair("token", token);

			let response = self.http_client.execute(self.get_request(&url)?).await?;
			let status = response.status().as_u16();

			if !response.status().is_success() {
				let fallback = || format!("HTTP error! status: {status}");

				return Err(envelope::api_error(status, response.body(), fallback, fallback));
			}

			let envelope: ApiResult<Option<serde_json::Value>> =
				envelope::decode(status, response.body())?;

			Ok(envelope
				.data
				.and_then(|data| data.get("valid").and_then(serde_json::Value::as_bool))
				.unwrap_or(false))
		})
		.await
	}

	/// Sets a new password using a reset token.
	pub async fn reset_password(
		&self,
		token: &str,
		new_password: &str,
		confirmation: &str,
	) -> Result<()> {
		observed(OpKind::ResetPassword, "reset_password", async {
			if token.is_empty() {
				return Err(ValidationError::MissingResetToken.into());
			}
			if new_password != confirmation {
				return Err(ValidationError::PasswordMismatch.into());
			}

			validate_password(new_password)?;

			let request = self.json_request(
				Method::POST,
				RESET_PASSWORD_PATH,
				&ResetPasswordBody { token, new_password },
			)?;
			let response = self.http_client.execute(request).await?;

			ensure_success(response, "Failed to reset password")?;

			Ok(())
		})
		.await
	}

	/// Fetches the signed-in user's profile through the authorized request path.
	pub async fn current_user(&self) -> Result<ApiResult<UserProfile>> {
		self.request(CURRENT_USER_PATH, RequestOptions::get()).await?.json()
	}

	/// Removes the stored tokens and user summary.
	pub fn sign_out(&self) -> Result<()> {
		Ok(self.store.clear_session()?)
	}

	/// User summary stored at registration, if any.
	pub fn stored_user(&self) -> Result<Option<StoredUser>> {
		Ok(self.store.user()?)
	}
}

/// Outstanding forgot-password send; dropping it without [`ResendReservation::commit`] frees the
/// slot without counting a send.
struct ResendReservation<'a> {
	cooldown: &'a Mutex<ResendCooldown>,
	committed: bool,
}
impl<'a> ResendReservation<'a> {
	fn acquire(cooldown: &'a Mutex<ResendCooldown>) -> Result<Self> {
		match cooldown.lock().reserve_at(OffsetDateTime::now_utc()) {
			Ok(()) => Ok(Self { cooldown, committed: false }),
			Err(ResendBlocked::Cooldown(remaining)) => Err(Error::CooldownActive { remaining }),
			Err(ResendBlocked::InFlight) => Err(Error::ResendInFlight),
		}
	}

	fn commit(mut self) -> ResendTicket {
		self.committed = true;

		self.cooldown.lock().record_sent_at(OffsetDateTime::now_utc())
	}
}
impl Drop for ResendReservation<'_> {
	fn drop(&mut self) {
		if !self.committed {
			self.cooldown.lock().release();
		}
	}
}

/// Passes successful responses through; otherwise builds an [`Error::ApiRequest`] whose message
/// falls back to `fallback`.
fn ensure_success(response: HttpResponse, fallback: &str) -> Result<HttpResponse> {
	if response.status().is_success() {
		return Ok(response);
	}

	let fallback = || fallback.to_owned();

	Err(envelope::api_error(response.status().as_u16(), response.body(), fallback, fallback))
}

/// Accepts addresses shaped like `local@domain.tld`.
fn validate_email(email: &str) -> Result<(), ValidationError> {
	let valid = match email.split_once('@') {
		Some((local, domain)) =>
			!local.is_empty()
				&& !domain.contains('@')
				&& !email.chars().any(char::is_whitespace)
				&& domain
					.rsplit_once('.')
					.is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty()),
		None => false,
	};

	if valid { Ok(()) } else { Err(ValidationError::InvalidEmail) }
}

fn validate_password(password: &str) -> Result<(), ValidationError> {
	if password.chars().count() < PASSWORD_MIN_LEN {
		return Err(ValidationError::PasswordTooShort { min: PASSWORD_MIN_LEN });
	}

	Ok(())
}
