//! Optional observability helpers for client operations.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `nexusplay_client.op` with the `op` and
//!   `stage` (call site) fields, plus a `warn` event whenever a token refresh fails.
//! - Enable `metrics` to increment the `nexusplay_client_op_total` counter for every
//!   attempt/success/failure, labeled by `op` + `outcome`, and the
//!   `nexusplay_client_refresh_failure_total` counter labeled by `reason`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Client operations observed by the crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
	/// Access token refresh.
	Refresh,
	/// Authorized API request.
	Request,
	/// Account registration.
	SignUp,
	/// Password reset email request.
	ForgotPassword,
	/// Reset token verification.
	VerifyResetToken,
	/// Password reset submission.
	ResetPassword,
}
impl OpKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpKind::Refresh => "refresh",
			OpKind::Request => "request",
			OpKind::SignUp => "sign_up",
			OpKind::ForgotPassword => "forgot_password",
			OpKind::VerifyResetToken => "verify_reset_token",
			OpKind::ResetPassword => "reset_password",
		}
	}
}
impl Display for OpKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpOutcome {
	/// Entry to a client operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated (or contained) by the client.
	Failure,
}
impl OpOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			OpOutcome::Attempt => "attempt",
			OpOutcome::Success => "success",
			OpOutcome::Failure => "failure",
		}
	}
}
impl Display for OpOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Why a refresh attempt produced no token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RefreshFailure {
	/// No refresh token is stored; no request was sent.
	MissingRefreshToken,
	/// Refresh request could not be built.
	InvalidRequest,
	/// Transport failed before a response arrived.
	Transport,
	/// API answered with a non-success status; stored tokens were cleared.
	Rejected,
	/// Success body was not a valid envelope.
	InvalidResponse,
	/// Success envelope carried no access token.
	MissingAccessToken,
	/// Session storage failed while reading or writing tokens.
	Storage,
}
impl RefreshFailure {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			RefreshFailure::MissingRefreshToken => "missing_refresh_token",
			RefreshFailure::InvalidRequest => "invalid_request",
			RefreshFailure::Transport => "transport",
			RefreshFailure::Rejected => "rejected",
			RefreshFailure::InvalidResponse => "invalid_response",
			RefreshFailure::MissingAccessToken => "missing_access_token",
			RefreshFailure::Storage => "storage",
		}
	}
}
impl Display for RefreshFailure {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
