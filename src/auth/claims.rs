//! Unverified decoding of the access token's expiry claim.
//!
//! The client never validates signatures; it only peeks at `exp` to decide whether a stored
//! token is still worth sending. Anything that cannot be decoded counts as expired so the
//! client refreshes instead of trusting an unreadable token.

// crates.io
use base64::{
	Engine,
	alphabet::URL_SAFE,
	engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
};
use serde::Deserializer;
// self
use crate::_prelude::*;

const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
	&URL_SAFE,
	GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Reasons an access token payload could not be decoded.
#[derive(Debug, ThisError)]
pub enum ClaimsError {
	/// Token does not have exactly three dot-separated segments.
	#[error("Token must have three dot-separated segments, found {segments}.")]
	Malformed {
		/// Number of segments found.
		segments: usize,
	},
	/// Payload segment is not valid base64url.
	#[error("Token payload is not valid base64url.")]
	Base64(#[from] base64::DecodeError),
	/// Payload is not a JSON object with a numeric `exp`.
	#[error("Token payload is not valid claims JSON.")]
	Json(#[from] serde_json::Error),
	/// `exp` cannot be represented as a timestamp.
	#[error("Token expiry {exp} is out of range.")]
	ExpiryOutOfRange {
		/// Raw `exp` value.
		exp: i64,
	},
}

/// Claims the client reads from an access token payload.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AccessClaims {
	/// Expiry instant in epoch seconds; fractional values are floored.
	#[serde(deserialize_with = "deserialize_epoch_seconds")]
	pub exp: i64,
}
impl AccessClaims {
	/// Decodes the payload segment of `token` without verifying its signature.
	pub fn decode(token: &str) -> Result<Self, ClaimsError> {
		let segments: Vec<&str> = token.split('.').collect();

		if segments.len() != 3 {
			return Err(ClaimsError::Malformed { segments: segments.len() });
		}

		let payload = PAYLOAD_ENGINE.decode(segments[1])?;

		Ok(serde_json::from_slice(&payload)?)
	}

	/// Expiry instant as an [`OffsetDateTime`].
	pub fn expires_at(&self) -> Result<OffsetDateTime, ClaimsError> {
		OffsetDateTime::from_unix_timestamp(self.exp)
			.map_err(|_| ClaimsError::ExpiryOutOfRange { exp: self.exp })
	}

	/// Returns `true` once `instant` is past the expiry.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		match self.expires_at() {
			Ok(expires_at) => expires_at < instant,
			Err(_) => true,
		}
	}
}

// JSON numbers may carry a fraction; the saturating cast keeps huge values out of range.
fn deserialize_epoch_seconds<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(f64::deserialize(deserializer)?.floor() as i64)
}

/// Fail-safe expiry check: undecodable tokens are reported as expired.
pub fn is_token_expired_at(token: &str, instant: OffsetDateTime) -> bool {
	AccessClaims::decode(token).map(|claims| claims.is_expired_at(instant)).unwrap_or(true)
}

/// [`is_token_expired_at`] evaluated against the current UTC clock.
pub fn is_token_expired(token: &str) -> bool {
	is_token_expired_at(token, OffsetDateTime::now_utc())
}

#[cfg(test)]
mod tests {
	// crates.io
	use base64::engine::general_purpose::URL_SAFE_NO_PAD;
	use time::macros;
	// self
	use super::*;

	fn token_with_payload(payload: &str) -> String {
		format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", URL_SAFE_NO_PAD.encode(payload))
	}

	#[test]
	fn decode_reads_exp_claim() {
		let token = token_with_payload(r#"{"sub":"admin","exp":1735689600}"#);
		let claims = AccessClaims::decode(&token).expect("Well-formed token should decode.");

		assert_eq!(claims.exp, 1_735_689_600);
		assert_eq!(
			claims.expires_at().expect("Expiry should be in range."),
			macros::datetime!(2025-01-01 00:00 UTC)
		);
	}

	#[test]
	fn decode_accepts_padded_payloads() {
		let padded = base64::engine::general_purpose::URL_SAFE.encode(r#"{"exp":10}"#);
		let token = format!("head.{padded}.sig");

		assert_eq!(AccessClaims::decode(&token).expect("Padded payload should decode.").exp, 10);
	}

	#[test]
	fn decode_floors_fractional_exp() {
		let fractional = token_with_payload(r#"{"exp":1735689600.75}"#);
		let exponent = token_with_payload(r#"{"exp":1.7e9}"#);

		assert_eq!(
			AccessClaims::decode(&fractional).expect("Fractional exp should decode.").exp,
			1_735_689_600
		);
		assert_eq!(
			AccessClaims::decode(&exponent).expect("Exponent exp should decode.").exp,
			1_700_000_000
		);
		assert!(!is_token_expired_at(&fractional, macros::datetime!(2025-01-01 00:00 UTC)));
	}

	#[test]
	fn expiry_is_strictly_before_now() {
		let now = macros::datetime!(2025-01-01 00:00 UTC);
		let claims = AccessClaims { exp: now.unix_timestamp() };

		assert!(!claims.is_expired_at(now));
		assert!(claims.is_expired_at(now + Duration::seconds(1)));
	}

	#[test]
	fn malformed_tokens_count_as_expired() {
		let now = OffsetDateTime::now_utc();

		assert!(is_token_expired_at("not-a-token", now));
		assert!(is_token_expired_at("a.b", now));
		assert!(is_token_expired_at("a.%%%.c", now));
		assert!(is_token_expired_at(&token_with_payload("not json"), now));
		assert!(is_token_expired_at(&token_with_payload(r#"{"sub":"no-exp"}"#), now));
		assert!(is_token_expired_at(&token_with_payload(r#"{"exp":"soon"}"#), now));
		assert!(is_token_expired_at(&token_with_payload(&format!(r#"{{"exp":{}}}"#, i64::MAX)), now));
	}

	#[test]
	fn future_tokens_are_not_expired() {
		let now = OffsetDateTime::now_utc();
		let token =
			token_with_payload(&format!(r#"{{"exp":{}}}"#, now.unix_timestamp() + 600));

		assert!(!is_token_expired_at(&token, now));
		assert!(matches!(AccessClaims::decode("x.y.z.w"), Err(ClaimsError::Malformed { segments: 4 })));
	}
}
