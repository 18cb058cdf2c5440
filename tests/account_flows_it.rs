#![cfg(feature = "reqwest")]

// std
use std::sync::atomic::{AtomicUsize, Ordering};
// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use nexusplay_client::{
	_preludet::*,
	auth::{StoredUser, TokenPair, UserId},
	client::{ApiClient, SignUpRequest},
	config::ClientConfig,
	error::{Error, TransportError, ValidationError},
	http::{ApiHttpClient, HttpFuture, HttpRequest, HttpResponse},
	store::{MemoryStore, SessionStore},
};

#[derive(Default)]
struct CountingHttpClient {
	calls: AtomicUsize,
}
impl ApiHttpClient for CountingHttpClient {
	fn execute(&self, _request: HttpRequest) -> HttpFuture<'_> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async {
			Err::<HttpResponse, _>(TransportError::Io(std::io::Error::other(
				"no network in this test",
			)))
		})
	}
}

fn offline_client() -> (ApiClient<CountingHttpClient>, Arc<CountingHttpClient>) {
	let http = Arc::new(CountingHttpClient::default());
	let store: Arc<dyn SessionStore> = Arc::new(MemoryStore::default());

	(ApiClient::with_http_client(store, ClientConfig::default(), http.clone()), http)
}

#[tokio::test]
async fn sign_up_rejects_unexpected_envelope_code() {
	let server = MockServer::start_async().await;
	let (client, _store) = build_reqwest_test_client(&server.url("/api/v1"));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/sign-up").json_body(json!({
				"username": "neo",
				"email": "neo@nexus.gg",
				"password": "follow-the-rabbit"
			}));
			then.status(201).json_body(json!({
				"code": 201,
				"data": {
					"accessToken": "access-1",
					"refreshToken": "refresh-1",
					"username": "neo",
					"email": "neo@nexus.gg",
					"id": 42
				},
				"message": "Registered",
				"status": "CREATED",
				"timestamp": "2025-02-10T14:32:00Z"
			}));
		})
		.await;
	let form = SignUpRequest::new("neo", "neo@nexus.gg", "follow-the-rabbit");
	let err = client.sign_up(&form).await.expect_err("Envelope code 201 should be rejected.");

	assert!(matches!(&err, Error::ApiRequest { status: 201, message } if message == "Registered"));
	assert!(client.stored_user().expect("Stored user read should succeed.").is_none());

	mock.assert_async().await;
}

#[tokio::test]
async fn sign_up_with_ok_envelope_stores_session() {
	let server = MockServer::start_async().await;
	let (client, _store) = build_reqwest_test_client(&server.url("/api/v1"));

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/sign-up");
			then.status(200).json_body(json!({
				"code": 200,
				"data": { "accessToken": "access-1", "refreshToken": "refresh-1", "id": "u-42" }
			}));
		})
		.await;

	let form = SignUpRequest::new("neo", "neo@nexus.gg", "follow-the-rabbit");
	let user = client.sign_up(&form).await.expect("Sign-up should succeed.");

	assert_eq!(user, StoredUser {
		username: "neo".into(),
		email: "neo@nexus.gg".into(),
		id: Some(UserId::Text("u-42".into())),
	});
	assert_eq!(client.stored_user().expect("Stored user should be readable."), Some(user));
	assert_eq!(
		client
			.store
			.refresh_token()
			.expect("Refresh token read should succeed.")
			.map(|token| token.expose().to_owned()),
		Some("refresh-1".into())
	);

	client.sign_out().expect("Sign-out should succeed.");

	assert!(client.stored_user().expect("Stored user read should succeed.").is_none());
	assert!(client.store.access_token().expect("Access token read should succeed.").is_none());
}

#[tokio::test]
async fn sign_up_failures_use_server_message_or_fallback() {
	let server = MockServer::start_async().await;
	let (client, _store) = build_reqwest_test_client(&server.url("/api/v1"));

	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/sign-up").body_includes("taken");
			then.status(409).json_body(json!({ "message": "Username already exists" }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/sign-up").body_includes("broken");
			then.status(500).body("");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/sign-up").body_includes("tokenless");
			then.status(200).json_body(json!({ "code": 200, "data": { "username": "tokenless" } }));
		})
		.await;

	let taken = client
		.sign_up(&SignUpRequest::new("taken", "taken@nexus.gg", "secret1"))
		.await
		.expect_err("Conflict should fail.");
	let broken = client
		.sign_up(&SignUpRequest::new("broken", "broken@nexus.gg", "secret1"))
		.await
		.expect_err("Server error should fail.");
	let tokenless = client
		.sign_up(&SignUpRequest::new("tokenless", "tokenless@nexus.gg", "secret1"))
		.await
		.expect_err("Missing token should fail.");

	assert_eq!(taken.to_string(), "Username already exists");
	assert_eq!(broken.to_string(), "Registration failed");
	assert!(matches!(tokenless, Error::IncompleteResponse { field: "accessToken" }));
	assert!(client.stored_user().expect("Stored user read should succeed.").is_none());
}

#[tokio::test]
async fn validation_rejects_before_network() {
	let (client, http) = offline_client();
	let err = client
		.sign_up(&SignUpRequest::new("neo", "not-an-email", "secret1"))
		.await
		.expect_err("Invalid email should be rejected.");

	assert!(matches!(err, Error::Validation(ValidationError::InvalidEmail)));

	let err = client
		.reset_password("reset-token", "secret1", "secret2")
		.await
		.expect_err("Mismatched passwords should be rejected.");

	assert!(matches!(err, Error::Validation(ValidationError::PasswordMismatch)));

	let err = client
		.reset_password("reset-token", "short", "short")
		.await
		.expect_err("Short password should be rejected.");

	assert!(matches!(err, Error::Validation(ValidationError::PasswordTooShort { min: 6 })));

	let err = client.verify_reset_token("").await.expect_err("Empty token should be rejected.");

	assert!(matches!(err, Error::Validation(ValidationError::MissingResetToken)));

	let err = client.forgot_password("nobody").await.expect_err("Invalid email is rejected.");

	assert!(matches!(err, Error::Validation(ValidationError::InvalidEmail)));
	assert_eq!(http.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn forgot_password_applies_cooldown() {
	let server = MockServer::start_async().await;
	let (client, _store) = build_reqwest_test_client(&server.url("/api/v1"));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v1/auth/forgot-password")
				.json_body(json!({ "email": "neo@nexus.gg" }));
			then.status(200).json_body(json!({ "code": 200, "data": null, "message": "Sent" }));
		})
		.await;
	let ticket =
		client.forgot_password("neo@nexus.gg").await.expect("First reset email should be sent.");

	assert_eq!(ticket.wait, Duration::seconds(60));
	assert_eq!(ticket.remaining_attempts, 3);
	assert!(!ticket.resent);

	let err = client
		.forgot_password("neo@nexus.gg")
		.await
		.expect_err("Second request inside the cooldown should be rejected.");

	match err {
		Error::CooldownActive { remaining } => {
			assert!(remaining > Duration::seconds(55) && remaining <= Duration::seconds(60));
		},
		other => panic!("Unexpected error: {other:?}"),
	}

	assert!(client.forgot_password_cooldown().is_some());

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn failed_forgot_password_does_not_start_cooldown() {
	let server = MockServer::start_async().await;
	let (client, _store) = build_reqwest_test_client(&server.url("/api/v1"));

	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/forgot-password");
			then.status(500).body("oops");
		})
		.await;

	let err = client
		.forgot_password("neo@nexus.gg")
		.await
		.expect_err("Server error should fail.");

	assert_eq!(err.to_string(), "An error occurred");
	assert!(client.forgot_password_cooldown().is_none());

	let retry = client
		.forgot_password("neo@nexus.gg")
		.await
		.expect_err("Retry should reach the server and fail again.");

	assert_eq!(retry.to_string(), "An error occurred");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn concurrent_forgot_password_sends_once() {
	let server = MockServer::start_async().await;
	let (client, _store) = build_reqwest_test_client(&server.url("/api/v1"));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/forgot-password");
			then.status(200)
				.delay(std::time::Duration::from_millis(100))
				.json_body(json!({ "code": 200, "data": null, "message": "Sent" }));
		})
		.await;
	let (a, b, c) = tokio::join!(
		client.forgot_password("neo@nexus.gg"),
		client.forgot_password("neo@nexus.gg"),
		client.forgot_password("neo@nexus.gg"),
	);
	let results = [a, b, c];
	let sent = results.iter().filter(|result| result.is_ok()).count();
	let in_flight =
		results.iter().filter(|result| matches!(result, Err(Error::ResendInFlight))).count();

	assert_eq!(sent, 1);
	assert_eq!(in_flight, 2);
	assert!(client.forgot_password_cooldown().is_some());

	let err = client
		.forgot_password("neo@nexus.gg")
		.await
		.expect_err("Cooldown should apply once the send completed.");

	assert!(matches!(err, Error::CooldownActive { .. }));

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn reset_token_verification() {
	let server = MockServer::start_async().await;
	let (client, _store) = build_reqwest_test_client(&server.url("/api/v1"));

	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v1/auth/reset-password/verify")
				.query_param("token", "good-token");
			then.status(200).json_body(json!({ "data": { "valid": true } }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v1/auth/reset-password/verify")
				.query_param("token", "stale");
			then.status(200).json_body(json!({ "data": { "valid": false } }));
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api/v1/auth/reset-password/verify")
				.query_param("token", "gone");
			then.status(410).body("");
		})
		.await;

	assert!(client.verify_reset_token("good-token").await.expect("Verification should succeed."));
	assert!(!client.verify_reset_token("stale").await.expect("Verification should succeed."));
	assert_eq!(
		client.verify_reset_token("gone").await.expect_err("Gone should fail.").to_string(),
		"HTTP error! status: 410"
	);
}

#[tokio::test]
async fn reset_password_posts_new_password() {
	let server = MockServer::start_async().await;
	let (client, _store) = build_reqwest_test_client(&server.url("/api/v1"));

	client
		.store
		.save_tokens(&TokenPair::new("access-kept", "refresh-kept"))
		.expect("Seeding tokens should succeed.");

	let ok = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/api/v1/auth/reset-password")
				.json_body(json!({ "token": "reset-1", "newPassword": "new-secret" }));
			then.status(200).json_body(json!({ "code": 200, "data": null }));
		})
		.await;
	let rejected = server
		.mock_async(|when, then| {
			when.method(POST).path("/api/v1/auth/reset-password").body_includes("reset-2");
			then.status(400).json_body(json!({ "status": "BAD_REQUEST" }));
		})
		.await;

	client
		.reset_password("reset-1", "new-secret", "new-secret")
		.await
		.expect("Reset should succeed.");

	let err = client
		.reset_password("reset-2", "new-secret", "new-secret")
		.await
		.expect_err("Rejected token should fail.");

	assert_eq!(err.to_string(), "Failed to reset password");
	assert!(
		client.store.access_token().expect("Access token read should succeed.").is_some(),
		"Password reset must not touch the stored session."
	);

	ok.assert_async().await;
	rejected.assert_async().await;
}
