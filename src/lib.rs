//! Authenticated API client for NexusPlay: bearer-token requests with singleflight refresh,
//! pluggable session storage, and the account flows the dashboard runs against the remote API.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod client;
pub mod config;
pub mod cooldown;
pub mod envelope;
pub mod error;
pub mod http;
pub mod obs;
pub mod singleflight;
pub mod store;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests.

	pub use crate::_prelude::*;

	// crates.io
	use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
	// self
	use crate::{
		client::ApiClient,
		config::ClientConfig,
		http::ReqwestHttpClient,
		store::{MemoryStore, SessionStore},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = ApiClient<ReqwestHttpClient>;

	/// Builds an unsigned three-part token whose payload carries the provided `exp` claim.
	///
	/// The signature segment is a fixed placeholder; the client never verifies signatures.
	pub fn unsigned_token(exp: i64) -> String {
		let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
		let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"tester","exp":{exp}}}"#));

		format!("{header}.{payload}.c2lnbmF0dXJl")
	}

	/// Token that stays valid for the next hour.
	pub fn fresh_token() -> String {
		unsigned_token(OffsetDateTime::now_utc().unix_timestamp() + 3_600)
	}

	/// Token that expired one second ago.
	pub fn expired_token() -> String {
		unsigned_token(OffsetDateTime::now_utc().unix_timestamp() - 1)
	}

	/// Constructs an [`ApiClient`] backed by an in-memory store and the reqwest transport,
	/// pointed at `base_url` (typically an `httpmock` server URL ending in `/api/v1`).
	pub fn build_reqwest_test_client(base_url: &str) -> (ReqwestTestClient, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn SessionStore> = store_backend.clone();
		let config = ClientConfig::default()
			.with_base_url(base_url)
			.expect("Mock server base URL should be accepted by the client config.");
		let client = ApiClient::with_http_client(store, config, ReqwestHttpClient::default());

		(client, store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use ::http as http_types;
#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use httpmock as _;
