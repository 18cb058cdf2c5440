//! Session storage contracts and built-in key-value backends.
//!
//! Storage access is synchronous: reading a token never suspends, so the client only yields at
//! network awaits.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{StoredUser, TokenPair, TokenSecret},
};

/// Fixed keys the client reads and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StorageKey {
	/// Current access token.
	#[serde(rename = "accessToken")]
	AccessToken,
	/// Current refresh token.
	#[serde(rename = "refreshToken")]
	RefreshToken,
	/// JSON-serialized [`StoredUser`].
	#[serde(rename = "user")]
	User,
}
impl StorageKey {
	/// Every key, in a stable order.
	pub const ALL: [StorageKey; 3] = [Self::AccessToken, Self::RefreshToken, Self::User];

	/// Returns the wire name used by key-value backends.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::AccessToken => "accessToken",
			Self::RefreshToken => "refreshToken",
			Self::User => "user",
		}
	}
}
impl Display for StorageKey {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Key-value backend holding the persisted session.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Reads the value stored under `key`, if any.
	fn get(&self, key: StorageKey) -> Result<Option<String>, StoreError>;

	/// Stores `value` under `key`, replacing any previous value.
	fn set(&self, key: StorageKey, value: &str) -> Result<(), StoreError>;

	/// Removes `key`; removing an absent key is not an error.
	fn remove(&self, key: StorageKey) -> Result<(), StoreError>;
}
impl dyn SessionStore + '_ {
	/// Current access token.
	pub fn access_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self.get(StorageKey::AccessToken)?.map(TokenSecret::new))
	}

	/// Current refresh token.
	pub fn refresh_token(&self) -> Result<Option<TokenSecret>, StoreError> {
		Ok(self.get(StorageKey::RefreshToken)?.map(TokenSecret::new))
	}

	/// Replaces the access token, leaving the refresh token untouched.
	pub fn save_access_token(&self, token: &TokenSecret) -> Result<(), StoreError> {
		self.set(StorageKey::AccessToken, token.expose())
	}

	/// Persists both tokens; a pair without a refresh token keeps any stored refresh token.
	pub fn save_tokens(&self, pair: &TokenPair) -> Result<(), StoreError> {
		self.save_access_token(&pair.access_token)?;

		if let Some(refresh) = &pair.refresh_token {
			self.set(StorageKey::RefreshToken, refresh.expose())?;
		}

		Ok(())
	}

	/// Removes both tokens.
	pub fn clear_tokens(&self) -> Result<(), StoreError> {
		self.remove(StorageKey::AccessToken)?;
		self.remove(StorageKey::RefreshToken)
	}

	/// Cached user summary.
	pub fn user(&self) -> Result<Option<StoredUser>, StoreError> {
		self.get(StorageKey::User)?
			.map(|raw| {
				serde_json::from_str(&raw).map_err(|e| StoreError::Serialization {
					message: format!("Failed to parse stored user: {e}"),
				})
			})
			.transpose()
	}

	/// Caches the user summary as JSON.
	pub fn save_user(&self, user: &StoredUser) -> Result<(), StoreError> {
		let raw = serde_json::to_string(user).map_err(|e| StoreError::Serialization {
			message: format!("Failed to serialize stored user: {e}"),
		})?;

		self.set(StorageKey::User, &raw)
	}

	/// Removes every session key.
	pub fn clear_session(&self) -> Result<(), StoreError> {
		StorageKey::ALL.into_iter().try_for_each(|key| self.remove(key))
	}
}

/// Error type produced by [`SessionStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend or the typed helpers.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::error::Error;

	fn store() -> Arc<dyn SessionStore> {
		Arc::new(MemoryStore::default())
	}

	#[test]
	fn store_error_converts_into_client_error_with_source() {
		let store_error = StoreError::Backend { message: "disk unavailable".into() };
		let client_error: Error = store_error.clone().into();

		assert!(matches!(client_error, Error::Storage(_)));
		assert!(client_error.to_string().contains("disk unavailable"));

		let source = StdError::source(&client_error)
			.expect("Client error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn save_tokens_without_refresh_keeps_previous_refresh() {
		let store = store();

		store.save_tokens(&TokenPair::new("access-1", "refresh-1")).expect("Save should succeed.");
		store.save_tokens(&TokenPair::access_only("access-2")).expect("Save should succeed.");

		assert_eq!(
			store.access_token().expect("Read should succeed.").map(|t| t.expose().to_owned()),
			Some("access-2".into())
		);
		assert_eq!(
			store.refresh_token().expect("Read should succeed.").map(|t| t.expose().to_owned()),
			Some("refresh-1".into())
		);
	}

	#[test]
	fn clear_tokens_keeps_user() {
		let store = store();
		let user = StoredUser { username: "neo".into(), email: "neo@nexus.gg".into(), id: None };

		store.save_tokens(&TokenPair::new("a", "r")).expect("Save should succeed.");
		store.save_user(&user).expect("Save should succeed.");
		store.clear_tokens().expect("Clear should succeed.");

		assert!(store.access_token().expect("Read should succeed.").is_none());
		assert!(store.refresh_token().expect("Read should succeed.").is_none());
		assert_eq!(store.user().expect("Read should succeed."), Some(user));

		store.clear_session().expect("Clear should succeed.");

		assert!(store.user().expect("Read should succeed.").is_none());
	}

	#[test]
	fn corrupt_user_surfaces_serialization_error() {
		let store = store();

		store.set(StorageKey::User, "{not json").expect("Raw write should succeed.");

		assert!(matches!(store.user(), Err(StoreError::Serialization { .. })));
	}

	#[test]
	fn storage_keys_use_wire_names() {
		let json = serde_json::to_string(&StorageKey::RefreshToken)
			.expect("StorageKey should serialize to JSON.");

		assert_eq!(json, "\"refreshToken\"");
		assert_eq!(StorageKey::AccessToken.to_string(), "accessToken");
	}
}
