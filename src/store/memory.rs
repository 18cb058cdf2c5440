//! Thread-safe in-memory [`SessionStore`] implementation for tests and short-lived processes.

// self
use crate::{
	_prelude::*,
	store::{SessionStore, StorageKey, StoreError},
};

type StoreMap = Arc<RwLock<HashMap<StorageKey, String>>>;

/// Storage backend that keeps the session in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	/// Number of keys currently stored.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when nothing is stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
impl SessionStore for MemoryStore {
	fn get(&self, key: StorageKey) -> Result<Option<String>, StoreError> {
		Ok(self.0.read().get(&key).cloned())
	}

	fn set(&self, key: StorageKey, value: &str) -> Result<(), StoreError> {
		self.0.write().insert(key, value.to_owned());

		Ok(())
	}

	fn remove(&self, key: StorageKey) -> Result<(), StoreError> {
		self.0.write().remove(&key);

		Ok(())
	}
}
