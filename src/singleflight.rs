//! Single-flight slot: at most one outstanding operation, shared by every concurrent caller.
//!
//! A caller either subscribes to the operation currently in flight or starts a new one. The
//! slot is emptied before the result is published, so callers that arrive after resolution
//! start a fresh operation instead of reusing a stale value.

// crates.io
use async_lock::OnceCell;
// self
use crate::_prelude::*;

type Flight<T> = Arc<OnceCell<T>>;

/// Slot holding at most one in-flight operation whose output is cloned to every subscriber.
pub struct SingleFlight<T> {
	slot: Mutex<Option<Flight<T>>>,
}
impl<T> SingleFlight<T>
where
	T: Clone,
{
	/// Creates an empty slot.
	pub fn new() -> Self {
		Self { slot: Mutex::new(None) }
	}

	/// Returns `true` while an operation is outstanding.
	pub fn in_flight(&self) -> bool {
		self.slot.lock().is_some()
	}

	/// Joins the current flight or starts `operation` in a new one.
	///
	/// If the caller that started the flight is dropped before completion, one of the waiting
	/// subscribers runs its own `operation` in the same flight; every subscriber still observes
	/// a single output.
	pub async fn run<F, Fut>(&self, operation: F) -> T
	where
		F: FnOnce() -> Fut,
		Fut: Future<Output = T>,
	{
		let flight = self.join();
		let init = {
			let flight = &flight;

			move || async move {
				let value = operation().await;

				self.release(flight);

				value
			}
		};

		flight.get_or_init(init).await.clone()
	}

	fn join(&self) -> Flight<T> {
		self.slot.lock().get_or_insert_with(|| Arc::new(OnceCell::new())).clone()
	}

	fn release(&self, flight: &Flight<T>) {
		let mut slot = self.slot.lock();

		if slot.as_ref().is_some_and(|current| Arc::ptr_eq(current, flight)) {
			*slot = None;
		}
	}
}
impl<T> Default for SingleFlight<T>
where
	T: Clone,
{
	fn default() -> Self {
		Self::new()
	}
}
impl<T> Debug for SingleFlight<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SingleFlight").field("in_flight", &self.slot.lock().is_some()).finish()
	}
}
