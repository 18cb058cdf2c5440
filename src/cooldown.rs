//! Client-side throttle for password reset emails.
//!
//! Each successful send starts a short cooldown; the send that reaches the lockout threshold
//! starts the long cooldown and resets the counter. Failed sends are not counted.
//!
//! A send is reserved before its request goes out, so at most one send is outstanding at a time.

// self
use crate::_prelude::*;

/// Timing rules applied by [`ResendCooldown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CooldownPolicy {
	/// Wait applied after each send below the threshold.
	pub short: Duration,
	/// Wait applied after the send that reaches the threshold.
	pub long: Duration,
	/// Number of sends that triggers the long wait.
	pub lockout_after: u32,
}
impl CooldownPolicy {
	/// Overrides the short wait.
	pub fn with_short(mut self, wait: Duration) -> Self {
		self.short = clamp_non_negative(wait);

		self
	}

	/// Overrides the long wait.
	pub fn with_long(mut self, wait: Duration) -> Self {
		self.long = clamp_non_negative(wait);

		self
	}

	/// Overrides the lockout threshold (at least one send).
	pub fn with_lockout_after(mut self, sends: u32) -> Self {
		self.lockout_after = sends.max(1);

		self
	}
}
impl Default for CooldownPolicy {
	fn default() -> Self {
		Self { short: Duration::seconds(60), long: Duration::seconds(300), lockout_after: 4 }
	}
}

/// Result of recording a successful send.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResendTicket {
	/// Cooldown started by this send.
	pub wait: Duration,
	/// Sends left before the long cooldown applies.
	pub remaining_attempts: u32,
	/// `true` when an earlier send in the same cycle already went out.
	pub resent: bool,
}

/// Why a send cannot be reserved right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResendBlocked {
	/// A cooldown is running for the contained duration.
	Cooldown(Duration),
	/// Another send is outstanding.
	InFlight,
}

/// Tracks sends and the instant the next one is allowed.
#[derive(Clone, Debug, Default)]
pub struct ResendCooldown {
	policy: CooldownPolicy,
	sent: u32,
	blocked_until: Option<OffsetDateTime>,
	pending: bool,
}
impl ResendCooldown {
	/// Creates a tracker with no sends recorded.
	pub fn new(policy: CooldownPolicy) -> Self {
		Self { policy, sent: 0, blocked_until: None, pending: false }
	}

	/// Policy in effect.
	pub fn policy(&self) -> CooldownPolicy {
		self.policy
	}

	/// Sends recorded in the current cycle.
	pub fn sent(&self) -> u32 {
		self.sent
	}

	/// Time left before another send is allowed, if any.
	pub fn remaining_at(&self, now: OffsetDateTime) -> Option<Duration> {
		self.blocked_until.map(|until| until - now).filter(|left| left.is_positive())
	}

	/// Fails with the remaining wait while a cooldown is running.
	pub fn check_at(&self, now: OffsetDateTime) -> Result<(), Duration> {
		match self.remaining_at(now) {
			Some(left) => Err(left),
			None => Ok(()),
		}
	}

	/// Returns `true` while a reserved send is outstanding.
	pub fn is_pending(&self) -> bool {
		self.pending
	}

	/// Reserves the next send, failing while a cooldown runs or another send is outstanding.
	///
	/// The reservation ends with [`ResendCooldown::record_sent_at`] or [`ResendCooldown::release`].
	pub fn reserve_at(&mut self, now: OffsetDateTime) -> Result<(), ResendBlocked> {
		self.check_at(now).map_err(ResendBlocked::Cooldown)?;

		if self.pending {
			return Err(ResendBlocked::InFlight);
		}

		self.pending = true;

		Ok(())
	}

	/// Drops an outstanding reservation without counting a send.
	pub fn release(&mut self) {
		self.pending = false;
	}

	/// Records a successful send at `now` and starts the matching cooldown.
	pub fn record_sent_at(&mut self, now: OffsetDateTime) -> ResendTicket {
		self.pending = false;

		let threshold = self.policy.lockout_after.max(1);
		let resent = self.sent > 0;

		self.sent += 1;

		let wait = if self.sent >= threshold {
			self.sent = 0;

			self.policy.long
		} else {
			self.policy.short
		};

		self.blocked_until = Some(now + wait);

		ResendTicket { wait, remaining_attempts: threshold - self.sent, resent }
	}
}

fn clamp_non_negative(wait: Duration) -> Duration {
	if wait.is_negative() { Duration::ZERO } else { wait }
}
