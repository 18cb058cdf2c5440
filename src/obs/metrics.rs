// self
use crate::obs::{OpKind, OpOutcome, RefreshFailure};

/// Records an operation outcome via the global metrics recorder (when enabled).
pub fn record_op_outcome(kind: OpKind, outcome: OpOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"nexusplay_client_op_total",
			"op" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

/// Records the reason a refresh failed via the global metrics recorder (when enabled).
pub fn record_refresh_failure(reason: RefreshFailure) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("nexusplay_client_refresh_failure_total", "reason" => reason.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = reason;
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn recorders_noop_without_metrics() {
		record_op_outcome(OpKind::SignUp, OpOutcome::Failure);
		record_refresh_failure(RefreshFailure::Rejected);
	}
}
