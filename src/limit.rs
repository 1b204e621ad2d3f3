//! Client-side request budget over a rolling hour window.

// self
use crate::_prelude::*;

/// Length of the rate window.
pub const RATE_WINDOW: Duration = Duration::hours(1);

/// Counts requests in a rolling hour window and rejects once the budget is
/// spent.
///
/// The check-then-increment in [`check_and_consume_at`](Self::check_and_consume_at)
/// is a single synchronous step; multi-threaded hosts must serialize access
/// externally (the client wraps the limiter in a mutex).
#[derive(Debug)]
pub struct RateLimiter {
	max_requests: u32,
	count: u32,
	window_start: OffsetDateTime,
}
impl RateLimiter {
	/// Creates a limiter with a fresh window starting now.
	pub fn new(max_requests: u32) -> Self {
		Self::starting_at(max_requests, OffsetDateTime::now_utc())
	}

	/// Creates a limiter whose window starts at `now`.
	pub fn starting_at(max_requests: u32, now: OffsetDateTime) -> Self {
		Self { max_requests, count: 0, window_start: now }
	}

	/// Consumes one request slot using the wall clock.
	pub fn check_and_consume(&mut self) -> Result<()> {
		self.check_and_consume_at(OffsetDateTime::now_utc())
	}

	/// Consumes one request slot as of `now`.
	///
	/// An elapsed window resets the count before the budget check, so the count
	/// stays within `[0, max_requests]` after every successful call. Exhaustion
	/// surfaces as [`Error::RateLimited`] carrying the window reset instant.
	pub fn check_and_consume_at(&mut self, now: OffsetDateTime) -> Result<()> {
		if now - self.window_start > RATE_WINDOW {
			self.count = 0;
			self.window_start = now;
		}
		if self.count >= self.max_requests {
			return Err(Error::RateLimited {
				resets_at: self.window_start + RATE_WINDOW,
				limit: self.max_requests,
			});
		}

		self.count += 1;

		Ok(())
	}

	/// Zeroes the window; intended for operators and tests.
	pub fn reset(&mut self) {
		self.reset_at(OffsetDateTime::now_utc());
	}

	/// Zeroes the window as of `now`.
	pub fn reset_at(&mut self, now: OffsetDateTime) {
		self.count = 0;
		self.window_start = now;
	}

	/// Reports the current window without mutating it.
	pub fn status(&self) -> RateLimitStatus {
		self.status_at(OffsetDateTime::now_utc())
	}

	/// Reports the window as of `now` without mutating it.
	pub fn status_at(&self, now: OffsetDateTime) -> RateLimitStatus {
		let expired = now - self.window_start > RATE_WINDOW;
		let count = if expired { 0 } else { self.count };
		let resets_at = if expired { now + RATE_WINDOW } else { self.window_start + RATE_WINDOW };

		RateLimitStatus {
			count,
			remaining: self.max_requests.saturating_sub(count),
			resets_at,
		}
	}
}

/// Snapshot of the limiter state returned by [`RateLimiter::status`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitStatus {
	/// Requests consumed in the current window.
	pub count: u32,
	/// Remaining budget, never negative.
	pub remaining: u32,
	/// Instant when the current window expires.
	pub resets_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn budget_is_enforced_exactly() {
		let now = OffsetDateTime::now_utc();
		let mut limiter = RateLimiter::starting_at(3, now);

		for _ in 0..3 {
			limiter.check_and_consume_at(now).expect("Calls within budget should succeed.");
		}

		let err = limiter
			.check_and_consume_at(now)
			.expect_err("Call beyond budget should be rejected.");

		match err {
			Error::RateLimited { resets_at, limit } => {
				assert_eq!(limit, 3);
				assert_eq!(resets_at, now + RATE_WINDOW);
			},
			other => panic!("Expected RateLimited, got {other:?}."),
		}
	}

	#[test]
	fn window_resets_after_an_hour() {
		let now = OffsetDateTime::now_utc();
		let mut limiter = RateLimiter::starting_at(1, now);

		limiter.check_and_consume_at(now).expect("First call should succeed.");
		limiter
			.check_and_consume_at(now)
			.expect_err("Second call in the same window should be rejected.");

		let later = now + RATE_WINDOW + Duration::seconds(1);

		limiter.check_and_consume_at(later).expect("Call in a fresh window should succeed.");

		assert_eq!(limiter.status_at(later).count, 1);
	}

	#[test]
	fn status_does_not_mutate() {
		let now = OffsetDateTime::now_utc();
		let mut limiter = RateLimiter::starting_at(5, now);

		limiter.check_and_consume_at(now).expect("Call should succeed.");

		let status = limiter.status_at(now);

		assert_eq!(status.count, 1);
		assert_eq!(status.remaining, 4);
		assert_eq!(status.resets_at, now + RATE_WINDOW);
		assert_eq!(limiter.status_at(now), status);
	}

	#[test]
	fn status_reports_fresh_window_after_expiry() {
		let now = OffsetDateTime::now_utc();
		let mut limiter = RateLimiter::starting_at(2, now);

		limiter.check_and_consume_at(now).expect("Call should succeed.");

		let later = now + RATE_WINDOW + Duration::minutes(5);
		let status = limiter.status_at(later);

		assert_eq!(status.count, 0);
		assert_eq!(status.remaining, 2);
	}

	#[test]
	fn reset_refills_the_budget() {
		let now = OffsetDateTime::now_utc();
		let mut limiter = RateLimiter::starting_at(1, now);

		limiter.check_and_consume_at(now).expect("Call should succeed.");
		limiter.reset_at(now);
		limiter.check_and_consume_at(now).expect("Call after reset should succeed.");
	}
}
