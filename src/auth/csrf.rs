//! Short-lived anti-forgery tokens for write requests.

// self
use crate::{_prelude::*, auth::base36};

/// Lifetime of an issued CSRF token.
pub const CSRF_TOKEN_LIFETIME: Duration = Duration::minutes(30);

const CSRF_RANDOM_LEN: usize = 16;

#[derive(Clone, Debug)]
struct CsrfToken {
	value: String,
	expires_at: OffsetDateTime,
}

/// Issues a single active CSRF token, reused until it expires.
///
/// A token minted once is returned unchanged for every request inside its
/// 30-minute lifetime; regeneration happens only on expiry or an explicit
/// [`clear`](CsrfManager::clear).
#[derive(Debug, Default)]
pub struct CsrfManager {
	current: Option<CsrfToken>,
}
impl CsrfManager {
	/// Creates a manager with no active token.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the active token, minting one if needed, using the wall clock.
	pub fn token(&mut self) -> String {
		self.token_at(OffsetDateTime::now_utc())
	}

	/// Returns the active token as of `now`, minting one if absent or expired.
	pub fn token_at(&mut self, now: OffsetDateTime) -> String {
		if let Some(token) = self.current.as_ref()
			&& now < token.expires_at
		{
			return token.value.clone();
		}

		let millis = (now.unix_timestamp_nanos() / 1_000_000).max(0) as u128;
		let value =
			format!("csrf_{}_{}", base36::encode(millis), base36::random_chars(CSRF_RANDOM_LEN));

		self.current =
			Some(CsrfToken { value: value.clone(), expires_at: now + CSRF_TOKEN_LIFETIME });

		value
	}

	/// Forcibly invalidates the active token, forcing regeneration on next use.
	pub fn clear(&mut self) {
		self.current = None;
	}

	/// Expiry instant of the active token, if one is cached.
	pub fn expires_at(&self) -> Option<OffsetDateTime> {
		self.current.as_ref().map(|token| token.expires_at)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_is_reused_within_lifetime() {
		let mut manager = CsrfManager::new();
		let now = OffsetDateTime::now_utc();
		let first = manager.token_at(now);
		let second = manager.token_at(now + Duration::minutes(29));

		assert_eq!(first, second);
	}

	#[test]
	fn token_rotates_after_expiry() {
		let mut manager = CsrfManager::new();
		let now = OffsetDateTime::now_utc();
		let first = manager.token_at(now);
		let second = manager.token_at(now + CSRF_TOKEN_LIFETIME + Duration::seconds(1));

		assert_ne!(first, second);
	}

	#[test]
	fn clear_forces_regeneration() {
		let mut manager = CsrfManager::new();
		let now = OffsetDateTime::now_utc();
		let first = manager.token_at(now);

		manager.clear();

		assert!(manager.expires_at().is_none());
		assert_ne!(first, manager.token_at(now));
	}

	#[test]
	fn token_carries_csrf_prefix() {
		let mut manager = CsrfManager::new();
		let token = manager.token();

		assert!(token.starts_with("csrf_"));
		assert_eq!(token.split('_').count(), 3);
	}
}
