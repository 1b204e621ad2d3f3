//! One-time request nonces with a bounded replay-tracking set.

// self
use crate::{_prelude::*, auth::base36};

/// Maximum number of issued nonces remembered for collision detection.
pub const NONCE_SET_CAPACITY: usize = 1_000;
/// Collision retries before generation is abandoned.
pub const NONCE_MAX_ATTEMPTS: u32 = 10;

const NONCE_RANDOM_LEN: usize = 9;

/// Issues one-time tokens and tracks recently issued ones with bounded memory.
///
/// The set only guards against local re-issuance; replay rejection is
/// ultimately the server's job. Once the set exceeds
/// [`NONCE_SET_CAPACITY`], the oldest entry (insertion order) is evicted.
#[derive(Debug, Default)]
pub struct NonceGenerator {
	order: VecDeque<String>,
	issued: HashSet<String>,
}
impl NonceGenerator {
	/// Creates an empty generator.
	pub fn new() -> Self {
		Self::default()
	}

	/// Generates a fresh nonce using the current wall clock.
	pub fn generate(&mut self) -> Result<String> {
		self.generate_at(OffsetDateTime::now_utc())
	}

	/// Generates a fresh nonce as of `now`.
	///
	/// A candidate is the base36 unix-millisecond timestamp followed by
	/// [`NONCE_RANDOM_LEN`] random base36 characters. Collisions with the
	/// issued set retry up to [`NONCE_MAX_ATTEMPTS`] times; exhaustion is
	/// practically unreachable given the entropy, but surfaces as
	/// [`Error::NonceExhausted`] rather than being ignored.
	pub fn generate_at(&mut self, now: OffsetDateTime) -> Result<String> {
		let millis = (now.unix_timestamp_nanos() / 1_000_000).max(0) as u128;

		for _ in 0..NONCE_MAX_ATTEMPTS {
			let candidate =
				format!("{}{}", base36::encode(millis), base36::random_chars(NONCE_RANDOM_LEN));

			if self.issued.contains(&candidate) {
				continue;
			}

			self.issued.insert(candidate.clone());
			self.order.push_back(candidate.clone());

			if self.issued.len() > NONCE_SET_CAPACITY
				&& let Some(oldest) = self.order.pop_front()
			{
				self.issued.remove(&oldest);
			}

			return Ok(candidate);
		}

		Err(Error::NonceExhausted { attempts: NONCE_MAX_ATTEMPTS })
	}

	/// Number of nonces currently tracked.
	pub fn len(&self) -> usize {
		self.issued.len()
	}

	/// Whether no nonces are tracked.
	pub fn is_empty(&self) -> bool {
		self.issued.is_empty()
	}

	/// Whether `nonce` is still tracked by the replay set.
	pub fn contains(&self, nonce: &str) -> bool {
		self.issued.contains(nonce)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn nonce_has_timestamp_prefix_and_random_suffix() {
		let mut generator = NonceGenerator::new();
		let now = OffsetDateTime::from_unix_timestamp(1_700_000_000)
			.expect("Test timestamp should be valid.");
		let millis = 1_700_000_000_u128 * 1_000;
		let prefix = base36::encode(millis);
		let nonce = generator.generate_at(now).expect("Nonce generation should succeed.");

		assert!(nonce.starts_with(&prefix));
		assert_eq!(nonce.len(), prefix.len() + 9);
	}

	#[test]
	fn generated_nonces_are_unique() {
		let mut generator = NonceGenerator::new();
		let now = OffsetDateTime::now_utc();
		let mut seen = HashSet::new();

		for _ in 0..100 {
			let nonce = generator.generate_at(now).expect("Nonce generation should succeed.");

			assert!(seen.insert(nonce), "Nonce was issued twice.");
		}
	}

	#[test]
	fn set_is_bounded_and_evicts_oldest_first() {
		let mut generator = NonceGenerator::new();
		let now = OffsetDateTime::now_utc();
		let first = generator.generate_at(now).expect("First nonce should generate.");

		for _ in 0..NONCE_SET_CAPACITY {
			generator.generate_at(now).expect("Nonce generation should succeed.");
		}

		assert_eq!(generator.len(), NONCE_SET_CAPACITY);
		assert!(!generator.contains(&first), "Oldest nonce should have been evicted.");
	}
}
