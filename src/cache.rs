//! In-memory response cache with per-entry expiry.

// self
use crate::_prelude::*;

#[derive(Clone, Debug)]
struct CacheEntry {
	value: serde_json::Value,
	expires_at: OffsetDateTime,
}

/// Maps request fingerprints to cached response payloads.
///
/// Entries are evicted lazily on read; there is no background sweep and no
/// size bound, so a long-lived session with many distinct fingerprints grows
/// without limit. [`clear`](Self::clear) is the pressure valve.
#[derive(Debug, Default)]
pub struct ResponseCache {
	entries: HashMap<String, CacheEntry>,
}
impl ResponseCache {
	/// Creates an empty cache.
	pub fn new() -> Self {
		Self::default()
	}

	/// Looks up `key` using the wall clock.
	pub fn get(&mut self, key: &str) -> Option<serde_json::Value> {
		self.get_at(key, OffsetDateTime::now_utc())
	}

	/// Looks up `key` as of `now`, deleting the entry when it has expired.
	pub fn get_at(&mut self, key: &str, now: OffsetDateTime) -> Option<serde_json::Value> {
		match self.entries.get(key) {
			Some(entry) if now <= entry.expires_at => Some(entry.value.clone()),
			Some(_) => {
				self.entries.remove(key);

				None
			},
			None => None,
		}
	}

	/// Stores `value` under `key` using the wall clock.
	pub fn set(&mut self, key: impl Into<String>, value: serde_json::Value, ttl: Duration) {
		self.set_at(key, value, ttl, OffsetDateTime::now_utc());
	}

	/// Stores `value` under `key` as of `now`, overwriting unconditionally.
	pub fn set_at(
		&mut self,
		key: impl Into<String>,
		value: serde_json::Value,
		ttl: Duration,
		now: OffsetDateTime,
	) {
		self.entries.insert(key.into(), CacheEntry { value, expires_at: now + ttl });
	}

	/// Removes the entry under `key`, if present.
	pub fn remove(&mut self, key: &str) {
		self.entries.remove(key);
	}

	/// Empties the whole cache.
	pub fn clear(&mut self) {
		self.entries.clear();
	}

	/// Number of live-or-stale entries currently held.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Whether the cache holds no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
