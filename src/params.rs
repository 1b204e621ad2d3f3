//! Request parameter mapping with a deterministic canonical form.
//!
//! [`Params`] is the caller-facing value for every API call. Keys are held in a
//! [`BTreeMap`] so the canonical `key=value&...` rendering is independent of
//! insertion order, which is the property the whole signing scheme rests on: a
//! server holding the same secret re-renders the canonical string and compares
//! digests. The same rendering (over the pre-enrichment parameters) doubles as
//! the response-cache fingerprint.

// self
use crate::{_prelude::*, error::ValidationError};

/// A single parameter value in its wire-facing form.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
	/// UTF-8 text, rendered verbatim.
	Text(String),
	/// Finite JSON number, rendered via its JSON notation.
	Number(serde_json::Number),
	/// Absent value, rendered as the empty string.
	Null,
}
impl ParamValue {
	/// Renders the value exactly as it appears in the canonical string.
	pub fn render(&self) -> String {
		match self {
			Self::Text(text) => text.clone(),
			Self::Number(number) => number.to_string(),
			Self::Null => String::new(),
		}
	}

	/// Converts the value into its JSON representation for write bodies.
	pub fn to_json(&self) -> serde_json::Value {
		match self {
			Self::Text(text) => serde_json::Value::String(text.clone()),
			Self::Number(number) => serde_json::Value::Number(number.clone()),
			Self::Null => serde_json::Value::Null,
		}
	}
}
impl Display for ParamValue {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.render())
	}
}
impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		Self::Text(value.into())
	}
}
impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		Self::Text(value)
	}
}
impl From<i64> for ParamValue {
	fn from(value: i64) -> Self {
		Self::Number(value.into())
	}
}
impl From<u64> for ParamValue {
	fn from(value: u64) -> Self {
		Self::Number(value.into())
	}
}
impl From<i32> for ParamValue {
	fn from(value: i32) -> Self {
		Self::Number(value.into())
	}
}
impl From<u32> for ParamValue {
	fn from(value: u32) -> Self {
		Self::Number(value.into())
	}
}
impl TryFrom<f64> for ParamValue {
	type Error = ValidationError;

	fn try_from(value: f64) -> Result<Self, Self::Error> {
		serde_json::Number::from_f64(value)
			.map(Self::Number)
			.ok_or(ValidationError::NonFiniteNumber)
	}
}

/// Ordered-irrelevant mapping of request parameters.
///
/// The client never mutates a caller's `Params` in place; enrichment always
/// operates on a clone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params(BTreeMap<String, ParamValue>);
impl Params {
	/// Creates an empty parameter mapping.
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts or replaces a parameter.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
		self.0.insert(key.into(), value.into());

		self
	}

	/// Returns the value stored under `key`, if any.
	pub fn get(&self, key: &str) -> Option<&ParamValue> {
		self.0.get(key)
	}

	/// Returns `true` when `key` is present.
	pub fn contains_key(&self, key: &str) -> bool {
		self.0.contains_key(key)
	}

	/// Number of parameters held.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether the mapping is empty.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates parameters in canonical (key-sorted) order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
		self.0.iter().map(|(key, value)| (key.as_str(), value))
	}

	/// Rejects keys that would make the canonical string ambiguous.
	pub fn validate(&self) -> Result<(), ValidationError> {
		for key in self.0.keys() {
			if key.is_empty() || key.contains(['=', '&']) {
				return Err(ValidationError::InvalidKey { key: key.clone() });
			}
		}

		Ok(())
	}

	/// Renders the canonical `key=value&...` string in key-sorted order.
	pub fn canonical_string(&self) -> String {
		self.0
			.iter()
			.map(|(key, value)| format!("{key}={}", value.render()))
			.collect::<Vec<_>>()
			.join("&")
	}

	/// Converts the mapping into a JSON object for write bodies.
	pub fn to_json(&self) -> serde_json::Value {
		serde_json::Value::Object(
			self.0.iter().map(|(key, value)| (key.clone(), value.to_json())).collect(),
		)
	}
}
impl<K, V> FromIterator<(K, V)> for Params
where
	K: Into<String>,
	V: Into<ParamValue>,
{
	fn from_iter<I>(iter: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
	{
		Self(iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn canonical_string_sorts_keys() {
		let params =
			Params::from_iter([("zebra", "last"), ("action", "getData"), ("mango", "mid")]);

		assert_eq!(params.canonical_string(), "action=getData&mango=mid&zebra=last");
	}

	#[test]
	fn canonical_string_is_insertion_order_independent() {
		let mut forward = Params::new();
		let mut backward = Params::new();

		forward.insert("a", "1").insert("b", "2").insert("c", "3");
		backward.insert("c", "3").insert("b", "2").insert("a", "1");

		assert_eq!(forward.canonical_string(), backward.canonical_string());
	}

	#[test]
	fn canonical_string_renders_numbers_and_nulls() {
		let mut params = Params::new();

		params.insert("count", 42_i64).insert("note", ParamValue::Null).insert("sheet", "S1");

		assert_eq!(params.canonical_string(), "count=42&note=&sheet=S1");
	}

	#[test]
	fn empty_params_render_empty_string() {
		assert_eq!(Params::new().canonical_string(), "");
	}

	#[test]
	fn validate_rejects_delimiter_keys() {
		let mut params = Params::new();

		params.insert("a=b", "broken");

		assert_eq!(params.validate(), Err(ValidationError::InvalidKey { key: "a=b".into() }));

		let mut params = Params::new();

		params.insert("", "empty");

		assert_eq!(params.validate(), Err(ValidationError::InvalidKey { key: String::new() }));
	}

	#[test]
	fn non_finite_numbers_are_rejected() {
		assert_eq!(ParamValue::try_from(f64::NAN), Err(ValidationError::NonFiniteNumber));
		assert_eq!(ParamValue::try_from(f64::INFINITY), Err(ValidationError::NonFiniteNumber));
		assert!(ParamValue::try_from(2.5).is_ok());
	}
}
