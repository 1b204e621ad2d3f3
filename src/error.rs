//! Client-level error types shared across signing, protection, and transport layers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem; fatal until reconfigured.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Caller-supplied input was rejected; fatal until the caller fixes it.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Transport failure (DNS, TCP, TLS, unreadable response); retryable.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Structured error returned by the remote API; retry policy depends on its code.
	#[error(transparent)]
	Server(#[from] ServerError),

	/// Local request quota for the current hour window is exhausted.
	#[error("Rate limit of {limit} requests per hour exceeded; resets at {resets_at}.")]
	RateLimited {
		/// Instant when the current window expires and the budget refills.
		resets_at: OffsetDateTime,
		/// Configured per-hour request budget.
		limit: u32,
	},
	/// Nonce generation collided on every attempt.
	#[error("Nonce generation failed after {attempts} collision retries.")]
	NonceExhausted {
		/// Number of candidates tried before giving up.
		attempts: u32,
	},
	/// Request exceeded its transport deadline.
	#[error("Request timed out after {limit}.")]
	Timeout {
		/// Deadline that was exceeded.
		limit: Duration,
	},
}

/// Configuration failures raised while building or reconfiguring a client.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// API token must be non-empty.
	#[error("Configuration is missing an API token.")]
	MissingToken,
	/// Shared signing secret must be non-empty.
	#[error("Configuration is missing a signing secret.")]
	MissingSecret,
	/// Endpoint must be reachable over HTTP(S).
	#[error("Endpoint scheme `{scheme}` is not supported; use http or https.")]
	UnsupportedScheme {
		/// Scheme that was supplied.
		scheme: String,
	},
	/// A zero request budget would reject every call.
	#[error("Rate limiting is enabled but the request budget is zero.")]
	ZeroRequestBudget,
	/// Durations must be strictly positive.
	#[error("The {field} duration must be positive.")]
	NonPositiveDuration {
		/// Configuration field that failed validation.
		field: &'static str,
	},
}

/// Bad caller input detected before any network traffic.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ValidationError {
	/// Keys must be non-empty and free of canonical-string delimiters.
	#[error("Parameter key `{key}` is empty or contains `=`/`&`.")]
	InvalidKey {
		/// Offending key.
		key: String,
	},
	/// Only finite numbers have a canonical wire form.
	#[error("Parameter value is not a finite number.")]
	NonFiniteNumber,
	/// Signature verification failed.
	#[error("Signature does not match the canonical request.")]
	SignatureMismatch,
}

/// Transport-level failures (network, IO, unreadable responses).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the API endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// The transport deadline elapsed before a response arrived.
	#[error("Transport deadline elapsed.")]
	Timeout,
	/// Non-success status whose body was not a structured API error.
	#[error("API endpoint returned unexpected status {status}.")]
	UnexpectedStatus {
		/// Raw HTTP status code.
		status: u16,
	},
	/// Response body was not the expected JSON shape.
	#[error("API endpoint returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code of the response.
		status: u16,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}

/// Structured error reported by the remote API.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Remote API rejected the call: {message}.")]
pub struct ServerError {
	/// HTTP status code of the response.
	pub status: u16,
	/// Machine-readable error code, when the server supplied one.
	pub code: Option<String>,
	/// Human-readable message from the server.
	pub message: String,
}
