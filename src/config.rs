//! Explicit client configuration with build-time validation.
//!
//! Every recognized field is enumerated here with its default; there is no
//! merge-from-map surface, so unrecognized settings are a compile error rather
//! than silently ignored ambient state.

// self
use crate::{_prelude::*, error::ConfigError};

/// Default per-hour request budget.
pub const DEFAULT_MAX_REQUESTS_PER_HOUR: u32 = 60;
/// Default response-cache entry lifetime.
pub const DEFAULT_CACHE_TTL: Duration = Duration::minutes(5);
/// Default transport deadline per request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::seconds(30);

/// Redacted signing secret keeping the shared key out of logs.
#[derive(Clone, PartialEq, Eq)]
pub struct SigningSecret(String);
impl SigningSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the raw key bytes. Callers must avoid logging this value.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for SigningSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for SigningSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("SigningSecret").field(&"<redacted>").finish()
	}
}
impl Display for SigningSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Validated client configuration.
///
/// Immutable while a request is in flight; swap it between requests with
/// [`SheetClient::reconfigure`](crate::client::SheetClient::reconfigure).
#[derive(Clone, Debug)]
pub struct ClientConfig {
	/// API endpoint URL.
	pub endpoint: Url,
	/// API token attached to every request.
	pub token: String,
	/// Shared secret used for HMAC request signing.
	pub secret: SigningSecret,
	/// Optional origin identifier attached to every request.
	pub origin: Option<String>,
	/// Whether the client-side rate limiter is consulted.
	pub rate_limit_enabled: bool,
	/// Whether requests carry a one-time nonce.
	pub nonce_enabled: bool,
	/// Whether write requests carry a CSRF token.
	pub csrf_enabled: bool,
	/// Request budget per rolling hour window.
	pub max_requests_per_hour: u32,
	/// Default lifetime for cached responses.
	pub cache_ttl: Duration,
	/// Default transport deadline.
	pub request_timeout: Duration,
	/// Emits verbose diagnostics when tracing is enabled.
	pub debug: bool,
}
impl ClientConfig {
	/// Starts a builder seeded with the mandatory fields.
	pub fn builder(
		endpoint: Url,
		token: impl Into<String>,
		secret: SigningSecret,
	) -> ClientConfigBuilder {
		ClientConfigBuilder::new(endpoint, token, secret)
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug)]
pub struct ClientConfigBuilder {
	endpoint: Url,
	token: String,
	secret: SigningSecret,
	origin: Option<String>,
	rate_limit_enabled: bool,
	nonce_enabled: bool,
	csrf_enabled: bool,
	max_requests_per_hour: u32,
	cache_ttl: Duration,
	request_timeout: Duration,
	debug: bool,
}
impl ClientConfigBuilder {
	fn new(endpoint: Url, token: impl Into<String>, secret: SigningSecret) -> Self {
		Self {
			endpoint,
			token: token.into(),
			secret,
			origin: None,
			rate_limit_enabled: true,
			nonce_enabled: true,
			csrf_enabled: true,
			max_requests_per_hour: DEFAULT_MAX_REQUESTS_PER_HOUR,
			cache_ttl: DEFAULT_CACHE_TTL,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
			debug: false,
		}
	}

	/// Sets the origin identifier sent with every request.
	pub fn origin(mut self, origin: impl Into<String>) -> Self {
		self.origin = Some(origin.into());

		self
	}

	/// Toggles the client-side rate limiter.
	pub fn rate_limit_enabled(mut self, enabled: bool) -> Self {
		self.rate_limit_enabled = enabled;

		self
	}

	/// Toggles nonce enrichment.
	pub fn nonce_enabled(mut self, enabled: bool) -> Self {
		self.nonce_enabled = enabled;

		self
	}

	/// Toggles CSRF enrichment for write requests.
	pub fn csrf_enabled(mut self, enabled: bool) -> Self {
		self.csrf_enabled = enabled;

		self
	}

	/// Overrides the per-hour request budget.
	pub fn max_requests_per_hour(mut self, budget: u32) -> Self {
		self.max_requests_per_hour = budget;

		self
	}

	/// Overrides the default cache entry lifetime.
	pub fn cache_ttl(mut self, ttl: Duration) -> Self {
		self.cache_ttl = ttl;

		self
	}

	/// Overrides the default transport deadline.
	pub fn request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;

		self
	}

	/// Toggles verbose diagnostics.
	pub fn debug(mut self, debug: bool) -> Self {
		self.debug = debug;

		self
	}

	/// Consumes the builder and validates the resulting configuration.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		if self.token.is_empty() {
			return Err(ConfigError::MissingToken);
		}
		if self.secret.expose().is_empty() {
			return Err(ConfigError::MissingSecret);
		}
		if !matches!(self.endpoint.scheme(), "http" | "https") {
			return Err(ConfigError::UnsupportedScheme { scheme: self.endpoint.scheme().into() });
		}
		if self.rate_limit_enabled && self.max_requests_per_hour == 0 {
			return Err(ConfigError::ZeroRequestBudget);
		}
		if !self.cache_ttl.is_positive() {
			return Err(ConfigError::NonPositiveDuration { field: "cache_ttl" });
		}
		if !self.request_timeout.is_positive() {
			return Err(ConfigError::NonPositiveDuration { field: "request_timeout" });
		}

		Ok(ClientConfig {
			endpoint: self.endpoint,
			token: self.token,
			secret: self.secret,
			origin: self.origin,
			rate_limit_enabled: self.rate_limit_enabled,
			nonce_enabled: self.nonce_enabled,
			csrf_enabled: self.csrf_enabled,
			max_requests_per_hour: self.max_requests_per_hour,
			cache_ttl: self.cache_ttl,
			request_timeout: self.request_timeout,
			debug: self.debug,
		})
	}
}
