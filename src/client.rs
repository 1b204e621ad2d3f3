//! Request orchestration: rate limiting, caching, enrichment, signing, transport.

// self
use crate::{
	_prelude::*,
	auth::{CsrfManager, NonceGenerator, signer},
	cache::ResponseCache,
	config::ClientConfig,
	error::{ServerError, TransportError},
	http::{ApiTransport, CallKind, TransportCall},
	limit::{RateLimitStatus, RateLimiter},
	obs::{self, CallOutcome, CallSpan},
	params::Params,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestTransport;

/// Header carrying the CSRF token on write requests.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestSheetClient = SheetClient<ReqwestTransport>;

/// Per-call options recognized by [`SheetClient::read`] and
/// [`SheetClient::write`].
///
/// Every field is explicit; unrecognized settings do not exist, unlike the
/// ambient option-merging this replaces.
#[derive(Clone, Debug)]
pub struct RequestOptions {
	/// Opt out of the response cache for this call (reads only; writes are
	/// never cached).
	pub use_cache: bool,
	/// Overrides the configured cache TTL for this call's stored response.
	pub cache_ttl: Option<Duration>,
	/// Overrides the configured transport deadline.
	pub timeout: Option<Duration>,
}
impl Default for RequestOptions {
	fn default() -> Self {
		Self { use_cache: true, cache_ttl: None, timeout: None }
	}
}

/// Envelope shape produced by the remote API.
///
/// Consumed, never produced, by this crate; HTTP non-2xx is treated as failure
/// regardless of the body.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiResponse {
	/// `"success"` or `"error"`.
	#[serde(default)]
	pub status: String,
	/// Payload returned on success.
	#[serde(default)]
	pub data: Option<serde_json::Value>,
	/// Error summary when `status` is `"error"`.
	#[serde(default)]
	pub error: Option<String>,
	/// Machine-readable error code.
	#[serde(default)]
	pub code: Option<String>,
	/// Longer error message.
	#[serde(default)]
	pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
	#[serde(default)]
	error: Option<String>,
	#[serde(default)]
	code: Option<String>,
	#[serde(default)]
	message: Option<String>,
}

/// One configured client instance holding all protection state.
///
/// Reframes the source's ambient module state as an explicit object: multiple
/// independent clients can coexist in one process, each with its own rate
/// window, nonce set, CSRF token, and cache. All component state sits behind
/// mutexes so the check-then-act steps stay atomic on multi-threaded hosts.
pub struct SheetClient<T>
where
	T: ?Sized + ApiTransport,
{
	transport: Arc<T>,
	config: ClientConfig,
	limiter: Mutex<RateLimiter>,
	nonces: Mutex<NonceGenerator>,
	csrf: Mutex<CsrfManager>,
	cache: Mutex<ResponseCache>,
}
impl<T> SheetClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_transport(config: ClientConfig, transport: impl Into<Arc<T>>) -> Self {
		let limiter = Mutex::new(RateLimiter::new(config.max_requests_per_hour));

		Self {
			transport: transport.into(),
			config,
			limiter,
			nonces: Mutex::new(NonceGenerator::new()),
			csrf: Mutex::new(CsrfManager::new()),
			cache: Mutex::new(ResponseCache::new()),
		}
	}

	/// Current configuration.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Replaces the configuration between requests.
	///
	/// The rate window restarts under the new budget; cache, nonce, and CSRF
	/// state survive the swap.
	pub fn reconfigure(&mut self, config: ClientConfig) {
		*self.limiter.lock() = RateLimiter::new(config.max_requests_per_hour);
		self.config = config;
	}

	/// Issues a read (GET) request with default options.
	pub async fn read(&self, params: &Params) -> Result<serde_json::Value> {
		self.read_with(params, &RequestOptions::default()).await
	}

	/// Issues a read (GET) request.
	pub async fn read_with(
		&self,
		params: &Params,
		options: &RequestOptions,
	) -> Result<serde_json::Value> {
		self.execute(CallKind::Read, params, options).await
	}

	/// Issues a write (POST) request with default options.
	pub async fn write(&self, params: &Params) -> Result<serde_json::Value> {
		self.write_with(params, &RequestOptions::default()).await
	}

	/// Issues a write (POST) request.
	pub async fn write_with(
		&self,
		params: &Params,
		options: &RequestOptions,
	) -> Result<serde_json::Value> {
		self.execute(CallKind::Write, params, options).await
	}

	/// Reports the rate window without consuming budget.
	pub fn rate_limit_status(&self) -> RateLimitStatus {
		self.limiter.lock().status()
	}

	/// Zeroes the rate window; intended for operators and tests.
	pub fn reset_rate_limit(&self) {
		self.limiter.lock().reset();
	}

	/// Empties the response cache.
	pub fn clear_cache(&self) {
		self.cache.lock().clear();
	}

	/// Drops the cached response for one logical read, if present.
	pub fn invalidate_cached(&self, params: &Params) {
		self.cache.lock().remove(&fingerprint(CallKind::Read, params));
	}

	/// Invalidates the active CSRF token, forcing regeneration on next write.
	pub fn clear_csrf(&self) {
		self.csrf.lock().clear();
	}

	async fn execute(
		&self,
		kind: CallKind,
		params: &Params,
		options: &RequestOptions,
	) -> Result<serde_json::Value> {
		let span = CallSpan::new(kind, "execute");

		obs::record_call_outcome(kind, CallOutcome::Attempt);

		let result = span.instrument(self.execute_inner(kind, params, options)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(kind, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(kind, CallOutcome::Failure),
		}

		result
	}

	async fn execute_inner(
		&self,
		kind: CallKind,
		params: &Params,
		options: &RequestOptions,
	) -> Result<serde_json::Value> {
		params.validate()?;

		#[cfg(feature = "tracing")]
		if self.config.debug {
			tracing::debug!(
				kind = kind.as_str(),
				request = %params.canonical_string(),
				"dispatching api call"
			);
		}

		if self.config.rate_limit_enabled {
			self.limiter.lock().check_and_consume()?;
		}

		// The fingerprint covers the logical (pre-enrichment) parameters, so
		// per-call timestamps and signatures never defeat caching. Writes are
		// never cached.
		let cache_key = (kind == CallKind::Read && options.use_cache)
			.then(|| fingerprint(kind, params));

		if let Some(key) = cache_key.as_deref()
			&& let Some(hit) = self.cache.lock().get(key)
		{
			return Ok(hit);
		}

		let call = self.prepare_call(kind, params, options)?;
		let timeout = call.timeout;
		let reply = self.transport.execute(call).await.map_err(|e| match e {
			TransportError::Timeout => Error::Timeout { limit: timeout },
			other => Error::Transport(other),
		})?;

		if !reply.is_success() {
			return Err(map_failure_body(reply.status, &reply.body));
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&reply.body);
		let response: ApiResponse = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| TransportError::ResponseParse { source, status: reply.status })?;

		if response.status == "error" {
			return Err(ServerError {
				status: reply.status,
				code: response.code,
				message: response
					.error
					.or(response.message)
					.unwrap_or_else(|| "unspecified server error".into()),
			}
			.into());
		}

		let payload = response.data.unwrap_or(serde_json::Value::Null);

		if let Some(key) = cache_key {
			let ttl = options.cache_ttl.unwrap_or(self.config.cache_ttl);

			self.cache.lock().set(key, payload.clone(), ttl);
		}

		Ok(payload)
	}

	/// Enriches a copy of the caller's parameters, signs it, and renders the
	/// transport call. The caller's `Params` is never mutated.
	fn prepare_call(
		&self,
		kind: CallKind,
		params: &Params,
		options: &RequestOptions,
	) -> Result<TransportCall> {
		let _guard = CallSpan::new(kind, "prepare").entered();
		let now = OffsetDateTime::now_utc();
		let mut enriched = params.clone();

		enriched.insert("token", self.config.token.clone());
		enriched.insert("timestamp", now.unix_timestamp());

		if let Some(origin) = self.config.origin.as_deref() {
			enriched.insert("origin", origin);
		}
		if self.config.nonce_enabled {
			enriched.insert("nonce", self.nonces.lock().generate()?);
		}

		let csrf_token = (kind == CallKind::Write && self.config.csrf_enabled)
			.then(|| self.csrf.lock().token());

		if let Some(token) = csrf_token.as_deref() {
			enriched.insert("csrf-token", token);
		}

		// The signature covers every enriched field, so it is appended last.
		let signature = signer::sign(&enriched, &self.config.secret)?;

		enriched.insert("signature", signature);

		let timeout = options.timeout.unwrap_or(self.config.request_timeout);
		let mut url = self.config.endpoint.clone();
		let call = match kind {
			CallKind::Read => {
				{
					let mut pairs = url.query_pairs_mut();

					for (key, value) in enriched.iter() {
						pairs.append_pair(key, &value.render());
					}
				}

				TransportCall { kind, url, body: None, headers: Vec::new(), timeout }
			},
			CallKind::Write => TransportCall {
				kind,
				url,
				body: Some(enriched.to_json()),
				headers: csrf_token.map(|token| vec![(CSRF_HEADER, token)]).unwrap_or_default(),
				timeout,
			},
		};

		Ok(call)
	}
}
#[cfg(feature = "reqwest")]
impl SheetClient<ReqwestTransport> {
	/// Creates a client with its own reqwest-backed transport.
	pub fn new(config: ClientConfig) -> Self {
		Self::with_transport(config, ReqwestTransport::default())
	}
}
impl<T> Debug for SheetClient<T>
where
	T: ?Sized + ApiTransport,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SheetClient")
			.field("endpoint", &self.config.endpoint.as_str())
			.field("origin", &self.config.origin)
			.field("rate_limit_enabled", &self.config.rate_limit_enabled)
			.field("nonce_enabled", &self.config.nonce_enabled)
			.field("csrf_enabled", &self.config.csrf_enabled)
			.finish()
	}
}

/// Cache fingerprint for one logical request.
fn fingerprint(kind: CallKind, params: &Params) -> String {
	format!("{}:{}", kind.as_str(), params.canonical_string())
}

fn map_failure_body(status: u16, body: &[u8]) -> Error {
	match serde_json::from_slice::<ApiErrorBody>(body) {
		Ok(parsed) if parsed.error.is_some() || parsed.message.is_some() || parsed.code.is_some() =>
			ServerError {
				status,
				code: parsed.code,
				message: parsed
					.error
					.or(parsed.message)
					.unwrap_or_else(|| format!("server returned status {status}")),
			}
			.into(),
		_ => TransportError::UnexpectedStatus { status }.into(),
	}
}
