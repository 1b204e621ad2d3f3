//! Transport primitives for authenticated API calls.
//!
//! The module exposes [`ApiTransport`] so downstream crates can integrate
//! custom HTTP clients: the client hands a fully prepared [`TransportCall`] to
//! the transport and interprets the raw [`TransportReply`] itself, so
//! implementations never parse bodies or classify statuses. The default
//! [`ReqwestTransport`] enforces the per-call deadline and maps reqwest
//! timeouts onto [`TransportError::Timeout`].

// self
use crate::{_prelude::*, error::TransportError};

/// Logical direction of an API call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
	/// Parameter-carrying GET; the response may be cached.
	Read,
	/// JSON-body POST; never cached, carries CSRF material when enabled.
	Write,
}
impl CallKind {
	/// Stable label used in fingerprints, spans, and metrics.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Read => "read",
			Self::Write => "write",
		}
	}
}

/// One fully prepared outbound request.
#[derive(Clone, Debug)]
pub struct TransportCall {
	/// Read (GET) or write (POST).
	pub kind: CallKind,
	/// Target URL; for reads the enriched parameters are already encoded into
	/// the query string.
	pub url: Url,
	/// JSON body for writes.
	pub body: Option<serde_json::Value>,
	/// Extra headers (e.g. `X-CSRF-Token`).
	pub headers: Vec<(&'static str, String)>,
	/// Deadline for the whole request.
	pub timeout: Duration,
}

/// Raw response handed back to the client for interpretation.
#[derive(Clone, Debug)]
pub struct TransportReply {
	/// HTTP status code.
	pub status: u16,
	/// Raw response body bytes.
	pub body: Vec<u8>,
}
impl TransportReply {
	/// Whether the status is in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Boxed future returned by [`ApiTransport::execute`].
pub type TransportFuture<'a> =
	Pin<Box<dyn Future<Output = Result<TransportReply, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP stacks capable of executing prepared API calls.
///
/// Implementations must be `'static + Send + Sync` so a single transport can
/// back multiple client instances, and the returned future must be `Send` so
/// callers can box it across executor hops.
pub trait ApiTransport
where
	Self: 'static + Send + Sync,
{
	/// Executes one prepared call, honoring its deadline.
	fn execute(&self, call: TransportCall) -> TransportFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one
/// place. The per-call deadline is applied with `RequestBuilder::timeout`, so
/// a caller-provided client needs no timeout configuration of its own.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestTransport(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestTransport {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestTransport {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl std::ops::Deref for ReqwestTransport {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ApiTransport for ReqwestTransport {
	fn execute(&self, call: TransportCall) -> TransportFuture<'_> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut request = match call.kind {
				CallKind::Read => client.get(call.url.clone()),
				CallKind::Write => {
					let builder = client.post(call.url.clone());

					match call.body.as_ref() {
						Some(body) => builder.json(body),
						None => builder,
					}
				},
			};

			for (name, value) in &call.headers {
				request = request.header(*name, value.as_str());
			}

			let response =
				request.timeout(call.timeout.unsigned_abs()).send().await.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(TransportReply { status, body })
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn call_kind_labels_are_stable() {
		assert_eq!(CallKind::Read.as_str(), "read");
		assert_eq!(CallKind::Write.as_str(), "write");
	}

	#[test]
	fn reply_success_follows_2xx() {
		assert!(TransportReply { status: 200, body: Vec::new() }.is_success());
		assert!(TransportReply { status: 204, body: Vec::new() }.is_success());
		assert!(!TransportReply { status: 301, body: Vec::new() }.is_success());
		assert!(!TransportReply { status: 500, body: Vec::new() }.is_success());
	}
}
