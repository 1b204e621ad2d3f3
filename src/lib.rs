//! Authenticated client SDK for spreadsheet-backed HTTP APIs—deterministic HMAC request
//! signing, replay nonces, CSRF tokens, client-side rate limiting, and response caching
//! composed behind one typed client.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod limit;
pub mod obs;
pub mod params;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		client::{ReqwestSheetClient, SheetClient},
		config::{ClientConfig, ClientConfigBuilder, SigningSecret},
		http::ReqwestTransport,
	};

	/// API token used by every integration-test client.
	pub const TEST_TOKEN: &str = "sdk-test-token";
	/// Shared signing secret used by every integration-test client.
	pub const TEST_SECRET: &str = "sdk-test-secret";

	/// Starts a configuration builder pointed at an `httpmock` endpoint.
	pub fn test_config_builder(endpoint: &str) -> ClientConfigBuilder {
		ClientConfig::builder(
			Url::parse(endpoint).expect("Test endpoint should parse successfully."),
			TEST_TOKEN,
			SigningSecret::new(TEST_SECRET),
		)
	}

	/// Constructs a [`SheetClient`] backed by the default reqwest transport.
	pub fn build_test_client(config: ClientConfig) -> ReqwestSheetClient {
		SheetClient::with_transport(config, ReqwestTransport::default())
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap, HashSet, VecDeque},
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::Deserialize;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use time;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, sheetwire as _};
