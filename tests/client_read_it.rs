// crates.io
use httpmock::prelude::*;
use serde_json::json;
// self
use sheetwire::{_preludet::*, client::RequestOptions, error::TransportError, params::Params};

const SUCCESS_BODY: &str = "{\"status\":\"success\",\"data\":{\"rows\":[1,2,3]}}";

fn get_data_params() -> Params {
	let mut params = Params::new();

	params.insert("action", "getData");

	params
}

#[tokio::test]
async fn read_sends_enriched_signed_query() {
	let server = MockServer::start_async().await;
	let config = test_config_builder(&server.url("/api"))
		.origin("integration-tests")
		.build()
		.expect("Configuration should validate.");
	let client = build_test_client(config);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/api")
				.query_param("action", "getData")
				.query_param("token", TEST_TOKEN)
				.query_param("origin", "integration-tests")
				.query_param_exists("timestamp")
				.query_param_exists("nonce")
				.query_param_exists("signature");
			then.status(200).header("content-type", "application/json").body(SUCCESS_BODY);
		})
		.await;
	let data = client.read(&get_data_params()).await.expect("Enriched read should succeed.");

	assert_eq!(data, json!({"rows": [1, 2, 3]}));

	mock.assert_async().await;
}

#[tokio::test]
async fn cached_read_skips_the_network() {
	let server = MockServer::start_async().await;
	let config =
		test_config_builder(&server.url("/api")).build().expect("Configuration should validate.");
	let client = build_test_client(config);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api");
			then.status(200).header("content-type", "application/json").body(SUCCESS_BODY);
		})
		.await;
	let params = get_data_params();
	let first = client.read(&params).await.expect("First read should succeed.");
	let second = client.read(&params).await.expect("Cached read should succeed.");

	assert_eq!(first, second);

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn cache_opt_out_reaches_the_network_every_time() {
	let server = MockServer::start_async().await;
	let config =
		test_config_builder(&server.url("/api")).build().expect("Configuration should validate.");
	let client = build_test_client(config);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api");
			then.status(200).header("content-type", "application/json").body(SUCCESS_BODY);
		})
		.await;
	let params = get_data_params();
	let options = RequestOptions { use_cache: false, ..Default::default() };

	client.read_with(&params, &options).await.expect("First read should succeed.");
	client.read_with(&params, &options).await.expect("Second read should succeed.");

	mock.assert_calls_async(2).await;
}

#[tokio::test]
async fn third_call_within_the_hour_is_rate_limited() {
	let server = MockServer::start_async().await;
	let config = test_config_builder(&server.url("/api"))
		.max_requests_per_hour(2)
		.build()
		.expect("Configuration should validate.");
	let client = build_test_client(config);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api");
			then.status(200).header("content-type", "application/json").body(SUCCESS_BODY);
		})
		.await;

	let params = get_data_params();
	let options = RequestOptions { use_cache: false, ..Default::default() };
	// The reported reset instant sits one window ahead of now.
	let expected_reset = client.rate_limit_status().resets_at;

	client.read_with(&params, &options).await.expect("First read should succeed.");
	client.read_with(&params, &options).await.expect("Second read should succeed.");

	let err = client
		.read_with(&params, &options)
		.await
		.expect_err("Third read should exhaust the local budget.");

	match err {
		Error::RateLimited { resets_at, limit } => {
			assert_eq!(limit, 2);
			assert!(resets_at >= expected_reset, "Reset instant should not predate the window.");
		},
		other => panic!("Expected RateLimited, got {other:?}."),
	}
}

#[tokio::test]
async fn structured_error_status_maps_to_server_error() {
	let server = MockServer::start_async().await;
	let config =
		test_config_builder(&server.url("/api")).build().expect("Configuration should validate.");
	let client = build_test_client(config);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/api");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"bad\",\"code\":\"ERR_X\"}");
		})
		.await;
	let err = client
		.read(&get_data_params())
		.await
		.expect_err("Structured server errors should surface to the caller.");

	match err {
		Error::Server(server_error) => {
			assert_eq!(server_error.code.as_deref(), Some("ERR_X"));
			assert_eq!(server_error.message, "bad");
			assert_eq!(server_error.status, 400);
		},
		other => panic!("Expected Server, got {other:?}."),
	}

	mock.assert_async().await;
}

#[tokio::test]
async fn unparseable_error_body_maps_to_unexpected_status() {
	let server = MockServer::start_async().await;
	let config =
		test_config_builder(&server.url("/api")).build().expect("Configuration should validate.");
	let client = build_test_client(config);

	server
		.mock_async(|when, then| {
			when.method(GET).path("/api");
			then.status(502).body("<html>bad gateway</html>");
		})
		.await;

	let err = client
		.read(&get_data_params())
		.await
		.expect_err("Unparseable failure bodies should surface the raw status.");

	match err {
		Error::Transport(TransportError::UnexpectedStatus { status }) => assert_eq!(status, 502),
		other => panic!("Expected UnexpectedStatus, got {other:?}."),
	}
}
