use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use tower::util::ServiceExt;

use vomo_api::{routes, state::AppState};
use vomo_service::{MemoService, Providers};
use vomo_testkit::{
	CallLog, FakeSummarizer, FakeTranscriber, FakeVectorizer, MemoryRecordStore, MemoryVectorIndex,
	index_match, memo, test_config,
};

const BOUNDARY: &str = "vomo-test-boundary";

struct Fixture {
	app: Router,
	records: Arc<MemoryRecordStore>,
	index: Arc<MemoryVectorIndex>,
}

fn fixture() -> Fixture {
	let log = CallLog::new();
	let records = Arc::new(MemoryRecordStore::new(log.clone()));
	let index = Arc::new(MemoryVectorIndex::new(log.clone()));
	let providers = Providers::new(
		Arc::new(FakeTranscriber { log: log.clone(), text: "buy milk".to_string(), fail: false }),
		Arc::new(FakeSummarizer {
			log: log.clone(),
			title: "Shopping reminder".to_string(),
			fail: false,
		}),
		Arc::new(FakeVectorizer { log, vector: vec![0.5, 0.25, 0.125], fail: false }),
	);
	let service =
		MemoService::with_providers(test_config(), records.clone(), index.clone(), providers);
	let app = routes::router(AppState { service: Arc::new(service) });

	Fixture { app, records, index }
}

fn multipart_body(field: &str, filename: &str) -> Body {
	let body = format!(
		"--{BOUNDARY}\r\n\
		Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
		Content-Type: application/octet-stream\r\n\r\n\
		fake audio bytes\r\n\
		--{BOUNDARY}--\r\n"
	);

	Body::from(body)
}

fn upload_request(uri: &str, field: &str, filename: &str) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
		.body(multipart_body(field, filename))
		.expect("Failed to build request.")
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&body).expect("Failed to parse response.")
}

#[tokio::test]
async fn health_ok() {
	let f = fixture();
	let response = f
		.app
		.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_memo_returns_the_full_record() {
	let f = fixture();
	let response = f
		.app
		.oneshot(upload_request("/v1/memos/?user_id=alice", "audio", "note.wav"))
		.await
		.expect("Failed to call create.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = response_json(response).await;

	assert_eq!(json["id"], "memo-1");
	assert_eq!(json["text"], "buy milk");
	assert_eq!(json["title"], "Shopping reminder");
	assert_eq!(json["embedding"], serde_json::json!([0.5, 0.25, 0.125]));
	assert_eq!(f.index.upserts(), [("memo-1".to_string(), "alice".to_string())]);
}

#[tokio::test]
async fn create_memo_accepts_both_path_spellings() {
	for uri in ["/v1/memos?user_id=alice", "/v1/memos/?user_id=alice"] {
		let f = fixture();
		let response = f
			.app
			.oneshot(upload_request(uri, "audio", "note.wav"))
			.await
			.expect("Failed to call create.");

		assert_eq!(response.status(), StatusCode::OK, "unexpected status for {uri}");
	}
}

#[tokio::test]
async fn create_memo_accepts_the_file_field_alias() {
	let f = fixture();
	let response = f
		.app
		.oneshot(upload_request("/v1/memos/?user_id=alice", "file", "note.wav"))
		.await
		.expect("Failed to call create.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_memo_without_user_id_is_rejected() {
	let f = fixture();
	let response = f
		.app
		.oneshot(upload_request("/v1/memos/", "audio", "note.wav"))
		.await
		.expect("Failed to call create.");

	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

	let json = response_json(response).await;

	assert_eq!(json["error_code"], "invalid_request");
}

#[tokio::test]
async fn create_memo_with_unknown_extension_is_rejected() {
	let f = fixture();
	let response = f
		.app
		.oneshot(upload_request("/v1/memos/?user_id=alice", "audio", "note.txt"))
		.await
		.expect("Failed to call create.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let json = response_json(response).await;

	assert_eq!(json["error_code"], "unsupported_format");
}

#[tokio::test]
async fn create_memo_without_audio_field_is_rejected() {
	let f = fixture();
	let body = format!(
		"--{BOUNDARY}\r\n\
		Content-Disposition: form-data; name=\"other\"\r\n\r\n\
		value\r\n\
		--{BOUNDARY}--\r\n"
	);
	let request = Request::builder()
		.method("POST")
		.uri("/v1/memos/?user_id=alice")
		.header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
		.body(Body::from(body))
		.unwrap();
	let response = f.app.oneshot(request).await.expect("Failed to call create.");

	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn search_returns_results_and_total() {
	let f = fixture();

	f.records.seed(memo("alice", "m1", "buy milk", "Shopping reminder"));
	f.records.seed(memo("alice", "m2", "call mom", "Call reminder"));
	// Scores exactly representable in binary survive the f32-to-JSON trip.
	f.index.set_matches(vec![index_match("m2", 0.5), index_match("m1", 0.25)]);

	let payload = serde_json::json!({ "query": "reminders", "user_id": "alice" });
	let request = Request::builder()
		.method("POST")
		.uri("/v1/search/")
		.header("content-type", "application/json")
		.body(Body::from(payload.to_string()))
		.unwrap();
	let response = f.app.oneshot(request).await.expect("Failed to call search.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = response_json(response).await;

	assert_eq!(json["total"], 2);
	assert_eq!(json["results"][0]["id"], "m2");
	assert_eq!(json["results"][0]["score"], 0.5);
	assert_eq!(json["results"][1]["id"], "m1");
}

#[tokio::test]
async fn search_with_blank_query_is_rejected() {
	let f = fixture();
	let payload = serde_json::json!({ "query": " ", "user_id": "alice" });
	let request = Request::builder()
		.method("POST")
		.uri("/v1/search")
		.header("content-type", "application/json")
		.body(Body::from(payload.to_string()))
		.unwrap();
	let response = f.app.oneshot(request).await.expect("Failed to call search.");

	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn delete_of_unknown_memo_is_not_found() {
	let f = fixture();
	let request = Request::builder()
		.method("DELETE")
		.uri("/v1/memos/missing?user_id=alice")
		.body(Body::empty())
		.unwrap();
	let response = f.app.oneshot(request).await.expect("Failed to call delete.");

	assert_eq!(response.status(), StatusCode::NOT_FOUND);

	let json = response_json(response).await;

	assert_eq!(json["error_code"], "not_found");
}

#[tokio::test]
async fn delete_returns_the_removed_memo() {
	let f = fixture();

	f.records.seed(memo("alice", "m1", "old note", "Old note"));

	let request = Request::builder()
		.method("DELETE")
		.uri("/v1/memos/m1?user_id=alice")
		.body(Body::empty())
		.unwrap();
	let response = f.app.oneshot(request).await.expect("Failed to call delete.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = response_json(response).await;

	assert_eq!(json["id"], "m1");
	assert_eq!(f.index.deletes(), ["m1"]);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
	let f = fixture();
	let response = f
		.app
		.clone()
		.oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
		.await
		.expect("Failed to call /health.");

	assert!(response.headers().contains_key("x-request-id"));

	let response = f
		.app
		.oneshot(
			Request::builder()
				.uri("/health")
				.header("x-request-id", "caller-chosen")
				.body(Body::empty())
				.unwrap(),
		)
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.headers()["x-request-id"], "caller-chosen");
}
