use axum::{
	Json, Router,
	extract::{Multipart, Path, Query, Request, State},
	http::{HeaderValue, StatusCode},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::state::AppState;
use vomo_domain::{AudioError, AudioInput, MemoRecord, SearchResult};
use vomo_service::Error as ServiceError;

const REQUEST_ID_HEADER: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
	// Collection routes are documented with a trailing slash; axum treats the
	// two spellings as distinct paths, so both are registered.
	Router::new()
		.route("/health", get(health))
		.route("/v1/memos", post(create_memo))
		.route("/v1/memos/", post(create_memo))
		.route("/v1/memos/{memo_id}", delete(delete_memo))
		.route("/v1/search", post(search))
		.route("/v1/search/", post(search))
		.layer(middleware::from_fn(request_id))
		.with_state(state)
}

/// Tags every request with an id, echoed back in the response headers. A
/// client-supplied id is kept so callers can correlate across services.
async fn request_id(req: Request, next: Next) -> Response {
	let id = req
		.headers()
		.get(REQUEST_ID_HEADER)
		.and_then(|value| value.to_str().ok())
		.map(ToString::to_string)
		.unwrap_or_else(|| Uuid::new_v4().to_string());
	let span = tracing::info_span!(
		"request",
		request_id = %id,
		method = %req.method(),
		uri = %req.uri(),
	);
	let mut response = next.run(req).instrument(span).await;

	if let Ok(value) = HeaderValue::from_str(&id) {
		response.headers_mut().insert(REQUEST_ID_HEADER, value);
	}

	response
}

async fn health() -> StatusCode {
	StatusCode::OK
}

#[derive(Debug, Deserialize)]
struct UserParams {
	#[serde(default)]
	user_id: String,
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
	#[serde(default)]
	query: String,
	#[serde(default)]
	user_id: String,
	limit: Option<u32>,
}

#[derive(Debug, Serialize)]
struct SearchHit {
	id: String,
	title: String,
	text: String,
	#[serde(with = "vomo_domain::time_serde")]
	date: time::OffsetDateTime,
	score: f32,
}

#[derive(Debug, Serialize)]
struct SearchResponse {
	results: Vec<SearchHit>,
	total: usize,
}

async fn create_memo(
	State(state): State<AppState>,
	Query(params): Query<UserParams>,
	multipart: Multipart,
) -> Result<Json<MemoRecord>, ApiError> {
	let audio = extract_audio(multipart).await?;
	let memo = state.service.create_memo(audio, &params.user_id).await?;

	Ok(Json(memo))
}

async fn delete_memo(
	State(state): State<AppState>,
	Path(memo_id): Path<String>,
	Query(params): Query<UserParams>,
) -> Result<Json<MemoRecord>, ApiError> {
	let Some(memo) = state.service.delete_memo(&params.user_id, &memo_id).await? else {
		return Err(json_error(StatusCode::NOT_FOUND, "not_found", "Memo not found."));
	};

	Ok(Json(memo))
}

async fn search(
	State(state): State<AppState>,
	Json(payload): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
	let limit = payload.limit.unwrap_or(state.service.cfg.search.default_limit);
	let results = state.service.search(&payload.query, &payload.user_id, limit).await?;
	let results: Vec<_> = results.into_iter().map(to_hit).collect();
	let total = results.len();

	Ok(Json(SearchResponse { results, total }))
}

fn to_hit(result: SearchResult) -> SearchHit {
	SearchHit {
		id: result.memo.id,
		title: result.memo.title,
		text: result.memo.text,
		date: result.memo.date,
		score: result.score,
	}
}

/// Pulls the uploaded audio out of the `audio` multipart field. `file` is
/// accepted as an alias for older clients.
async fn extract_audio(mut multipart: Multipart) -> Result<AudioInput, ApiError> {
	while let Some(field) = multipart.next_field().await.map_err(|err| {
		json_error(StatusCode::BAD_REQUEST, "invalid_multipart", err.to_string())
	})? {
		if !matches!(field.name(), Some("audio" | "file")) {
			continue;
		}

		let filename = field
			.file_name()
			.map(ToString::to_string)
			.ok_or_else(|| {
				json_error(
					StatusCode::UNPROCESSABLE_ENTITY,
					"invalid_request",
					"Audio field must carry a filename.",
				)
			})?;
		let bytes = field.bytes().await.map_err(|err| {
			json_error(StatusCode::BAD_REQUEST, "invalid_multipart", err.to_string())
		})?;

		return AudioInput::from_filename(bytes.to_vec(), &filename).map_err(ApiError::from);
	}

	Err(json_error(StatusCode::UNPROCESSABLE_ENTITY, "invalid_request", "Audio field is required."))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError { status, error_code: code.to_string(), message: message.into() }
}

impl From<AudioError> for ApiError {
	fn from(err: AudioError) -> Self {
		let code = match err {
			AudioError::Empty => "empty_audio",
			AudioError::UnsupportedFormat { .. } => "unsupported_format",
		};

		json_error(StatusCode::BAD_REQUEST, code, err.to_string())
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		let (status, code) = match &err {
			ServiceError::InvalidRequest { .. } =>
				(StatusCode::UNPROCESSABLE_ENTITY, "invalid_request"),
			ServiceError::Transcription { .. } =>
				(StatusCode::INTERNAL_SERVER_ERROR, "transcription_failed"),
			ServiceError::Summarization { .. } =>
				(StatusCode::INTERNAL_SERVER_ERROR, "summarization_failed"),
			ServiceError::Vectorization { .. } =>
				(StatusCode::INTERNAL_SERVER_ERROR, "vectorization_failed"),
			ServiceError::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
			ServiceError::Index { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "index_error"),
		};

		json_error(status, code, err.to_string())
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
