pub mod embedding;
mod error;
pub mod retry;
pub mod summarization;
pub mod transcription;

pub use error::{Error, Result};

use reqwest::{
	Response,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

const MAX_ERROR_BODY_CHARS: usize = 300;

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);

	apply_default_headers(&mut headers, default_headers)?;

	Ok(headers)
}

pub fn apply_default_headers(
	headers: &mut HeaderMap,
	default_headers: &Map<String, Value>,
) -> Result<()> {
	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidResponse {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(())
}

/// Decodes a provider response, mapping non-success statuses to
/// [`Error::Status`] so the retry layer can classify them.
pub(crate) async fn read_json(res: Response) -> Result<Value> {
	let status = res.status();

	if !status.is_success() {
		let body = res.text().await.unwrap_or_default();
		let message = body.chars().take(MAX_ERROR_BODY_CHARS).collect();

		return Err(Error::Status { status: status.as_u16(), message });
	}

	Ok(res.json().await?)
}
