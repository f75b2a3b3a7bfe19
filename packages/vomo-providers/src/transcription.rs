use std::time::Duration;

use reqwest::{Client, multipart};
use serde_json::Value;

use crate::{Error, Result, retry};
use vomo_domain::AudioInput;

/// Sends audio to an OpenAI-compatible transcription endpoint and returns the
/// recognized text.
pub async fn transcribe(
	cfg: &vomo_config::ProviderConfig,
	retry_cfg: &vomo_config::Retry,
	audio: &AudioInput,
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let headers = crate::auth_headers(&cfg.api_key, &cfg.default_headers)?;
	// Multipart forms are not reusable, so each retry attempt rebuilds one
	// from the owned audio bytes.
	let json = retry::with_backoff(retry_cfg, || {
		let client = client.clone();
		let url = url.clone();
		let headers = headers.clone();
		let model = cfg.model.clone();
		let bytes = audio.bytes().to_vec();
		let format = audio.format();

		async move {
			let part = multipart::Part::bytes(bytes)
				.file_name(format!("audio.{format}"))
				.mime_str(&format.mime_type())?;
			let form = multipart::Form::new().text("model", model).part("file", part);
			let res = client.post(url).headers(headers).multipart(form).send().await?;

			crate::read_json(res).await
		}
	})
	.await?;

	parse_transcription_response(json)
}

fn parse_transcription_response(json: Value) -> Result<String> {
	json.get("text")
		.and_then(|value| value.as_str())
		.map(|text| text.to_string())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Transcription response is missing text.".to_string(),
		})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_transcribed_text() {
		let json = serde_json::json!({ "text": "buy milk" });
		let parsed = parse_transcription_response(json).expect("parse failed");

		assert_eq!(parsed, "buy milk");
	}

	#[test]
	fn rejects_response_without_text() {
		let json = serde_json::json!({ "task": "transcribe" });

		assert!(matches!(
			parse_transcription_response(json),
			Err(Error::InvalidResponse { .. })
		));
	}
}
