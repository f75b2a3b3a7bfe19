use std::time::Duration;

use reqwest::{Client, header::HeaderMap};
use serde_json::Value;

use crate::{Error, Result, retry};

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

const DEFAULT_SYSTEM_PROMPT: &str = "Generate only a single line containing a clear, specific \
	title (max 50 characters) that captures the core topic or action of this voice memo. Return \
	nothing else but the title itself.";

/// Asks an Anthropic-compatible messages endpoint for a short title for the
/// given transcript.
pub async fn summarize(
	cfg: &vomo_config::SummarizationProviderConfig,
	retry_cfg: &vomo_config::Retry,
	text: &str,
) -> Result<String> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let headers = summarization_headers(cfg)?;
	let system = cfg.system_prompt.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
	let body = serde_json::json!({
		"model": cfg.model,
		"max_tokens": cfg.max_tokens,
		"system": system,
		"messages": [{ "role": "user", "content": text }],
	});
	let json = retry::with_backoff(retry_cfg, || {
		let client = client.clone();
		let url = url.clone();
		let headers = headers.clone();
		let body = body.clone();

		async move {
			let res = client.post(url).headers(headers).json(&body).send().await?;

			crate::read_json(res).await
		}
	})
	.await?;

	parse_summarization_response(json)
}

fn summarization_headers(cfg: &vomo_config::SummarizationProviderConfig) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert("x-api-key", cfg.api_key.parse()?);
	headers.insert("anthropic-version", ANTHROPIC_VERSION.parse()?);

	crate::apply_default_headers(&mut headers, &cfg.default_headers)?;

	Ok(headers)
}

fn parse_summarization_response(json: Value) -> Result<String> {
	json.get("content")
		.and_then(|value| value.as_array())
		.and_then(|content| content.first())
		.and_then(|block| block.get("text"))
		.and_then(|value| value.as_str())
		.map(|text| text.to_string())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Summarization response is missing content text.".to_string(),
		})
}
