use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result, retry};

/// Embeds a single text through an OpenAI-compatible embeddings endpoint.
pub async fn embed(
	cfg: &vomo_config::EmbeddingProviderConfig,
	retry_cfg: &vomo_config::Retry,
	text: &str,
) -> Result<Vec<f32>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let headers = crate::auth_headers(&cfg.api_key, &cfg.default_headers)?;
	let body = serde_json::json!({
		"model": cfg.model,
		"input": text,
		"encoding_format": "float",
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

	parse_embedding_response(json, cfg.dimensions)
}

fn parse_embedding_response(json: Value, dimensions: u32) -> Result<Vec<f32>> {
	let embedding = json
		.get("data")
		.and_then(|value| value.as_array())
		.and_then(|data| data.first())
		.and_then(|item| item.get("embedding"))
		.and_then(|value| value.as_array())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Embedding response is missing an embedding array.".to_string(),
		})?;
	let mut vec = Vec::with_capacity(embedding.len());

	for value in embedding {
		let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
			message: "Embedding value must be numeric.".to_string(),
		})?;

		vec.push(number as f32);
	}

	if vec.len() != dimensions as usize {
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding vector has {} dimensions, expected {dimensions}.",
				vec.len()
			),
		});
	}

	Ok(vec)
}
