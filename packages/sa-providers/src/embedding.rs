use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
	data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
	#[serde(default)]
	index: Option<usize>,
	embedding: Vec<f32>,
}

/// Embeds `texts` in one request. Vectors come back in input order.
pub async fn embed(
	cfg: &sa_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let client = crate::http_client(cfg.timeout_ms)?;
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let json: Value = client
		.post(format!("{}{}", cfg.api_base, cfg.path))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?
		.error_for_status()?
		.json()
		.await?;
	let vectors = parse_embedding_response(json)?;

	tracing::debug!(provider_id = %cfg.provider_id, count = vectors.len(), "Embedding batch completed.");

	Ok(vectors)
}

/// Orders items by their reported `index`, falling back to response position when absent.
fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let response: EmbeddingResponse = serde_json::from_value(json)
		.map_err(|err| Error::invalid_response(format!("Embedding response is malformed: {err}.")))?;
	let count = response.data.len();
	let mut slots: Vec<Option<Vec<f32>>> = vec![None; count];

	for (position, item) in response.data.into_iter().enumerate() {
		let index = item.index.unwrap_or(position);
		let Some(slot) = slots.get_mut(index) else {
			return Err(Error::invalid_response(format!(
				"Embedding index {index} is out of range for {count} items."
			)));
		};

		if slot.replace(item.embedding).is_some() {
			return Err(Error::invalid_response(format!("Embedding index {index} appears twice.")));
		}
	}

	Ok(slots.into_iter().flatten().collect())
}
