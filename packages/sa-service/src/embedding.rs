use std::sync::Arc;

use sa_config::EmbeddingProviderConfig;

use crate::{EmbeddingProvider, Error, Result};

/// Batches texts through the embedding provider and checks what comes back.
pub struct EmbeddingClient {
	cfg: EmbeddingProviderConfig,
	provider: Arc<dyn EmbeddingProvider>,
}
impl EmbeddingClient {
	pub fn new(cfg: EmbeddingProviderConfig, provider: Arc<dyn EmbeddingProvider>) -> Self {
		Self { cfg, provider }
	}

	pub fn dimensions(&self) -> u32 {
		self.cfg.dimensions
	}

	/// One vector per input, in input order.
	pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
		if texts.is_empty() {
			return Ok(Vec::new());
		}

		let batch_size = (self.cfg.batch_size as usize).max(1);
		let mut vectors = Vec::with_capacity(texts.len());

		for batch in texts.chunks(batch_size) {
			let embedded = self.provider.embed(&self.cfg, batch).await.map_err(|err| {
				tracing::warn!(
					error = %err,
					provider_id = %self.cfg.provider_id,
					count = batch.len(),
					"Embedding request failed."
				);

				Error::embedding(err.to_string())
			})?;

			if embedded.len() != batch.len() {
				return Err(Error::embedding(format!(
					"Provider returned {} vectors for {} texts.",
					embedded.len(),
					batch.len()
				)));
			}
			if let Some(bad) = embedded.iter().find(|vector| vector.len() != self.cfg.dimensions as usize)
			{
				return Err(Error::embedding(format!(
					"Provider returned a {}-dimensional vector; expected {}.",
					bad.len(),
					self.cfg.dimensions
				)));
			}

			vectors.extend(embedded);
		}

		Ok(vectors)
	}

	pub async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
		let mut vectors = self.embed(&[text.to_string()]).await?;

		vectors.pop().ok_or_else(|| Error::embedding("Provider returned no vectors."))
	}
}
