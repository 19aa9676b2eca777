use futures::future;
use serde::Serialize;

use sa_domain::{FewShotExample, SmartAction, schema};

use crate::{Error, Result, SmartActionService};

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionSource {
	IndexMatch { score: f32 },
	Classifier,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Resolution {
	pub action: SmartAction,
	pub source: ResolutionSource,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FewShotMode {
	Static,
	Dynamic,
}

impl SmartActionService {
	pub async fn resolve(&self, message: &str) -> Result<SmartAction> {
		Ok(self.resolve_detailed(message).await?.action)
	}

	/// Index first; the language model only sees messages without a confident match.
	pub async fn resolve_detailed(&self, message: &str) -> Result<Resolution> {
		if message.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "Message text must be non-empty.".to_string() });
		}

		let vector = self.embedder().embed_one(message).await?;
		let threshold = self.cfg.actions.confidence_threshold;

		if let Some(found) = self.index.get_closest_match(&vector).await? {
			if found.score > threshold {
				if self.actions().resolve(found.action.as_str()).is_none() {
					tracing::warn!(
						action = %found.action,
						score = found.score,
						"Index match carries a label outside the configured actions."
					);
				}

				tracing::info!(action = %found.action, score = found.score, "Resolved from index match.");

				return Ok(Resolution {
					action: found.action,
					source: ResolutionSource::IndexMatch { score: found.score },
				});
			}

			tracing::debug!(
				action = %found.action,
				score = found.score,
				threshold,
				"Index match below confidence threshold."
			);
		}

		let examples = self.few_shot_examples(&vector).await;
		let prompt = self.prompt.render(message, &examples);
		let llm_cfg = &self.cfg.providers.llm_classifier;
		let raw = self
			.providers
			.classifier
			.complete(llm_cfg, &prompt.system, &prompt.human, llm_cfg.temperature)
			.await
			.map_err(|err| Error::Classifier { message: err.to_string() })?;
		let response = schema::parse_classification(&raw, self.actions()).map_err(|err| {
			tracing::warn!(error = %err, "Classifier reply failed validation.");

			err
		})?;
		let action = response.action();

		tracing::info!(action = %action, examples = examples.len(), "Resolved from classifier.");

		Ok(Resolution { action, source: ResolutionSource::Classifier })
	}

	async fn few_shot_examples(&self, vector: &[f32]) -> Vec<FewShotExample> {
		if resolve_few_shot_mode(&self.cfg.actions) == FewShotMode::Static {
			return self.static_examples.clone();
		}

		let lookups = self.actions().known().iter().map(|action| async move {
			(action, self.index.get_closest_match_for_action(vector, action).await)
		});
		let mut examples = Vec::new();

		for (action, lookup) in future::join_all(lookups).await {
			match lookup {
				Ok(Some(text)) => examples.push(FewShotExample::new(text, action.clone())),
				Ok(None) => {},
				Err(err) => {
					tracing::warn!(error = %err, action = %action, "Few-shot lookup failed.");
				},
			}
		}

		if examples.is_empty() {
			tracing::debug!("No dynamic few-shot examples found. Using static examples.");

			return self.static_examples.clone();
		}

		examples
	}
}

fn resolve_few_shot_mode(cfg: &sa_config::Actions) -> FewShotMode {
	match cfg.few_shot.mode.trim() {
		"static" => FewShotMode::Static,
		"dynamic" => FewShotMode::Dynamic,
		_ => FewShotMode::Static,
	}
}
