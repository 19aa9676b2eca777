//! Lifecycle and query operations over one named nearest-neighbor index.

use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use tokio::time as tokio_time;

use sa_domain::{ClosestMatch, SmartAction, schema};

use crate::{
	Error, Result,
	store::{QueryRequest, RawMatch, VectorRecord, VectorStore},
};

#[derive(Clone, Debug, PartialEq)]
pub struct MatchResult {
	pub action: SmartAction,
	pub score: f32,
}

pub struct VectorIndexClient {
	store: Arc<dyn VectorStore>,
	name: String,
	dimension: u32,
	polling: sa_config::Polling,
}
impl VectorIndexClient {
	pub fn new(store: Arc<dyn VectorStore>, cfg: &sa_config::Storage) -> Self {
		Self {
			store,
			name: cfg.index.name.clone(),
			dimension: cfg.index.vector_dim,
			polling: cfg.polling.clone(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn dimension(&self) -> u32 {
		self.dimension
	}

	pub async fn create_index(&self) -> Result<()> {
		self.store.create_index(&self.name, self.dimension).await?;

		tracing::info!(index = %self.name, dimension = self.dimension, "Index created.");

		Ok(())
	}

	/// Creates the index unless it is already present. Returns whether it was created.
	pub async fn ensure_index(&self) -> Result<bool> {
		match self.create_index().await {
			Ok(()) => Ok(true),
			Err(Error::AlreadyExists { .. }) => Ok(false),
			Err(err) => Err(err),
		}
	}

	pub async fn delete_index(&self) -> Result<()> {
		if !self.is_index_ready().await? {
			tracing::debug!(index = %self.name, "Index absent. Nothing to delete.");

			return Ok(());
		}

		if let Err(err) = self.store.delete_index(&self.name).await {
			tracing::warn!(error = %err, index = %self.name, "Index delete request failed. Polling anyway.");
		}

		self.poll_until("index deletion", || async {
			Ok::<_, Error>(!self.is_index_ready().await?)
		})
		.await?;

		tracing::info!(index = %self.name, "Index deleted.");

		Ok(())
	}

	pub async fn refresh_index(&self) -> Result<()> {
		self.delete_index().await?;
		self.create_index().await
	}

	pub async fn is_index_ready(&self) -> Result<bool> {
		let names = self.store.list_indexes().await?;

		Ok(names.iter().any(|name| name == &self.name))
	}

	/// Writes `records` and returns how many were written.
	///
	/// Never fails. Store errors and consistency timeouts are logged and reported as `0`.
	pub async fn upsert_vectors(&self, records: &[VectorRecord], wait_until_consistent: bool) -> usize {
		let batch = self.prepare_batch(records);

		if batch.is_empty() {
			return 0;
		}

		if let Err(err) = self.store.upsert(&self.name, &batch).await {
			tracing::warn!(error = %err, index = %self.name, count = batch.len(), "Vector upsert failed.");

			return 0;
		}

		if wait_until_consistent {
			let expected = batch.len() as u64;
			let converged = self
				.poll_until("upsert consistency", || async {
					let stats = self.store.describe_stats(&self.name).await?;

					Ok::<_, Error>(stats.total_record_count == expected)
				})
				.await;

			if let Err(err) = converged {
				tracing::warn!(
					error = %err,
					index = %self.name,
					expected,
					"Index did not report the written records."
				);

				return 0;
			}
		}

		tracing::info!(index = %self.name, count = batch.len(), "Vectors upserted.");

		batch.len()
	}

	pub async fn get_closest_match(&self, vector: &[f32]) -> Result<Option<MatchResult>> {
		let Some(closest) = self.closest(vector, None).await? else {
			return Ok(None);
		};

		Ok(Some(MatchResult {
			action: SmartAction::new(closest.metadata.action.trim()),
			score: closest.score,
		}))
	}

	/// Returns the original text of the closest example labeled `action`.
	pub async fn get_closest_match_for_action(
		&self,
		vector: &[f32],
		action: &SmartAction,
	) -> Result<Option<String>> {
		let Some(closest) = self.closest(vector, Some(action.as_str())).await? else {
			return Ok(None);
		};

		if closest.metadata.action.trim() != action.as_str() {
			tracing::warn!(
				index = %self.name,
				requested = %action,
				returned = %closest.metadata.action,
				"Filtered query returned a different action. Ignoring match."
			);

			return Ok(None);
		}

		Ok(closest.metadata.original_message.filter(|text| !text.trim().is_empty()))
	}

	async fn closest(&self, vector: &[f32], action: Option<&str>) -> Result<Option<ClosestMatch>> {
		if vector.len() != self.dimension as usize {
			return Err(Error::InvalidArgument(format!(
				"Query vector has {} dimensions; index {:?} expects {}.",
				vector.len(),
				self.name,
				self.dimension
			)));
		}

		let request = QueryRequest { vector, top_k: 1, action };
		let hits = self.store.query(&self.name, request).await?;
		let Some(mut hit) = hits.into_iter().next() else {
			return Ok(None);
		};

		hit.score = normalize_score(hit.score);

		Ok(self.validate_match(&hit))
	}

	fn validate_match(&self, hit: &RawMatch) -> Option<ClosestMatch> {
		match schema::validate::<ClosestMatch>(&hit.to_json()) {
			Ok(closest) => Some(closest),
			Err(err) => {
				tracing::warn!(
					error = %err,
					index = %self.name,
					record_id = hit.id.as_deref().unwrap_or("-"),
					"Discarding invalid index match."
				);

				None
			},
		}
	}

	/// Drops records that cannot be stored and collapses duplicate ids, keeping the last one.
	fn prepare_batch(&self, records: &[VectorRecord]) -> Vec<VectorRecord> {
		let mut batch: Vec<VectorRecord> = Vec::with_capacity(records.len());
		let mut positions: HashMap<&str, usize> = HashMap::new();

		for record in records {
			if record.values.len() != self.dimension as usize {
				tracing::warn!(
					record_id = %record.id,
					dimension = record.values.len(),
					expected = self.dimension,
					"Skipping record with wrong vector dimension."
				);

				continue;
			}
			if record.metadata.action.trim().is_empty() {
				tracing::warn!(record_id = %record.id, "Skipping record without an action.");

				continue;
			}

			match positions.get(record.id.as_str()) {
				Some(&position) => batch[position] = record.clone(),
				None => {
					positions.insert(record.id.as_str(), batch.len());
					batch.push(record.clone());
				},
			}
		}

		batch
	}

	async fn poll_until<F, Fut>(&self, operation: &'static str, mut check: F) -> Result<()>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<bool>>,
	{
		let interval = Duration::from_millis(self.polling.interval_ms);

		for attempt in 1..=self.polling.max_attempts {
			if check().await? {
				return Ok(());
			}

			if attempt < self.polling.max_attempts {
				tracing::debug!(index = %self.name, operation, attempt, "Waiting for index to converge.");

				tokio_time::sleep(interval).await;
			}
		}

		Err(Error::Timeout { operation, attempts: self.polling.max_attempts })
	}
}

/// Folds a raw cosine score into 0.0-1.0. Opposite vectors score 0.0 and float rounding on
/// identical vectors can land just above 1.0. Non-finite scores pass through for validation to
/// reject.
fn normalize_score(score: f32) -> f32 {
	if score.is_finite() { score.clamp(0.0, 1.0) } else { score }
}
