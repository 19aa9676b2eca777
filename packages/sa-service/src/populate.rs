use std::{collections::HashMap, fs, path::Path};

use serde::Serialize;

use sa_domain::{Dataset, LabeledExample, ValidationError};
use sa_storage::VectorRecord;

use crate::{Error, Result, SmartActionService};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PopulateReport {
	/// Distinct labeled examples built from the dataset.
	pub examples: usize,
	pub upserted: usize,
}

pub fn load_dataset(path: &Path) -> Result<Dataset> {
	let raw = fs::read_to_string(path).map_err(|err| Error::Dataset {
		message: format!("Failed to read {}: {err}.", path.display()),
	})?;

	Dataset::from_json(&raw).map_err(|err| match err {
		ValidationError::Constraint { .. } => Error::InvalidRequest { message: err.to_string() },
		_ => Error::Dataset { message: err.to_string() },
	})
}

impl SmartActionService {
	/// Embeds every dataset message. A message listed under several actions keeps the last one.
	pub async fn build_examples(&self, dataset: &Dataset) -> Result<Vec<LabeledExample>> {
		let mut examples: Vec<LabeledExample> = Vec::with_capacity(dataset.len());
		let mut positions: HashMap<String, usize> = HashMap::new();

		for (action, messages) in dataset.groups() {
			if self.actions().resolve(action.as_str()).is_none() {
				tracing::warn!(action = %action, "Dataset action is not among the configured actions.");
			}

			let vectors = self.embedder().embed(messages).await?;

			for (message, vector) in messages.iter().zip(vectors) {
				let example = LabeledExample::new(action.clone(), message.as_str(), vector);

				match positions.get(&example.id) {
					Some(&position) => {
						tracing::info!(
							example_id = %example.id,
							previous = %examples[position].action,
							action = %example.action,
							"Duplicate dataset message. Keeping the later action."
						);

						examples[position] = example;
					},
					None => {
						positions.insert(example.id.clone(), examples.len());
						examples.push(example);
					},
				}
			}
		}

		Ok(examples)
	}

	/// Rebuilds the index from `dataset`.
	pub async fn populate(&self, dataset: &Dataset) -> Result<PopulateReport> {
		let examples = self.build_examples(dataset).await?;
		let records = examples.iter().map(VectorRecord::from).collect::<Vec<_>>();

		self.index.refresh_index().await?;

		let upserted = self.index.upsert_vectors(&records, true).await;
		let report = PopulateReport { examples: examples.len(), upserted };

		tracing::info!(
			index = %self.index.name(),
			examples = report.examples,
			upserted = report.upserted,
			"Index populated."
		);

		Ok(report)
	}
}
