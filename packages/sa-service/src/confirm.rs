use serde::Serialize;

use sa_domain::LabeledExample;
use sa_storage::VectorRecord;

use crate::{Error, Result, SmartActionService};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ConfirmReport {
	pub upserted: usize,
}

impl SmartActionService {
	/// Stores `text` as a new labeled example for `label`.
	///
	/// The not-recognised sentinel is accepted but never stored.
	pub async fn confirm(&self, text: &str, label: &str) -> Result<ConfirmReport> {
		if text.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "Message text must be non-empty.".to_string() });
		}

		let Some(action) = self.actions().resolve(label) else {
			return Err(Error::InvalidRequest {
				message: format!("{label:?} is not a configured smart action."),
			});
		};

		if self.actions().is_not_recognised(action.as_str()) {
			tracing::debug!("Confirmed sentinel action. Nothing to store.");

			return Ok(ConfirmReport { upserted: 0 });
		}

		let vector = self.embedder().embed_one(text).await?;
		let example = LabeledExample::new(action.clone(), text, vector);
		let upserted = self.index.upsert_vectors(&[VectorRecord::from(&example)], false).await;

		tracing::info!(example_id = %example.id, action = %action, upserted, "Confirmed example stored.");

		Ok(ConfirmReport { upserted })
	}
}
