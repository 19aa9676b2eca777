use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{action::SmartAction, schema::ValidationError};

/// An embedded message with the action it was labeled with.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LabeledExample {
	pub id: String,
	pub vector: Vec<f32>,
	pub action: SmartAction,
	pub original_text: String,
}
impl LabeledExample {
	pub fn new(action: SmartAction, original_text: impl Into<String>, vector: Vec<f32>) -> Self {
		let original_text = original_text.into();

		Self { id: content_id(&original_text), vector, action, original_text }
	}
}

/// Stable identifier for an example: the BLAKE3 digest of its text, hex encoded.
pub fn content_id(text: &str) -> String {
	blake3::hash(text.as_bytes()).to_hex().to_string()
}

/// Example messages grouped by the action they illustrate.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Dataset {
	entries: BTreeMap<String, Vec<String>>,
}
impl Dataset {
	pub fn from_json(raw: &str) -> Result<Self, ValidationError> {
		let entries: BTreeMap<String, Vec<String>> = serde_json::from_str(raw)
			.map_err(|err| ValidationError::malformed("Dataset", err.to_string()))?;
		let dataset = Self { entries };

		dataset.check()?;

		Ok(dataset)
	}

	pub fn from_entries<I, A, M>(entries: I) -> Result<Self, ValidationError>
	where
		I: IntoIterator<Item = (A, Vec<M>)>,
		A: Into<String>,
		M: Into<String>,
	{
		let entries = entries
			.into_iter()
			.map(|(action, messages)| {
				(action.into(), messages.into_iter().map(Into::into).collect::<Vec<_>>())
			})
			.collect();
		let dataset = Self { entries };

		dataset.check()?;

		Ok(dataset)
	}

	pub fn is_empty(&self) -> bool {
		self.entries.values().all(Vec::is_empty)
	}

	/// Number of (action, message) pairs.
	pub fn len(&self) -> usize {
		self.entries.values().map(Vec::len).sum()
	}

	/// Actions in label order, each with its messages in file order.
	pub fn groups(&self) -> impl Iterator<Item = (SmartAction, &[String])> {
		self.entries
			.iter()
			.map(|(action, messages)| (SmartAction::new(action.as_str()), messages.as_slice()))
	}

	fn check(&self) -> Result<(), ValidationError> {
		for (action, messages) in &self.entries {
			if action.trim().is_empty() {
				return Err(ValidationError::constraint("Dataset", "action labels must be non-empty"));
			}
			if messages.iter().any(|message| message.trim().is_empty()) {
				return Err(ValidationError::constraint(
					"Dataset",
					format!("messages for {action:?} must be non-empty"),
				));
			}
		}

		Ok(())
	}
}
