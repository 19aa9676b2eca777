//! Strict shapes for data that arrives from outside the process.
//!
//! Every payload from the vector index or the language model passes through [`validate`] before
//! any field of it is trusted. Validation never panics; malformed input becomes a
//! [`ValidationError`].

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::action::{ActionSet, SmartAction};

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
	#[error("{shape} is malformed: {message}.")]
	Malformed { shape: &'static str, message: String },
	#[error("{shape} is invalid: {message}.")]
	Constraint { shape: &'static str, message: String },
	#[error("{label:?} is not a known smart action.")]
	UnknownAction { label: String },
}
impl ValidationError {
	pub fn malformed(shape: &'static str, message: impl Into<String>) -> Self {
		Self::Malformed { shape, message: message.into() }
	}

	pub fn constraint(shape: &'static str, message: impl Into<String>) -> Self {
		Self::Constraint { shape, message: message.into() }
	}
}

/// A structure that untrusted JSON can be validated against.
pub trait Shape
where
	Self: DeserializeOwned,
{
	const NAME: &'static str;

	/// Semantic checks that run after structural decoding succeeds.
	fn check(&self) -> Result<(), ValidationError> {
		Ok(())
	}
}

/// The top match of a nearest-neighbor query, as reported by the index.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ClosestMatch {
	pub score: f32,
	pub metadata: MatchMetadata,
}
impl Shape for ClosestMatch {
	const NAME: &'static str = "ClosestMatch";

	fn check(&self) -> Result<(), ValidationError> {
		if !self.score.is_finite() || !(0.0..=1.0).contains(&self.score) {
			return Err(ValidationError::constraint(
				Self::NAME,
				format!("score {} is outside 0.0-1.0", self.score),
			));
		}
		if self.metadata.action.trim().is_empty() {
			return Err(ValidationError::constraint(Self::NAME, "metadata.action is empty"));
		}

		Ok(())
	}
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MatchMetadata {
	pub action: String,
	#[serde(default, alias = "originalMessage")]
	pub original_message: Option<String>,
}

/// What the language model must answer with.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResponse {
	pub user_message: String,
	pub smart_action: String,
}
impl ClassificationResponse {
	pub fn action(&self) -> SmartAction {
		SmartAction::new(self.smart_action.as_str())
	}
}
impl Shape for ClassificationResponse {
	const NAME: &'static str = "ClassificationResponse";

	fn check(&self) -> Result<(), ValidationError> {
		if self.smart_action.trim().is_empty() {
			return Err(ValidationError::constraint(Self::NAME, "smartAction is empty"));
		}

		Ok(())
	}
}

pub fn validate<T>(raw: &Value) -> Result<T, ValidationError>
where
	T: Shape,
{
	let parsed = T::deserialize(raw).map_err(|err| ValidationError::malformed(T::NAME, err.to_string()))?;

	parsed.check()?;

	Ok(parsed)
}

pub fn validate_str<T>(raw: &str) -> Result<T, ValidationError>
where
	T: Shape,
{
	let value: Value =
		serde_json::from_str(raw).map_err(|err| ValidationError::malformed(T::NAME, err.to_string()))?;

	validate(&value)
}

/// Parses raw model output into a classification whose action belongs to `actions`.
pub fn parse_classification(
	raw_text: &str,
	actions: &ActionSet,
) -> Result<ClassificationResponse, ValidationError> {
	let mut response: ClassificationResponse = validate_str(strip_code_fence(raw_text))?;
	let Some(action) = actions.resolve(&response.smart_action) else {
		return Err(ValidationError::UnknownAction { label: response.smart_action });
	};

	response.smart_action = action.into_string();

	Ok(response)
}

fn strip_code_fence(raw: &str) -> &str {
	let trimmed = raw.trim();
	let Some(body) = trimmed.strip_prefix("```").and_then(|rest| rest.strip_suffix("```")) else {
		return trimmed;
	};

	// A language tag may sit on its own line or directly against the object.
	body.trim().trim_start_matches(|c: char| c.is_ascii_alphanumeric()).trim()
}
