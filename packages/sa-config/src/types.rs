use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub actions: Actions,
	#[serde(default)]
	pub dataset: Dataset,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub index: Index,
	#[serde(default)]
	pub polling: Polling,
}

/// Connection and shape of the nearest-neighbor index holding labeled examples.
#[derive(Debug, Clone, Deserialize)]
pub struct Index {
	pub url: String,
	pub name: String,
	pub vector_dim: u32,
	pub api_key: Option<String>,
}

/// Bounds for the sleep-then-recheck loops used while the index converges.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Polling {
	pub interval_ms: u64,
	pub max_attempts: u32,
}
impl Default for Polling {
	fn default() -> Self {
		Self { interval_ms: 1_000, max_attempts: 60 }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub llm_classifier: LlmProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	#[serde(default = "default_batch_size")]
	pub batch_size: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	#[serde(default = "default_temperature")]
	pub temperature: f32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Actions {
	/// Ordered list of labels the classifier may choose from.
	pub known: Vec<String>,
	#[serde(default = "default_not_recognised")]
	pub not_recognised: String,
	/// Index matches scoring strictly above this value skip classification.
	#[serde(default = "default_confidence_threshold")]
	pub confidence_threshold: f32,
	#[serde(default)]
	pub few_shot: FewShot,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FewShot {
	/// Either "static" or "dynamic".
	#[serde(default = "default_few_shot_mode")]
	pub mode: String,
	#[serde(default = "default_few_shot_examples")]
	pub examples: Vec<FewShotExample>,
}
impl Default for FewShot {
	fn default() -> Self {
		Self { mode: default_few_shot_mode(), examples: default_few_shot_examples() }
	}
}

#[derive(Debug, Clone, Deserialize)]
pub struct FewShotExample {
	pub user_message: String,
	pub smart_action: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Dataset {
	pub path: Option<String>,
}

fn default_batch_size() -> u32 {
	64
}

fn default_temperature() -> f32 {
	0.1
}

fn default_not_recognised() -> String {
	"action-not-recognised".to_string()
}

fn default_confidence_threshold() -> f32 {
	0.9
}

fn default_few_shot_mode() -> String {
	"static".to_string()
}

fn default_few_shot_examples() -> Vec<FewShotExample> {
	[
		(
			"Identified a bug in the login module and fixed it. About to create a pull request to fix it.",
			"create-pull-request",
		),
		("Finished with the new feature, and starting the documentation.", "create-documentation"),
		(
			"Have you documented the changes you made to the service as a part of the development of feature X?",
			"lookup-documentation",
		),
		("Feel free to assign @teammate with fixing the authentication bug.", "assign-task"),
	]
	.into_iter()
	.map(|(user_message, smart_action)| FewShotExample {
		user_message: user_message.to_string(),
		smart_action: smart_action.to_string(),
	})
	.collect()
}
