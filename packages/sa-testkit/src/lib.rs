mod error;
mod memory;

pub use error::{Error, Result};
pub use memory::InMemoryStore;

use std::env;

use qdrant_client::Qdrant;
use serde_json::Map;
use uuid::Uuid;

pub const TEST_ACTIONS: [&str; 4] =
	["create-pull-request", "create-documentation", "lookup-documentation", "assign-task"];

pub fn env_qdrant_url() -> Option<String> {
	env::var("SA_QDRANT_URL").ok().filter(|url| !url.trim().is_empty())
}

pub fn unique_index_name(prefix: &str) -> String {
	format!("{prefix}_{}", Uuid::new_v4().simple())
}

/// A complete configuration suitable for tests: short polling, tiny vectors, the standard labels.
pub fn test_config(index_name: &str, vector_dim: u32) -> sa_config::Config {
	sa_config::Config {
		service: sa_config::Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "debug".to_string(),
		},
		storage: sa_config::Storage {
			index: sa_config::Index {
				url: env_qdrant_url().unwrap_or_else(|| "http://127.0.0.1:6334".to_string()),
				name: index_name.to_string(),
				vector_dim,
				api_key: None,
			},
			polling: sa_config::Polling { interval_ms: 5, max_attempts: 20 },
		},
		providers: sa_config::Providers {
			embedding: sa_config::EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/embeddings".to_string(),
				model: "test-embedding".to_string(),
				dimensions: vector_dim,
				batch_size: 2,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			llm_classifier: sa_config::LlmProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/v1/chat/completions".to_string(),
				model: "test-llm".to_string(),
				temperature: 0.1,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		actions: sa_config::Actions {
			known: TEST_ACTIONS.iter().map(|label| label.to_string()).collect(),
			not_recognised: "action-not-recognised".to_string(),
			confidence_threshold: 0.9,
			few_shot: sa_config::FewShot::default(),
		},
		dataset: sa_config::Dataset::default(),
	}
}

/// Drops a Qdrant collection created by a live test. Missing collections are ignored.
pub async fn cleanup_qdrant_index(url: &str, name: &str) -> Result<()> {
	let client = Qdrant::from_url(url).build()?;

	if client.collection_exists(name).await? {
		client.delete_collection(name.to_string()).await?;
	}

	Ok(())
}
