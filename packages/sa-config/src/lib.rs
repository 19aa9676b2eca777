mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Actions, Config, Dataset, EmbeddingProviderConfig, FewShot, FewShotExample, Index,
	LlmProviderConfig, Polling, Providers, Service, Storage,
};

use std::{collections::HashSet, fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.index.url.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.index.url must be non-empty.".to_string(),
		});
	}
	if cfg.storage.index.name.trim().is_empty() {
		return Err(Error::Validation {
			message: "storage.index.name must be non-empty.".to_string(),
		});
	}
	if cfg.storage.polling.interval_ms == 0 {
		return Err(Error::Validation {
			message: "storage.polling.interval_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.polling.max_attempts == 0 {
		return Err(Error::Validation {
			message: "storage.polling.max_attempts must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.index.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.index.vector_dim."
				.to_string(),
		});
	}
	if cfg.providers.embedding.batch_size == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.batch_size must be greater than zero.".to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("llm_classifier", &cfg.providers.llm_classifier.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	let temperature = cfg.providers.llm_classifier.temperature;

	if !temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.llm_classifier.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=2.0).contains(&temperature) {
		return Err(Error::Validation {
			message: "providers.llm_classifier.temperature must be in the range 0.0-2.0."
				.to_string(),
		});
	}

	validate_actions(&cfg.actions)
}

fn validate_actions(actions: &Actions) -> Result<()> {
	if !actions.confidence_threshold.is_finite() {
		return Err(Error::Validation {
			message: "actions.confidence_threshold must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&actions.confidence_threshold) {
		return Err(Error::Validation {
			message: "actions.confidence_threshold must be in the range 0.0-1.0.".to_string(),
		});
	}
	if actions.known.is_empty() {
		return Err(Error::Validation {
			message: "actions.known must be non-empty.".to_string(),
		});
	}
	if actions.not_recognised.trim().is_empty() {
		return Err(Error::Validation {
			message: "actions.not_recognised must be non-empty.".to_string(),
		});
	}

	let mut seen = HashSet::new();

	for label in &actions.known {
		if label.trim().is_empty() {
			return Err(Error::Validation {
				message: "actions.known labels must be non-empty.".to_string(),
			});
		}
		if label == &actions.not_recognised {
			return Err(Error::Validation {
				message: format!(
					"actions.known must not contain the not_recognised label {label:?}."
				),
			});
		}
		if !seen.insert(label.as_str()) {
			return Err(Error::Validation {
				message: format!("actions.known contains duplicate label {label:?}."),
			});
		}
	}

	if !matches!(actions.few_shot.mode.as_str(), "static" | "dynamic") {
		return Err(Error::Validation {
			message: "actions.few_shot.mode must be one of static or dynamic.".to_string(),
		});
	}

	for example in &actions.few_shot.examples {
		if example.user_message.trim().is_empty() {
			return Err(Error::Validation {
				message: "actions.few_shot.examples user_message must be non-empty.".to_string(),
			});
		}
		if !seen.contains(example.smart_action.as_str())
			&& example.smart_action != actions.not_recognised
		{
			return Err(Error::Validation {
				message: format!(
					"actions.few_shot.examples smart_action {:?} is not a known action.",
					example.smart_action
				),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.storage.index.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.storage.index.api_key = None;
	}
	if cfg.dataset.path.as_deref().map(|path| path.trim().is_empty()).unwrap_or(false) {
		cfg.dataset.path = None;
	}

	cfg.actions.known.iter_mut().for_each(|label| *label = label.trim().to_string());
	cfg.actions.not_recognised = cfg.actions.not_recognised.trim().to_string();
}
