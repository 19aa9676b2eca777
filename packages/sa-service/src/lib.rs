pub mod confirm;
pub mod embedding;
pub mod populate;
pub mod resolve;

mod error;

pub use confirm::ConfirmReport;
pub use embedding::EmbeddingClient;
pub use error::{Error, Result};
pub use populate::{PopulateReport, load_dataset};
pub use resolve::{Resolution, ResolutionSource};
pub use sa_storage::BoxFuture;

use std::sync::Arc;

use sa_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use sa_domain::{ActionSet, FewShotExample, PromptBuilder};
use sa_providers::{classifier, embedding as embedding_api};
use sa_storage::{VectorIndexClient, VectorStore, qdrant::QdrantStore};

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, sa_providers::Result<Vec<Vec<f32>>>>;
}

pub trait ClassifierProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		system_prompt: &'a str,
		human_prompt: &'a str,
		temperature: f32,
	) -> BoxFuture<'a, sa_providers::Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub classifier: Arc<dyn ClassifierProvider>,
}
impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		classifier: Arc<dyn ClassifierProvider>,
	) -> Self {
		Self { embedding, classifier }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), classifier: provider }
	}
}

/// Resolves chat messages to smart actions and maintains the labeled-example index.
///
/// Holds no mutable state; concurrent calls are independent.
pub struct SmartActionService {
	pub cfg: Config,
	pub index: VectorIndexClient,
	pub providers: Providers,
	embedder: EmbeddingClient,
	prompt: PromptBuilder,
	static_examples: Vec<FewShotExample>,
}
impl SmartActionService {
	pub fn new(cfg: Config, store: Arc<dyn VectorStore>) -> Self {
		Self::with_providers(cfg, store, Providers::default())
	}

	pub fn with_providers(cfg: Config, store: Arc<dyn VectorStore>, providers: Providers) -> Self {
		let index = VectorIndexClient::new(store, &cfg.storage);
		let embedder =
			EmbeddingClient::new(cfg.providers.embedding.clone(), providers.embedding.clone());
		let prompt = PromptBuilder::new(ActionSet::from_config(&cfg.actions));
		let static_examples = FewShotExample::from_config(&cfg.actions.few_shot.examples);

		Self { cfg, index, providers, embedder, prompt, static_examples }
	}

	/// Validates `cfg` and builds the service against the Qdrant instance it names.
	pub fn connect(cfg: Config) -> Result<Self> {
		sa_config::validate(&cfg)?;

		let store = QdrantStore::new(&cfg.storage.index)?;

		Ok(Self::new(cfg, Arc::new(store)))
	}

	pub fn actions(&self) -> &ActionSet {
		self.prompt.actions()
	}

	pub fn embedder(&self) -> &EmbeddingClient {
		&self.embedder
	}
}

struct DefaultProviders;
impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, sa_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding_api::embed(cfg, texts))
	}
}
impl ClassifierProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		system_prompt: &'a str,
		human_prompt: &'a str,
		temperature: f32,
	) -> BoxFuture<'a, sa_providers::Result<String>> {
		Box::pin(classifier::complete(cfg, system_prompt, human_prompt, temperature))
	}
}
