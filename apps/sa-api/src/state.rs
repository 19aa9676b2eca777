use std::sync::Arc;

use sa_service::SmartActionService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<SmartActionService>,
}
impl AppState {
	/// Connects to the configured index and creates it when missing.
	pub async fn new(config: sa_config::Config) -> color_eyre::Result<Self> {
		let service = SmartActionService::connect(config)?;

		if service.index.ensure_index().await? {
			tracing::warn!(index = %service.index.name(), "Index was missing and has been created empty.");
		}

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: SmartActionService) -> Self {
		Self { service: Arc::new(service) }
	}
}
