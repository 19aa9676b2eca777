pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Config(#[from] sa_config::Error),
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Validation failed: {0}")]
	Validation(#[from] sa_domain::ValidationError),
	#[error("Embedding error: {message}")]
	Embedding { message: String },
	#[error("Index error: {0}")]
	Index(#[from] sa_storage::Error),
	#[error("Classifier error: {message}")]
	Classifier { message: String },
	#[error("Dataset error: {message}")]
	Dataset { message: String },
}
impl Error {
	pub(crate) fn embedding(message: impl Into<String>) -> Self {
		Self::Embedding { message: message.into() }
	}
}
