#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Index {name:?} already exists.")]
	AlreadyExists { name: String },
	#[error("Index {name:?} not found.")]
	NotFound { name: String },
	#[error("Timed out waiting for {operation} after {attempts} attempts.")]
	Timeout { operation: &'static str, attempts: u32 },
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
	#[error("Vector store error: {0}")]
	Store(String),
	#[error(transparent)]
	Qdrant(#[from] Box<qdrant_client::QdrantError>),
}
impl From<qdrant_client::QdrantError> for Error {
	fn from(err: qdrant_client::QdrantError) -> Self {
		Self::Qdrant(Box::new(err))
	}
}
