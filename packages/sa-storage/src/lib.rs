pub mod index;
pub mod qdrant;
pub mod store;

mod error;

pub use error::Error;
pub use index::{MatchResult, VectorIndexClient};
pub use store::{BoxFuture, IndexStats, QueryRequest, RawMatch, RecordMetadata, VectorRecord, VectorStore};

pub type Result<T, E = Error> = std::result::Result<T, E>;
