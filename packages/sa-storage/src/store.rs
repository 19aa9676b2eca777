//! The nearest-neighbor store as seen by the rest of the workspace.

use std::{future::Future, pin::Pin};

use serde_json::Value;

use sa_domain::LabeledExample;

use crate::Result;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Clone, Debug, PartialEq)]
pub struct VectorRecord {
	pub id: String,
	pub values: Vec<f32>,
	pub metadata: RecordMetadata,
}
impl From<&LabeledExample> for VectorRecord {
	fn from(example: &LabeledExample) -> Self {
		Self {
			id: example.id.clone(),
			values: example.vector.clone(),
			metadata: RecordMetadata {
				action: example.action.to_string(),
				original_message: Some(example.original_text.clone()),
			},
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordMetadata {
	pub action: String,
	pub original_message: Option<String>,
}

/// A query hit exactly as the store reported it. Nothing in it is trusted yet.
#[derive(Clone, Debug)]
pub struct RawMatch {
	pub id: Option<String>,
	pub score: f32,
	pub metadata: Value,
}
impl RawMatch {
	pub fn to_json(&self) -> Value {
		serde_json::json!({ "score": self.score, "metadata": self.metadata })
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IndexStats {
	pub total_record_count: u64,
}

#[derive(Clone, Copy, Debug)]
pub struct QueryRequest<'a> {
	pub vector: &'a [f32],
	pub top_k: u64,
	/// Restricts hits to records whose `action` metadata equals this label.
	pub action: Option<&'a str>,
}

pub trait VectorStore
where
	Self: Send + Sync,
{
	fn list_indexes(&self) -> BoxFuture<'_, Result<Vec<String>>>;

	/// Fails with [`crate::Error::AlreadyExists`] when `name` is already present.
	fn create_index<'a>(&'a self, name: &'a str, dimension: u32) -> BoxFuture<'a, Result<()>>;

	fn delete_index<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<()>>;

	fn upsert<'a>(&'a self, name: &'a str, records: &'a [VectorRecord])
	-> BoxFuture<'a, Result<()>>;

	fn query<'a>(
		&'a self,
		name: &'a str,
		request: QueryRequest<'a>,
	) -> BoxFuture<'a, Result<Vec<RawMatch>>>;

	/// May lag behind recent writes.
	fn describe_stats<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<IndexStats>>;
}
