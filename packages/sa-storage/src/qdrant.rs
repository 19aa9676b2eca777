use std::collections::HashMap;

use qdrant_client::{
	Qdrant,
	client::Payload,
	qdrant::{
		Condition, CountPointsBuilder, CreateCollectionBuilder, Distance, Filter, PointStruct,
		Query, QueryPointsBuilder, ScoredPoint, UpsertPointsBuilder, Value, VectorParamsBuilder,
		value::Kind,
	},
};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

use crate::{
	Error, Result,
	store::{BoxFuture, IndexStats, QueryRequest, RawMatch, VectorRecord, VectorStore},
};

pub const EXAMPLE_ID_KEY: &str = "example_id";
pub const ACTION_KEY: &str = "action";
pub const ORIGINAL_MESSAGE_KEY: &str = "original_message";

/// Qdrant-backed store. Each index is a collection using cosine distance.
pub struct QdrantStore {
	pub client: Qdrant,
}
impl QdrantStore {
	pub fn new(cfg: &sa_config::Index) -> Result<Self> {
		let mut builder = Qdrant::from_url(&cfg.url);

		if let Some(api_key) = cfg.api_key.as_deref() {
			builder = builder.api_key(api_key.to_string());
		}

		Ok(Self { client: builder.build()? })
	}

	async fn create_collection(&self, name: &str, dimension: u32) -> Result<()> {
		if self.client.collection_exists(name).await? {
			return Err(Error::AlreadyExists { name: name.to_string() });
		}

		let builder = CreateCollectionBuilder::new(name.to_string())
			.vectors_config(VectorParamsBuilder::new(u64::from(dimension), Distance::Cosine));

		match self.client.create_collection(builder).await {
			Ok(_) => Ok(()),
			Err(err) if is_already_exists_error(&err) =>
				Err(Error::AlreadyExists { name: name.to_string() }),
			Err(err) => Err(err.into()),
		}
	}

	async fn upsert_points(&self, name: &str, records: &[VectorRecord]) -> Result<()> {
		let points = records.iter().map(record_to_point).collect::<Vec<_>>();
		let upsert = UpsertPointsBuilder::new(name.to_string(), points).wait(true);

		self.client.upsert_points(upsert).await?;

		Ok(())
	}

	async fn query_points(&self, name: &str, request: QueryRequest<'_>) -> Result<Vec<RawMatch>> {
		let mut search = QueryPointsBuilder::new(name.to_string())
			.query(Query::new_nearest(request.vector.to_vec()))
			.limit(request.top_k)
			.with_payload(true);

		if let Some(action) = request.action {
			search = search.filter(Filter::must([Condition::matches(ACTION_KEY, action.to_string())]));
		}

		let response = self.client.query(search).await?;

		Ok(response.result.into_iter().map(point_to_match).collect())
	}

	async fn count_points(&self, name: &str) -> Result<IndexStats> {
		let response = self.client.count(CountPointsBuilder::new(name.to_string()).exact(true)).await?;
		let total_record_count = response.result.map(|result| result.count).unwrap_or(0);

		Ok(IndexStats { total_record_count })
	}
}
impl VectorStore for QdrantStore {
	fn list_indexes(&self) -> BoxFuture<'_, Result<Vec<String>>> {
		Box::pin(async move {
			let response = self.client.list_collections().await?;

			Ok(response.collections.into_iter().map(|c| c.name).collect())
		})
	}

	fn create_index<'a>(&'a self, name: &'a str, dimension: u32) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.create_collection(name, dimension))
	}

	fn delete_index<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<()>> {
		Box::pin(async move {
			self.client.delete_collection(name.to_string()).await?;

			Ok(())
		})
	}

	fn upsert<'a>(
		&'a self,
		name: &'a str,
		records: &'a [VectorRecord],
	) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.upsert_points(name, records))
	}

	fn query<'a>(
		&'a self,
		name: &'a str,
		request: QueryRequest<'a>,
	) -> BoxFuture<'a, Result<Vec<RawMatch>>> {
		Box::pin(self.query_points(name, request))
	}

	fn describe_stats<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Result<IndexStats>> {
		Box::pin(self.count_points(name))
	}
}

/// Qdrant only accepts UUID or integer point ids, so content hashes map onto UUIDv5.
pub fn point_id_for(record_id: &str) -> Uuid {
	Uuid::new_v5(&Uuid::NAMESPACE_OID, record_id.as_bytes())
}

fn record_to_point(record: &VectorRecord) -> PointStruct {
	let mut payload = Payload::new();

	payload.insert(EXAMPLE_ID_KEY, record.id.clone());
	payload.insert(ACTION_KEY, record.metadata.action.clone());

	if let Some(original_message) = record.metadata.original_message.as_ref() {
		payload.insert(ORIGINAL_MESSAGE_KEY, original_message.clone());
	}

	PointStruct::new(point_id_for(&record.id).to_string(), record.values.clone(), payload)
}

fn point_to_match(point: ScoredPoint) -> RawMatch {
	let id = match point.payload.get(EXAMPLE_ID_KEY).and_then(|value| value.kind.as_ref()) {
		Some(Kind::StringValue(id)) => Some(id.clone()),
		_ => None,
	};

	RawMatch { id, score: point.score, metadata: payload_to_json(&point.payload) }
}

fn payload_to_json(payload: &HashMap<String, Value>) -> JsonValue {
	JsonValue::Object(
		payload.iter().map(|(key, value)| (key.clone(), value_to_json(value))).collect::<Map<_, _>>(),
	)
}

fn value_to_json(value: &Value) -> JsonValue {
	match &value.kind {
		None | Some(Kind::NullValue(_)) => JsonValue::Null,
		Some(Kind::BoolValue(flag)) => JsonValue::Bool(*flag),
		Some(Kind::IntegerValue(number)) => JsonValue::from(*number),
		Some(Kind::DoubleValue(number)) => JsonValue::from(*number),
		Some(Kind::StringValue(text)) => JsonValue::String(text.clone()),
		Some(Kind::ListValue(list)) => JsonValue::Array(list.values.iter().map(value_to_json).collect()),
		Some(Kind::StructValue(fields)) => JsonValue::Object(
			fields.fields.iter().map(|(key, value)| (key.clone(), value_to_json(value))).collect(),
		),
	}
}

fn is_already_exists_error(err: &qdrant_client::QdrantError) -> bool {
	err.to_string().to_lowercase().contains("already exists")
}
