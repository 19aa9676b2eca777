use std::{
	collections::BTreeMap,
	sync::{
		Mutex,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
};

use serde_json::{Map, Value};

use sa_storage::{
	BoxFuture, Error as StorageError, IndexStats, QueryRequest, RawMatch, Result as StorageResult,
	VectorRecord, VectorStore,
};

/// Brute-force cosine store. Scores are raw cosine similarities and may be negative.
///
/// With a consistency lag of `n`, the first `n` stats reads after each write still report the
/// count from before that write.
#[derive(Default)]
pub struct InMemoryStore {
	indexes: Mutex<BTreeMap<String, MemoryIndex>>,
	consistency_lag: u32,
	fail_upserts: AtomicBool,
	ignore_deletes: AtomicBool,
	upsert_calls: AtomicUsize,
	query_calls: AtomicUsize,
}
impl InMemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_consistency_lag(mut self, reads: u32) -> Self {
		self.consistency_lag = reads;

		self
	}

	pub fn set_fail_upserts(&self, fail: bool) {
		self.fail_upserts.store(fail, Ordering::SeqCst);
	}

	/// Accepts delete requests without ever removing the index.
	pub fn set_ignore_deletes(&self, ignore: bool) {
		self.ignore_deletes.store(ignore, Ordering::SeqCst);
	}

	pub fn upsert_calls(&self) -> usize {
		self.upsert_calls.load(Ordering::SeqCst)
	}

	pub fn query_calls(&self) -> usize {
		self.query_calls.load(Ordering::SeqCst)
	}

	/// The true number of records, ignoring any consistency lag.
	pub fn record_count(&self, name: &str) -> Option<usize> {
		self.lock().get(name).map(|index| index.records.len())
	}

	pub fn records(&self, name: &str) -> Vec<VectorRecord> {
		self.lock().get(name).map(|index| index.records.values().cloned().collect()).unwrap_or_default()
	}

	fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, MemoryIndex>> {
		self.indexes.lock().unwrap_or_else(|err| err.into_inner())
	}

	fn create(&self, name: &str, dimension: u32) -> StorageResult<()> {
		let mut indexes = self.lock();

		if indexes.contains_key(name) {
			return Err(StorageError::AlreadyExists { name: name.to_string() });
		}

		indexes.insert(name.to_string(), MemoryIndex::new(dimension));

		Ok(())
	}

	fn delete(&self, name: &str) -> StorageResult<()> {
		if self.ignore_deletes.load(Ordering::SeqCst) {
			return Ok(());
		}

		self.lock().remove(name);

		Ok(())
	}

	fn write(&self, name: &str, records: &[VectorRecord]) -> StorageResult<()> {
		self.upsert_calls.fetch_add(1, Ordering::SeqCst);

		if self.fail_upserts.load(Ordering::SeqCst) {
			return Err(StorageError::Store("Upserts are disabled for this store.".to_string()));
		}

		let mut indexes = self.lock();
		let index = indexes.get_mut(name).ok_or_else(|| not_found(name))?;

		for record in records {
			if record.values.len() != index.dimension as usize {
				return Err(StorageError::InvalidArgument(format!(
					"Record {} has {} dimensions; expected {}.",
					record.id,
					record.values.len(),
					index.dimension
				)));
			}
		}

		index.stale_count = index.records.len() as u64;
		index.stale_reads = self.consistency_lag;

		for record in records {
			index.records.insert(record.id.clone(), record.clone());
		}

		Ok(())
	}

	fn search(&self, name: &str, request: QueryRequest<'_>) -> StorageResult<Vec<RawMatch>> {
		self.query_calls.fetch_add(1, Ordering::SeqCst);

		let indexes = self.lock();
		let index = indexes.get(name).ok_or_else(|| not_found(name))?;
		let mut hits = index
			.records
			.values()
			.filter(|record| request.action.is_none_or(|action| record.metadata.action == action))
			.map(|record| (cosine(request.vector, &record.values), record))
			.collect::<Vec<_>>();

		hits.sort_by(|a, b| b.0.total_cmp(&a.0));

		Ok(hits
			.into_iter()
			.take(request.top_k as usize)
			.map(|(score, record)| RawMatch {
				id: Some(record.id.clone()),
				score,
				metadata: metadata_json(record),
			})
			.collect())
	}

	fn stats(&self, name: &str) -> StorageResult<IndexStats> {
		let mut indexes = self.lock();
		let index = indexes.get_mut(name).ok_or_else(|| not_found(name))?;

		if index.stale_reads > 0 {
			index.stale_reads -= 1;

			return Ok(IndexStats { total_record_count: index.stale_count });
		}

		Ok(IndexStats { total_record_count: index.records.len() as u64 })
	}
}
impl VectorStore for InMemoryStore {
	fn list_indexes(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
		let names = self.lock().keys().cloned().collect();

		Box::pin(async move { Ok(names) })
	}

	fn create_index<'a>(&'a self, name: &'a str, dimension: u32) -> BoxFuture<'a, StorageResult<()>> {
		Box::pin(async move { self.create(name, dimension) })
	}

	fn delete_index<'a>(&'a self, name: &'a str) -> BoxFuture<'a, StorageResult<()>> {
		Box::pin(async move { self.delete(name) })
	}

	fn upsert<'a>(
		&'a self,
		name: &'a str,
		records: &'a [VectorRecord],
	) -> BoxFuture<'a, StorageResult<()>> {
		Box::pin(async move { self.write(name, records) })
	}

	fn query<'a>(
		&'a self,
		name: &'a str,
		request: QueryRequest<'a>,
	) -> BoxFuture<'a, StorageResult<Vec<RawMatch>>> {
		Box::pin(async move { self.search(name, request) })
	}

	fn describe_stats<'a>(&'a self, name: &'a str) -> BoxFuture<'a, StorageResult<IndexStats>> {
		Box::pin(async move { self.stats(name) })
	}
}

struct MemoryIndex {
	dimension: u32,
	records: BTreeMap<String, VectorRecord>,
	stale_count: u64,
	stale_reads: u32,
}
impl MemoryIndex {
	fn new(dimension: u32) -> Self {
		Self { dimension, records: BTreeMap::new(), stale_count: 0, stale_reads: 0 }
	}
}

fn not_found(name: &str) -> StorageError {
	StorageError::NotFound { name: name.to_string() }
}

fn metadata_json(record: &VectorRecord) -> Value {
	let mut metadata = Map::new();

	metadata.insert("example_id".to_string(), Value::from(record.id.as_str()));
	metadata.insert("action".to_string(), Value::from(record.metadata.action.as_str()));

	if let Some(original_message) = record.metadata.original_message.as_deref() {
		metadata.insert("original_message".to_string(), Value::from(original_message));
	}

	Value::Object(metadata)
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
	if a.len() != b.len() {
		return 0.0;
	}

	let dot = a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
	let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
	let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

	if norm_a == 0.0 || norm_b == 0.0 {
		return 0.0;
	}

	dot / (norm_a * norm_b)
}
