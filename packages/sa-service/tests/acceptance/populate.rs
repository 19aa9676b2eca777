use std::{
	env, fs,
	path::PathBuf,
	sync::{
		Arc,
		atomic::{AtomicU64, Ordering},
	},
	time::{SystemTime, UNIX_EPOCH},
};

use sa_domain::{Dataset, SmartAction};
use sa_service::{Error, ResolutionSource, load_dataset};
use sa_storage::VectorStore;
use sa_testkit::InMemoryStore;

use super::{SpyClassifier, TableEmbedding, service, test_config};

const PR: &str = "Fixed the login bug. Opening a pull request now.";
const DOCS: &str = "Is there a runbook for rotating the API keys?";
const ASSIGN: &str = "Could you hand the flaky test ticket to @sam?";

fn write_temp_dataset(payload: &str) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let mut path = env::temp_dir();

	path.push(format!("sa_dataset_test_{nanos}_{}_{ordinal}.json", std::process::id()));

	fs::write(&path, payload).expect("Failed to write test dataset.");

	path
}

fn embedding() -> TableEmbedding {
	TableEmbedding::new([(PR, [1.0, 0.0, 0.0]), (DOCS, [0.0, 1.0, 0.0]), (ASSIGN, [0.0, 0.0, 1.0])])
}

#[tokio::test]
async fn populate_then_resolve_from_index() {
	let cfg = test_config();
	let store = Arc::new(InMemoryStore::new().with_consistency_lag(2));
	let dataset = Dataset::from_entries([
		("assign-task", vec![ASSIGN]),
		("create-pull-request", vec![PR]),
		("lookup-documentation", vec![DOCS]),
	])
	.expect("Dataset rejected.");
	let classifier = SpyClassifier::failing();
	let calls = classifier.calls.clone();
	let service = service(cfg, store.clone() as Arc<dyn VectorStore>, embedding(), classifier);
	let report = service.populate(&dataset).await.expect("Populate failed.");

	assert_eq!(report.examples, 3);
	assert_eq!(report.upserted, 3);

	let resolution = service.resolve_detailed(DOCS).await.expect("Resolve failed.");

	assert_eq!(resolution.action, SmartAction::new("lookup-documentation"));
	assert!(matches!(resolution.source, ResolutionSource::IndexMatch { .. }));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn populate_replaces_previous_contents() {
	let cfg = test_config();
	let store = Arc::new(InMemoryStore::new());
	let service =
		service(cfg, store.clone() as Arc<dyn VectorStore>, embedding(), SpyClassifier::failing());
	let first =
		Dataset::from_entries([("create-pull-request", vec![PR, DOCS])]).expect("Dataset rejected.");
	let second = Dataset::from_entries([("assign-task", vec![ASSIGN])]).expect("Dataset rejected.");

	service.populate(&first).await.expect("Populate failed.");

	let report = service.populate(&second).await.expect("Populate failed.");

	assert_eq!(report.upserted, 1);
	assert_eq!(store.record_count(service.index.name()), Some(1));
}

#[tokio::test]
async fn duplicate_message_keeps_the_later_action() {
	let cfg = test_config();
	let store = Arc::new(InMemoryStore::new());
	let service =
		service(cfg, store.clone() as Arc<dyn VectorStore>, embedding(), SpyClassifier::failing());
	let dataset = Dataset::from_entries([
		("assign-task", vec![ASSIGN, PR]),
		("create-pull-request", vec![PR]),
	])
	.expect("Dataset rejected.");
	let report = service.populate(&dataset).await.expect("Populate failed.");

	assert_eq!(report.examples, 2);
	assert_eq!(report.upserted, 2);

	let pr_record = store
		.records(service.index.name())
		.into_iter()
		.find(|record| record.metadata.original_message.as_deref() == Some(PR))
		.expect("Missing PR record.");

	assert_eq!(pr_record.metadata.action, "create-pull-request");
}

#[tokio::test]
async fn failed_writes_report_zero_upserted() {
	let cfg = test_config();
	let store = Arc::new(InMemoryStore::new());

	store.set_fail_upserts(true);

	let service = service(cfg, store as Arc<dyn VectorStore>, embedding(), SpyClassifier::failing());
	let dataset = Dataset::from_entries([("assign-task", vec![ASSIGN])]).expect("Dataset rejected.");
	let report = service.populate(&dataset).await.expect("Populate failed.");

	assert_eq!(report.examples, 1);
	assert_eq!(report.upserted, 0);
}

#[test]
fn loads_dataset_file() {
	let payload = serde_json::json!({ "assign-task": [ASSIGN], "create-pull-request": [PR] });
	let path = write_temp_dataset(&payload.to_string());
	let dataset = load_dataset(&path).expect("Dataset rejected.");

	assert_eq!(dataset.len(), 2);

	let _ = fs::remove_file(path);
}

#[test]
fn blank_dataset_message_is_an_invalid_request() {
	let path = write_temp_dataset(r#"{ "assign-task": ["   "] }"#);
	let err = load_dataset(&path).expect_err("Expected a blank message to be rejected.");

	assert!(matches!(err, Error::InvalidRequest { .. }));

	let _ = fs::remove_file(path);
}

#[test]
fn malformed_dataset_is_a_dataset_error() {
	let path = write_temp_dataset(r#"["not", "an", "object"]"#);
	let err = load_dataset(&path).expect_err("Expected malformed JSON to be rejected.");

	assert!(matches!(err, Error::Dataset { .. }));

	let _ = fs::remove_file(path);
}

#[test]
fn missing_dataset_file_is_a_dataset_error() {
	let err = load_dataset(&env::temp_dir().join("sa_dataset_missing.json"))
		.expect_err("Expected a missing file to be rejected.");

	assert!(matches!(err, Error::Dataset { .. }));
}
