use std::sync::Arc;

use sa_domain::SmartAction;
use sa_service::Error;
use sa_storage::VectorStore;

use super::{SpyClassifier, TableEmbedding, seeded_store, service, test_config};

const TEXT: &str = "Can you take over the billing migration?";

#[tokio::test]
async fn confirmed_message_short_circuits_next_time() {
	let cfg = test_config();
	let store = seeded_store(&cfg, &[]).await;
	let service = service(
		cfg,
		store.clone() as Arc<dyn VectorStore>,
		TableEmbedding::new([(TEXT, [0.0, 1.0, 0.0])]),
		SpyClassifier::failing(),
	);
	let report = service.confirm(TEXT, "assign-task").await.expect("Confirm failed.");

	assert_eq!(report.upserted, 1);

	let action = service.resolve(TEXT).await.expect("Resolve failed.");

	assert_eq!(action, SmartAction::new("assign-task"));
}

#[tokio::test]
async fn confirming_the_sentinel_stores_nothing() {
	let cfg = test_config();
	let store = seeded_store(&cfg, &[]).await;
	let service = service(
		cfg,
		store.clone() as Arc<dyn VectorStore>,
		TableEmbedding::new([]),
		SpyClassifier::failing(),
	);
	let report = service.confirm(TEXT, "action-not-recognised").await.expect("Confirm failed.");

	assert_eq!(report.upserted, 0);
	assert_eq!(store.record_count(service.index.name()), Some(0));
}

#[tokio::test]
async fn confirming_an_unknown_label_is_rejected() {
	let cfg = test_config();
	let store = seeded_store(&cfg, &[]).await;
	let service = service(cfg, store, TableEmbedding::new([]), SpyClassifier::failing());
	let err = service.confirm(TEXT, "deploy").await.expect_err("Expected an invalid request.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
}
