use std::sync::{Arc, atomic::Ordering};

use sa_domain::SmartAction;
use sa_service::{Error, ResolutionSource};
use sa_storage::VectorStore;
use sa_testkit::InMemoryStore;

use super::{
	FixedScoreStore, PINECONE_QUESTION, SpyClassifier, TableEmbedding, record, seeded_store, service,
	test_config,
};

#[tokio::test]
async fn exact_match_skips_the_classifier() {
	let cfg = test_config();
	let text = "Identified a bug in the login module. About to open a pull request.";
	let store = seeded_store(&cfg, &[record(text, "create-pull-request", [1.0, 0.0, 0.0])]).await;
	let classifier = SpyClassifier::classification(text, "assign-task");
	let calls = classifier.calls.clone();
	let service = service(cfg, store, TableEmbedding::new([(text, [1.0, 0.0, 0.0])]), classifier);
	let resolution = service.resolve_detailed(text).await.expect("Resolve failed.");

	assert_eq!(resolution.action, SmartAction::new("create-pull-request"));
	assert!(matches!(resolution.source, ResolutionSource::IndexMatch { score } if score > 0.9));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn score_at_threshold_goes_to_the_classifier() {
	let cfg = test_config();
	let store = Arc::new(FixedScoreStore {
		name: cfg.storage.index.name.clone(),
		score: 0.9,
		action: "assign-task".to_string(),
	});
	let classifier = SpyClassifier::classification("Where are the docs?", "lookup-documentation");
	let calls = classifier.calls.clone();
	let service = service(cfg, store, TableEmbedding::new([]), classifier);
	let resolution = service.resolve_detailed("Where are the docs?").await.expect("Resolve failed.");

	assert_eq!(resolution.action, SmartAction::new("lookup-documentation"));
	assert_eq!(resolution.source, ResolutionSource::Classifier);
	assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn score_above_threshold_short_circuits() {
	let cfg = test_config();
	let store = Arc::new(FixedScoreStore {
		name: cfg.storage.index.name.clone(),
		score: 0.91,
		action: "assign-task".to_string(),
	});
	let classifier = SpyClassifier::failing();
	let calls = classifier.calls.clone();
	let service = service(cfg, store, TableEmbedding::new([]), classifier);
	let action = service.resolve("Can you take the auth bug?").await.expect("Resolve failed.");

	assert_eq!(action, SmartAction::new("assign-task"));
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rounded_cosine_above_one_still_short_circuits() {
	let cfg = test_config();
	let store = Arc::new(FixedScoreStore {
		name: cfg.storage.index.name.clone(),
		score: 1.000_000_1,
		action: "create-pull-request".to_string(),
	});
	let classifier = SpyClassifier::failing();
	let calls = classifier.calls.clone();
	let service = service(cfg, store, TableEmbedding::new([]), classifier);
	let resolution =
		service.resolve_detailed("Opening a pull request now.").await.expect("Resolve failed.");

	assert_eq!(resolution.action, SmartAction::new("create-pull-request"));
	assert_eq!(resolution.source, ResolutionSource::IndexMatch { score: 1.0 });
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn confident_match_with_unconfigured_label_is_still_returned() {
	let cfg = test_config();
	let store = Arc::new(FixedScoreStore {
		name: cfg.storage.index.name.clone(),
		score: 0.99,
		action: "archive-thread".to_string(),
	});
	let service = service(cfg, store, TableEmbedding::new([]), SpyClassifier::failing());
	let action = service.resolve("Archive this please.").await.expect("Resolve failed.");

	assert_eq!(action, SmartAction::new("archive-thread"));
}

#[tokio::test]
async fn pinecone_question_is_classified_as_documentation_lookup() {
	let cfg = test_config();
	let store = seeded_store(&cfg, &[]).await;
	let classifier = SpyClassifier::classification(PINECONE_QUESTION, "lookup-documentation");
	let prompts = classifier.prompts.clone();
	let service = service(cfg, store, TableEmbedding::new([]), classifier);
	let resolution = service.resolve_detailed(PINECONE_QUESTION).await.expect("Resolve failed.");

	assert_eq!(resolution.action, SmartAction::new("lookup-documentation"));
	assert_eq!(resolution.source, ResolutionSource::Classifier);

	let prompts = prompts.lock().expect("Prompt log poisoned.");
	let (system, human) = &prompts[0];

	assert!(system.contains("- lookup-documentation"));
	assert!(system.contains("- action-not-recognised ("));
	assert_eq!(human, &format!("User Message: {PINECONE_QUESTION}\nSuggestion: "));
}

#[tokio::test]
async fn fenced_classifier_reply_is_accepted() {
	let cfg = test_config();
	let store = seeded_store(&cfg, &[]).await;
	let reply = "```json\n{\"userMessage\": \"hi\", \"smartAction\": \"action-not-recognised\"}\n```";
	let service = service(cfg, store, TableEmbedding::new([]), SpyClassifier::replying(reply));
	let action = service.resolve("hi").await.expect("Resolve failed.");

	assert_eq!(action, SmartAction::new("action-not-recognised"));
}

#[tokio::test]
async fn unknown_classifier_label_fails_validation() {
	let cfg = test_config();
	let store = seeded_store(&cfg, &[]).await;
	let classifier = SpyClassifier::classification("Deploy it.", "deploy-to-production");
	let service = service(cfg, store, TableEmbedding::new([]), classifier);
	let err = service.resolve("Deploy it.").await.expect_err("Expected a validation failure.");

	assert!(matches!(
		err,
		Error::Validation(sa_domain::ValidationError::UnknownAction { ref label })
			if label == "deploy-to-production"
	));
}

#[tokio::test]
async fn malformed_classifier_reply_fails_validation() {
	let cfg = test_config();
	let store = seeded_store(&cfg, &[]).await;
	let classifier = SpyClassifier::replying("Sure! I think you want lookup-documentation.");
	let service = service(cfg, store, TableEmbedding::new([]), classifier);
	let err =
		service.resolve("Where are the docs?").await.expect_err("Expected a validation failure.");

	assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn classifier_outage_surfaces_as_classifier_error() {
	let cfg = test_config();
	let store = seeded_store(&cfg, &[]).await;
	let service = service(cfg, store, TableEmbedding::new([]), SpyClassifier::failing());
	let err =
		service.resolve("Where are the docs?").await.expect_err("Expected a classifier error.");

	assert!(matches!(err, Error::Classifier { .. }));
}

#[tokio::test]
async fn blank_message_is_rejected() {
	let cfg = test_config();
	let store = Arc::new(InMemoryStore::new());
	let embedding = TableEmbedding::new([]);
	let embed_calls = embedding.calls.clone();
	let service = service(cfg, store, embedding, SpyClassifier::failing());
	let err = service.resolve("   ").await.expect_err("Expected an invalid request.");

	assert!(matches!(err, Error::InvalidRequest { .. }));
	assert_eq!(embed_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_index_surfaces_as_index_error() {
	let cfg = test_config();
	let store = Arc::new(InMemoryStore::new());
	let service = service(cfg, store, TableEmbedding::new([]), SpyClassifier::failing());
	let err = service.resolve("Where are the docs?").await.expect_err("Expected an index error.");

	assert!(matches!(err, Error::Index(sa_storage::Error::NotFound { .. })));
}

#[tokio::test]
async fn static_few_shot_uses_configured_examples() {
	let cfg = test_config();
	let store = seeded_store(&cfg, &[]).await;
	let classifier = SpyClassifier::classification("hi", "assign-task");
	let prompts = classifier.prompts.clone();
	let service = service(cfg, store, TableEmbedding::new([]), classifier);

	service.resolve("hi").await.expect("Resolve failed.");

	let prompts = prompts.lock().expect("Prompt log poisoned.");

	assert!(prompts[0].0.contains(r#""smartAction":"assign-task""#));
	assert!(
		prompts[0].0.contains("Feel free to assign @teammate with fixing the authentication bug.")
	);
}

#[tokio::test]
async fn dynamic_few_shot_uses_retrieved_examples() {
	let mut cfg = test_config();

	cfg.actions.few_shot.mode = "dynamic".to_string();

	let stored = "Can someone take over the flaky CI ticket?";
	let store = seeded_store(&cfg, &[record(stored, "assign-task", [0.6, 0.8, 0.0])]).await;
	let classifier = SpyClassifier::classification("hi", "assign-task");
	let prompts = classifier.prompts.clone();
	let service = service(cfg, store, TableEmbedding::new([("hi", [0.0, 1.0, 0.0])]), classifier);

	service.resolve("hi").await.expect("Resolve failed.");

	let prompts = prompts.lock().expect("Prompt log poisoned.");
	let system = &prompts[0].0;

	assert!(system.contains(stored));
	assert!(!system.contains("Feel free to assign @teammate with fixing the authentication bug."));
}

#[tokio::test]
async fn dynamic_few_shot_falls_back_when_index_is_empty() {
	let mut cfg = test_config();

	cfg.actions.few_shot.mode = "dynamic".to_string();

	let store = seeded_store(&cfg, &[]).await;
	let classifier = SpyClassifier::classification("hi", "assign-task");
	let prompts = classifier.prompts.clone();
	let service = service(cfg, store, TableEmbedding::new([]), classifier);

	service.resolve("hi").await.expect("Resolve failed.");

	let prompts = prompts.lock().expect("Prompt log poisoned.");

	assert!(
		prompts[0].0.contains("Feel free to assign @teammate with fixing the authentication bug.")
	);
}

#[tokio::test]
async fn concurrent_resolutions_are_independent() {
	let cfg = test_config();
	let pr = "Opening a pull request for the fix.";
	let docs = "Where is the onboarding guide?";
	let store = seeded_store(
		&cfg,
		&[
			record(pr, "create-pull-request", [1.0, 0.0, 0.0]),
			record(docs, "lookup-documentation", [0.0, 1.0, 0.0]),
		],
	)
	.await;
	let embedding = TableEmbedding::new([(pr, [1.0, 0.0, 0.0]), (docs, [0.0, 1.0, 0.0])]);
	let service =
		service(cfg, store.clone() as Arc<dyn VectorStore>, embedding, SpyClassifier::failing());
	let (first, second) = tokio::join!(service.resolve(pr), service.resolve(docs));

	assert_eq!(first.expect("Resolve failed."), SmartAction::new("create-pull-request"));
	assert_eq!(second.expect("Resolve failed."), SmartAction::new("lookup-documentation"));
	assert_eq!(store.query_calls(), 2);
}

#[test]
fn connect_rejects_invalid_config() {
	let mut cfg = test_config();

	cfg.storage.polling.max_attempts = 0;

	let err = sa_service::SmartActionService::connect(cfg).err().expect("Expected connect to fail.");

	assert!(matches!(err, Error::Config(sa_config::Error::Validation { .. })));
}
