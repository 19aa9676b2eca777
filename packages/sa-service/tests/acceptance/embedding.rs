use std::sync::{Arc, atomic::Ordering};

use sa_service::{EmbeddingClient, Error};

use super::{TableEmbedding, test_config};

fn texts(items: &[&str]) -> Vec<String> {
	items.iter().map(|item| item.to_string()).collect()
}

#[tokio::test]
async fn batches_preserve_input_order() {
	let cfg = test_config();
	let embedding = TableEmbedding::new([
		("a", [1.0, 0.0, 0.0]),
		("b", [0.0, 1.0, 0.0]),
		("c", [0.0, 0.0, 1.0]),
		("d", [1.0, 1.0, 0.0]),
		("e", [0.0, 1.0, 1.0]),
	]);
	let calls = embedding.calls.clone();
	let client = EmbeddingClient::new(cfg.providers.embedding.clone(), Arc::new(embedding));
	let vectors = client.embed(&texts(&["a", "b", "c", "d", "e"])).await.expect("Embed failed.");

	assert_eq!(calls.load(Ordering::SeqCst), 3);
	assert_eq!(vectors.len(), 5);
	assert_eq!(vectors[0], vec![1.0, 0.0, 0.0]);
	assert_eq!(vectors[3], vec![1.0, 1.0, 0.0]);
	assert_eq!(vectors[4], vec![0.0, 1.0, 1.0]);
}

#[tokio::test]
async fn empty_input_makes_no_call() {
	let cfg = test_config();
	let embedding = TableEmbedding::new([]);
	let calls = embedding.calls.clone();
	let client = EmbeddingClient::new(cfg.providers.embedding.clone(), Arc::new(embedding));

	assert!(client.embed(&[]).await.expect("Embed failed.").is_empty());
	assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn wrong_dimension_is_an_embedding_error() {
	let cfg = test_config();
	let mut embedding = TableEmbedding::new([]);

	embedding.fallback = vec![1.0, 0.0];

	let client = EmbeddingClient::new(cfg.providers.embedding.clone(), Arc::new(embedding));
	let err = client.embed_one("hello").await.expect_err("Expected a dimension mismatch.");

	assert!(matches!(err, Error::Embedding { .. }));
}
