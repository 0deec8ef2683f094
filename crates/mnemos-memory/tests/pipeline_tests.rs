// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end pipeline tests: enqueue, index, retrieve.

use mnemos_config::model::IndexerConfig;
use mnemos_memory::context::build_context_block_in;
use mnemos_storage::EventType;
use mnemos_test_utils::TestHarness;

#[tokio::test]
async fn ranks_toy_vectors_by_cosine() {
    let harness = TestHarness::builder()
        .with_dimensions(2)
        .with_vector("cats purr", vec![1.0, 0.0])
        .with_vector("dogs bark", vec![0.0, 1.0])
        .with_vector("feline", vec![1.0, 0.0])
        .build()
        .await
        .unwrap();

    let cats = harness.write_file("cats.txt", "cats purr").unwrap();
    let dogs = harness.write_file("dogs.txt", "dogs bark").unwrap();
    harness.enqueue(EventType::Created, &cats).await.unwrap();
    harness.enqueue(EventType::Created, &dogs).await.unwrap();
    assert_eq!(harness.drain().await.unwrap().indexed, 2);

    let hits = harness.retriever.semantic_search("feline", 2).await;
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].1, "cats purr");
    assert!((hits[0].0 - 1.0).abs() < 1e-6);
    assert_eq!(hits[1].1, "dogs bark");
    assert!(hits[1].0.abs() < 1e-6);
}

#[tokio::test]
async fn top_k_caps_results() {
    let harness = TestHarness::builder().build().await.unwrap();
    for i in 0..4 {
        let path = harness.write_file(&format!("f{i}.txt"), &format!("file {i}")).unwrap();
        harness.enqueue(EventType::Created, &path).await.unwrap();
    }
    harness.drain().await.unwrap();

    assert_eq!(harness.retriever.semantic_search("file", 3).await.len(), 3);
    assert_eq!(harness.retriever.semantic_search("file", 10).await.len(), 4);
    assert!(harness.retriever.semantic_search("file", 0).await.is_empty());
}

#[tokio::test]
async fn modified_file_overwrites_its_record() {
    let harness = TestHarness::builder().build().await.unwrap();
    let path = harness.write_file("notes.md", "first draft").unwrap();
    harness.enqueue(EventType::Created, &path).await.unwrap();
    harness.drain().await.unwrap();

    harness.write_file("notes.md", "second draft").unwrap();
    harness.enqueue(EventType::Modified, &path).await.unwrap();
    harness.drain().await.unwrap();

    assert_eq!(harness.store.count().await.unwrap(), 1);
    let record = harness.store.get_by_path(&path).await.unwrap().unwrap();
    assert_eq!(record.summary, "second draft");
}

#[tokio::test]
async fn deleted_file_keeps_stale_record() {
    let harness = TestHarness::builder().build().await.unwrap();
    let path = harness.write_file("gone.txt", "soon removed").unwrap();
    harness.enqueue(EventType::Created, &path).await.unwrap();
    harness.drain().await.unwrap();

    std::fs::remove_file(&path).unwrap();
    harness.enqueue(EventType::Deleted, &path).await.unwrap();
    let report = harness.drain().await.unwrap();

    assert_eq!(report.skipped_missing, 1);
    assert_eq!(harness.store.count().await.unwrap(), 1);
    assert_eq!(harness.queue.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn provider_failure_falls_back_to_placeholders() {
    let harness = TestHarness::builder().with_dimensions(6).build().await.unwrap();
    harness.embedder.set_failing(true);

    let path = harness.write_file("z.txt", "zebra").unwrap();
    harness.enqueue(EventType::Created, &path).await.unwrap();
    let report = harness.drain().await.unwrap();
    assert_eq!(report.indexed, 1);

    let record = harness.store.get_by_path(&path).await.unwrap().unwrap();
    assert_eq!(record.embedding.len(), 6);

    let hits = harness.retriever.semantic_search("zebra", 1).await;
    assert!((hits[0].0 - 1.0).abs() < 1e-5);
}

#[tokio::test]
async fn oversized_provider_vectors_are_truncated() {
    let harness = TestHarness::builder()
        .with_dimensions(2)
        .with_vector("wide", vec![0.5, 0.5, 9.0])
        .build()
        .await
        .unwrap();
    let path = harness.write_file("w.txt", "wide").unwrap();
    harness.enqueue(EventType::Created, &path).await.unwrap();
    harness.drain().await.unwrap();

    let record = harness.store.get_by_path(&path).await.unwrap().unwrap();
    assert_eq!(record.embedding, vec![0.5, 0.5]);
}

#[tokio::test]
async fn long_documents_embed_every_chunk() {
    let config = IndexerConfig {
        chunk_size: 10,
        chunk_overlap: 2,
        summary_chars: 5,
        ..IndexerConfig::default()
    };
    let harness = TestHarness::builder()
        .with_indexer_config(config)
        .build()
        .await
        .unwrap();
    let path = harness.write_file("long.txt", &"abcdefghij".repeat(4)).unwrap();
    harness.enqueue(EventType::Created, &path).await.unwrap();
    harness.drain().await.unwrap();

    let record = harness.store.get_by_path(&path).await.unwrap().unwrap();
    assert_eq!(record.summary, "abcde...");
    assert_eq!(harness.embedder.calls(), 1);
}

#[tokio::test]
async fn context_block_combines_hits_and_activity() {
    let harness = TestHarness::builder().build().await.unwrap();
    let path = harness.write_file("ctx.txt", "context material").unwrap();
    harness.enqueue(EventType::Created, &path).await.unwrap();
    harness.drain().await.unwrap();

    let hits = harness
        .retriever
        .search_records("context material", 1)
        .await
        .unwrap();
    let recent = harness.queue.recent(5).await.unwrap();
    let block = build_context_block_in(&hits, &recent, &chrono::Utc);

    assert!(block.starts_with("## Relevant Documents"));
    assert!(block.contains("## Recent File Activity"));
    assert!(block.contains(&format!("CREATED: {path}")));
}
