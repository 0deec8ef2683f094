// SPDX-FileCopyrightText: 2026 Mnemos Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the durable event queue.

use std::sync::mpsc;
use std::time::Duration;

use mnemos_storage::{Database, EventQueue, EventType, RetryPolicy};
use tempfile::TempDir;

async fn open_queue(policy: RetryPolicy) -> (TempDir, EventQueue) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.db");
    let db = Database::open(path.to_str().unwrap()).await.unwrap();
    (dir, EventQueue::new(db, policy))
}

fn fast_policy(attempts: u32) -> RetryPolicy {
    RetryPolicy {
        attempts,
        delay: Duration::from_millis(5),
    }
}

#[tokio::test]
async fn fetch_returns_events_in_id_order() {
    let (_dir, queue) = open_queue(RetryPolicy::default()).await;

    // Timestamps deliberately out of order: FIFO follows the id, not the clock.
    let a = queue.enqueue(EventType::Created, "/n/a.txt", 30.0).await.unwrap();
    let b = queue.enqueue(EventType::Modified, "/n/b.txt", 10.0).await.unwrap();
    let c = queue.enqueue(EventType::Deleted, "/n/c.txt", 20.0).await.unwrap();

    let events = queue.fetch_unprocessed(10).await.unwrap();
    let ids: Vec<_> = events.iter().map(|e| Some(e.id)).collect();
    assert_eq!(ids, vec![a, b, c]);
    assert!(a < b && b < c);
    assert_eq!(events[1].event_type, EventType::Modified);
    assert_eq!(events[1].path, "/n/b.txt");
    assert!(!events[1].processed);
}

#[tokio::test]
async fn fetch_respects_limit_and_does_not_claim() {
    let (_dir, queue) = open_queue(RetryPolicy::default()).await;
    for i in 0..5 {
        queue
            .enqueue(EventType::Created, &format!("/n/{i}.txt"), i as f64)
            .await
            .unwrap();
    }

    let first = queue.fetch_unprocessed(2).await.unwrap();
    let again = queue.fetch_unprocessed(2).await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first, again);
}

#[tokio::test]
async fn draining_sees_each_event_exactly_once() {
    let (_dir, queue) = open_queue(RetryPolicy::default()).await;
    for i in 0..7 {
        queue
            .enqueue(EventType::Created, &format!("/n/{i}.txt"), i as f64)
            .await
            .unwrap();
    }

    let mut seen = Vec::new();
    loop {
        let batch = queue.fetch_unprocessed(3).await.unwrap();
        if batch.is_empty() {
            break;
        }
        for event in batch {
            seen.push(event.id);
            queue.mark_processed(event.id).await.unwrap();
        }
    }

    let mut sorted = seen.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(seen.len(), 7);
    assert_eq!(seen, sorted);
    assert_eq!(queue.pending_count().await.unwrap(), 0);
    assert_eq!(queue.total_count().await.unwrap(), 7);
}

#[tokio::test]
async fn mark_processed_is_idempotent_and_keeps_rows() {
    let (_dir, queue) = open_queue(RetryPolicy::default()).await;
    let id = queue
        .enqueue(EventType::Created, "/n/a.txt", 1.0)
        .await
        .unwrap()
        .unwrap();

    queue.mark_processed(id).await.unwrap();
    queue.mark_processed(id).await.unwrap();
    queue.mark_processed(9999).await.unwrap();

    let event = queue.get(id).await.unwrap().unwrap();
    assert!(event.processed);
    assert_eq!(queue.total_count().await.unwrap(), 1);
    assert!(queue.fetch_unprocessed(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_event_types_round_trip() {
    let (_dir, queue) = open_queue(RetryPolicy::default()).await;
    let id = queue
        .enqueue(EventType::Other("git_commit".into()), "/repo", 5.0)
        .await
        .unwrap()
        .unwrap();
    let event = queue.get(id).await.unwrap().unwrap();
    assert_eq!(event.event_type, EventType::Other("git_commit".into()));
    assert_eq!(event.event_type.to_string(), "git_commit");
}

#[tokio::test]
async fn recent_orders_by_timestamp_newest_first() {
    let (_dir, queue) = open_queue(RetryPolicy::default()).await;
    queue.enqueue(EventType::Created, "/n/old.txt", 100.0).await.unwrap();
    queue.enqueue(EventType::Created, "/n/new.txt", 300.0).await.unwrap();
    queue.enqueue(EventType::Modified, "/n/mid.txt", 200.0).await.unwrap();

    let recent = queue.recent(2).await.unwrap();
    let paths: Vec<_> = recent.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["/n/new.txt", "/n/mid.txt"]);
}

#[tokio::test]
async fn enqueue_gives_up_quietly_when_locked() {
    let (dir, queue) = open_queue(fast_policy(3)).await;
    let path = dir.path().join("events.db");

    let holder = rusqlite::Connection::open(&path).unwrap();
    holder.execute_batch("BEGIN EXCLUSIVE;").unwrap();

    let result = queue.enqueue(EventType::Created, "/n/a.txt", 1.0).await;
    assert!(matches!(result, Ok(None)), "got {result:?}");

    holder.execute_batch("COMMIT;").unwrap();
    drop(holder);

    let id = queue.enqueue(EventType::Created, "/n/a.txt", 1.0).await.unwrap();
    assert!(id.is_some());
    assert_eq!(queue.total_count().await.unwrap(), 1);
}

#[tokio::test]
async fn enqueue_succeeds_once_lock_is_released() {
    let (dir, queue) = open_queue(fast_policy(100)).await;
    let path = dir.path().join("events.db");

    let (locked_tx, locked_rx) = mpsc::channel();
    let holder = std::thread::spawn(move || {
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("BEGIN EXCLUSIVE;").unwrap();
        locked_tx.send(()).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        conn.execute_batch("COMMIT;").unwrap();
    });
    locked_rx.recv().unwrap();

    let id = queue.enqueue(EventType::Modified, "/n/b.txt", 2.0).await.unwrap();
    assert!(id.is_some());
    holder.join().unwrap();
}

#[tokio::test]
async fn shared_file_holds_both_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db");
    let path = path.to_str().unwrap();

    let first = Database::open(path).await.unwrap();
    let second = Database::open(path).await.unwrap();
    let queue = EventQueue::new(second, RetryPolicy::default());
    queue.enqueue(EventType::Created, "/n/a.txt", 1.0).await.unwrap();

    let n: i64 = first
        .connection()
        .call(|conn| conn.query_row("SELECT COUNT(*) FROM vectors", [], |row| row.get(0)))
        .await
        .unwrap();
    assert_eq!(n, 0);
}
