//! Concurrent access to a shared store from many threads.

use resource_store::models::{BlogPostDraft, TaskDraft, TaskPatch};
use resource_store::{BlogPost, IdPolicy, Store, Task};
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

const NUM_THREADS: usize = 10;
const RECORDS_PER_THREAD: usize = 50;

fn task_draft(title: &str) -> TaskDraft {
    TaskDraft {
        title: title.to_string(),
        description: String::new(),
        completed: false,
    }
}

#[test]
fn concurrent_creates_yield_distinct_random_ids() {
    let store: Arc<Store<Task>> = Arc::new(Store::with_policy(IdPolicy::Random));
    let barrier = Arc::new(Barrier::new(NUM_THREADS));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                // Identical payloads on purpose
                (0..RECORDS_PER_THREAD)
                    .map(|_| store.create(task_draft("same payload")).id)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        for id in handle.join().unwrap() {
            assert!(ids.insert(id), "duplicate id {}", id);
        }
    }

    assert_eq!(ids.len(), NUM_THREADS * RECORDS_PER_THREAD);
    assert_eq!(store.len(), NUM_THREADS * RECORDS_PER_THREAD);
}

#[test]
fn concurrent_creates_yield_gapless_sequential_ids() {
    let store: Arc<Store<BlogPost>> = Arc::new(Store::with_policy(IdPolicy::Sequential));
    let barrier = Arc::new(Barrier::new(NUM_THREADS));

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|thread_id| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..RECORDS_PER_THREAD {
                    store.create(BlogPostDraft {
                        title: format!("Thread {} Post {}", thread_id, i),
                        content: String::new(),
                    });
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let total = (NUM_THREADS * RECORDS_PER_THREAD) as u64;
    let mut ids: Vec<u64> = store.list(None).into_iter().map(|post| post.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=total).collect::<Vec<_>>());
}

#[test]
fn concurrent_merges_never_lose_fields() {
    let store: Arc<Store<Task>> = Arc::new(Store::new());
    let created = store.create(TaskDraft {
        title: "shared".to_string(),
        description: "original".to_string(),
        completed: false,
    });
    let id = created.id;
    let barrier = Arc::new(Barrier::new(2));

    let toggler = {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for i in 0..200 {
                store
                    .update(
                        &id,
                        TaskPatch {
                            completed: Some(i % 2 == 0),
                            ..Default::default()
                        },
                    )
                    .unwrap();
            }
        })
    };

    let renamer = {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for i in 0..200 {
                store
                    .update(
                        &id,
                        TaskPatch {
                            title: Some(format!("shared {}", i)),
                            ..Default::default()
                        },
                    )
                    .unwrap();
            }
        })
    };

    toggler.join().unwrap();
    renamer.join().unwrap();

    let task = store.get(&id).unwrap();
    assert_eq!(task.title, "shared 199");
    assert!(!task.completed);
    assert_eq!(task.description, "original");
    assert_eq!(task.created_at, created.created_at);
}

#[test]
fn create_then_list_from_another_thread_sees_record() {
    let store: Arc<Store<Task>> = Arc::new(Store::new());

    let writer = {
        let store = Arc::clone(&store);
        thread::spawn(move || store.create(task_draft("visible")).id)
    };
    let id = writer.join().unwrap();

    let reader = {
        let store = Arc::clone(&store);
        thread::spawn(move || store.list(Some("VISIB")))
    };
    let listed = reader.join().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);
}

#[test]
fn delete_all_races_with_creates() {
    let store: Arc<Store<Task>> = Arc::new(Store::new());
    let barrier = Arc::new(Barrier::new(2));

    let creator = {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for i in 0..500 {
                store.create(task_draft(&format!("task {}", i)));
            }
        })
    };

    let clearer = {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            (0..50).map(|_| store.delete_all()).sum::<usize>()
        })
    };

    creator.join().unwrap();
    let cleared = clearer.join().unwrap();

    // Every created record was either cleared or is still present
    assert_eq!(cleared + store.len(), 500);
}
