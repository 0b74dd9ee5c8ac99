use async_group::{AsyncGroupRunner, BufferEntry, ConsoleCall, MemorySink};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

const TEST_LABEL: &str = "Test Group";
const TEST_NESTED_LABEL: &str = "Nested Group";

fn log(text: &str) -> BufferEntry {
    BufferEntry::Emit(ConsoleCall::Log {
        data: vec![json!(text)],
    })
}

fn count_opens(events: &[BufferEntry]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, BufferEntry::Open { .. }))
        .count()
}

fn count_closes(events: &[BufferEntry]) -> usize {
    events.iter().filter(|e| **e == BufferEntry::Close).count()
}

#[tokio::test]
async fn nested_group_opens_and_closes_twice() {
    let transcript = MemorySink::new();
    let runner = AsyncGroupRunner::new(transcript.clone());
    let ran = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&ran);

    let result = runner
        .run(TEST_LABEL, |group| async move {
            group
                .group(TEST_NESTED_LABEL, |nested| async move {
                    tokio::task::yield_now().await;
                    nested.log(["inner"]);
                    flag.store(true, Ordering::SeqCst);
                })
                .await;
            "outer result"
        })
        .await;

    assert_eq!(result, "outer result");
    assert!(ran.load(Ordering::SeqCst));
    let events = transcript.events();
    assert_eq!(count_opens(&events), 2);
    assert_eq!(count_closes(&events), 2);
    assert!(events.contains(&BufferEntry::open(TEST_NESTED_LABEL)));
}

#[tokio::test]
async fn nested_bracket_sits_between_outer_entries() {
    let transcript = MemorySink::new();
    let runner = AsyncGroupRunner::new(transcript.clone());

    runner
        .run("outer", |group| async move {
            group.log(["pre-1"]);
            group.log(["pre-2"]);
            group
                .group("inner", |nested| async move {
                    nested.log(["in-1"]);
                    tokio::task::yield_now().await;
                    nested.log(["in-2"]);
                })
                .await;
            group.log(["post"]);
        })
        .await;

    assert_eq!(
        transcript.events(),
        vec![
            BufferEntry::open("outer"),
            log("pre-1"),
            log("pre-2"),
            BufferEntry::open("inner"),
            log("in-1"),
            log("in-2"),
            BufferEntry::Close,
            log("post"),
            BufferEntry::Close,
        ]
    );
}

#[tokio::test]
async fn deeply_nested_groups_flatten_in_order() {
    let transcript = MemorySink::new();
    let runner = AsyncGroupRunner::new(transcript.clone());

    let depth = runner
        .run("1", |one| async move {
            one.group("2", |two| async move {
                two.group("3", |three| async move {
                    three.log(["leaf"]);
                    3
                })
                .await
            })
            .await
        })
        .await;

    assert_eq!(depth, 3);
    assert_eq!(
        transcript.events(),
        vec![
            BufferEntry::open("1"),
            BufferEntry::open("2"),
            BufferEntry::open("3"),
            log("leaf"),
            BufferEntry::Close,
            BufferEntry::Close,
            BufferEntry::Close,
        ]
    );
}

#[tokio::test]
async fn sibling_emits_while_nested_group_is_suspended_stay_outside_bracket() {
    let transcript = MemorySink::new();
    let runner = AsyncGroupRunner::new(transcript.clone());
    let (release, wait) = oneshot::channel::<()>();

    runner
        .run("outer", |group| async move {
            let sibling = group.clone();
            let nested = group.group("inner", |inner| async move {
                inner.log(["in-before"]);
                let _ = wait.await;
                inner.log(["in-after"]);
            });
            let other = async move {
                tokio::task::yield_now().await;
                sibling.log(["sibling"]);
                let _ = release.send(());
            };
            tokio::join!(nested, other);
            group.log(["after-join"]);
        })
        .await;

    assert_eq!(
        transcript.events(),
        vec![
            BufferEntry::open("outer"),
            log("sibling"),
            BufferEntry::open("inner"),
            log("in-before"),
            log("in-after"),
            BufferEntry::Close,
            log("after-join"),
            BufferEntry::Close,
        ]
    );
}

#[tokio::test]
async fn concurrent_top_level_groups_never_interleave() {
    let transcript = MemorySink::new();
    let runner = AsyncGroupRunner::new(transcript.clone());
    let (first_go, first_wait) = oneshot::channel::<()>();

    let first = runner.run("A", |group| async move {
        group.log(["a-1"]);
        let _ = first_wait.await;
        group.log(["a-2"]);
    });
    let second = runner.run("B", |group| async move {
        group.log(["b-1"]);
        tokio::task::yield_now().await;
        group.log(["b-2"]);
        let _ = first_go.send(());
    });
    tokio::join!(first, second);

    assert_eq!(
        transcript.events(),
        vec![
            BufferEntry::open("B"),
            log("b-1"),
            log("b-2"),
            BufferEntry::Close,
            BufferEntry::open("A"),
            log("a-1"),
            log("a-2"),
            BufferEntry::Close,
        ]
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn groups_on_parallel_tasks_replay_as_contiguous_brackets() {
    let transcript = MemorySink::new();
    let runner = AsyncGroupRunner::new(transcript.clone());

    let mut handles = Vec::new();
    for task in 0..8 {
        let runner = runner.clone();
        handles.push(tokio::spawn(async move {
            runner
                .run(format!("task-{task}"), |group| async move {
                    for step in 0..5 {
                        group.log([format!("task-{task} step-{step}")]);
                        tokio::task::yield_now().await;
                    }
                })
                .await;
        }));
    }
    for handle in handles {
        handle.await.expect("task join");
    }

    let events = transcript.events();
    assert_eq!(events.len(), 8 * 7);
    for bracket in events.chunks(7) {
        let BufferEntry::Open { label } = &bracket[0] else {
            panic!("bracket must start with open, got {:?}", bracket[0]);
        };
        for (step, entry) in bracket[1..6].iter().enumerate() {
            assert_eq!(*entry, log(&format!("{label} step-{step}")));
        }
        assert_eq!(bracket[6], BufferEntry::Close);
    }
}
