//! Runs an async callback against a recorder and replays its output.
//!
//! The runner holds its sink behind a mutex that stays locked for a whole
//! replay, so each group reaches the sink as one contiguous bracket even when
//! several groups finish on different tasks.

use crate::entry::BufferEntry;
use crate::recorder::GroupRecorder;
use crate::sink::{forward, GroupSink, TracingSink};
use std::future::Future;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

pub type SharedSink = Arc<Mutex<dyn GroupSink + Send>>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub entries: usize,
    pub emits: usize,
    /// Deepest nested group below the top-level bracket.
    pub max_depth: usize,
}

/// Writes `entries` to `sink` inside an `open(label)`/`close()` pair.
pub fn replay<S>(sink: &mut S, label: &str, entries: Vec<BufferEntry>) -> ReplaySummary
where
    S: GroupSink + ?Sized,
{
    let mut summary = ReplaySummary {
        entries: entries.len(),
        ..ReplaySummary::default()
    };
    let mut depth = 0_usize;

    sink.open(label);
    for entry in entries {
        match entry {
            BufferEntry::Open { label } => {
                depth += 1;
                summary.max_depth = summary.max_depth.max(depth);
                sink.open(&label);
            }
            BufferEntry::Close => {
                depth = depth.saturating_sub(1);
                sink.close();
            }
            BufferEntry::Emit(call) => {
                summary.emits += 1;
                forward(&mut *sink, call);
            }
        }
    }
    sink.close();
    summary
}

// ── AsyncGroupRunner ──────────────────────────────────────────────────────────

pub struct AsyncGroupRunner<S: ?Sized> {
    sink: Arc<Mutex<S>>,
}

impl<S: ?Sized> Clone for AsyncGroupRunner<S> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S: GroupSink> AsyncGroupRunner<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
        }
    }
}

impl<S: GroupSink + ?Sized> AsyncGroupRunner<S> {
    pub fn from_shared(sink: Arc<Mutex<S>>) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &Arc<Mutex<S>> {
        &self.sink
    }

    /// Runs `callback` with a fresh recorder, then replays everything it
    /// recorded under `label` and returns the callback's output unchanged.
    ///
    /// Replay happens exactly once on every exit path: normal completion, an
    /// error value, a panic inside the callback, or the returned future being
    /// dropped before it completes.
    pub async fn run<F, Fut, T>(&self, label: impl Into<String>, callback: F) -> T
    where
        F: FnOnce(GroupRecorder) -> Fut,
        Fut: Future<Output = T>,
    {
        run_with_sink(&*self.sink, label, callback).await
    }
}

async fn run_with_sink<S, F, Fut, T>(sink: &Mutex<S>, label: impl Into<String>, callback: F) -> T
where
    S: GroupSink + ?Sized,
    F: FnOnce(GroupRecorder) -> Fut,
    Fut: Future<Output = T>,
{
    let recorder = GroupRecorder::new();
    let guard = ReplayOnDrop {
        sink,
        recorder: recorder.clone(),
        label: label.into(),
    };
    let output = callback(recorder).await;
    drop(guard);
    output
}

struct ReplayOnDrop<'a, S: GroupSink + ?Sized> {
    sink: &'a Mutex<S>,
    recorder: GroupRecorder,
    label: String,
}

impl<S: GroupSink + ?Sized> Drop for ReplayOnDrop<'_, S> {
    fn drop(&mut self) {
        let entries = self.recorder.seal();
        let summary = {
            let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
            replay(&mut *sink, &self.label, entries)
        };
        tracing::debug!(
            label = %self.label,
            entries = summary.entries,
            emits = summary.emits,
            max_depth = summary.max_depth,
            "replayed group"
        );
    }
}

// ── Process-wide default sink ─────────────────────────────────────────────────

static DEFAULT_SINK: OnceLock<Mutex<Option<SharedSink>>> = OnceLock::new();

fn sink_slot() -> &'static Mutex<Option<SharedSink>> {
    DEFAULT_SINK.get_or_init(|| Mutex::new(None))
}

/// Installs `sink` as the target of [`async_group`] and returns the shared
/// handle so callers can keep inspecting it.
pub fn init_default_sink<S>(sink: S) -> SharedSink
where
    S: GroupSink + Send + 'static,
{
    let shared: SharedSink = Arc::new(Mutex::new(sink));
    *sink_slot().lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&shared));
    shared
}

pub fn clear_default_sink() {
    *sink_slot().lock().unwrap_or_else(PoisonError::into_inner) = None;
}

/// The installed default sink, or a `TracingSink` with default settings when
/// none has been installed.
pub fn default_sink() -> SharedSink {
    let mut slot = sink_slot().lock().unwrap_or_else(PoisonError::into_inner);
    let shared =
        slot.get_or_insert_with(|| -> SharedSink { Arc::new(Mutex::new(TracingSink::new())) });
    Arc::clone(shared)
}

/// Runs `callback` as a group on the process-wide default sink.
pub async fn async_group<F, Fut, T>(label: impl Into<String>, callback: F) -> T
where
    F: FnOnce(GroupRecorder) -> Fut,
    Fut: Future<Output = T>,
{
    let sink = default_sink();
    run_with_sink(&*sink, label, callback).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ConsoleCall;
    use crate::sink::MemorySink;
    use serde_json::json;

    #[test]
    fn replay_brackets_entries_and_reports_depth() {
        let mut sink = MemorySink::new();
        let entries = vec![
            BufferEntry::open("N"),
            BufferEntry::open("M"),
            BufferEntry::Emit(ConsoleCall::Log {
                data: vec![json!("deep")],
            }),
            BufferEntry::Close,
            BufferEntry::Close,
        ];

        let summary = replay(&mut sink, "G", entries.clone());

        let mut expected = vec![BufferEntry::open("G")];
        expected.extend(entries);
        expected.push(BufferEntry::Close);
        assert_eq!(sink.events(), expected);
        assert_eq!(
            summary,
            ReplaySummary {
                entries: 5,
                emits: 1,
                max_depth: 2,
            }
        );
    }

    #[test]
    fn empty_buffer_still_opens_and_closes() {
        let mut sink = MemorySink::new();
        let summary = replay(&mut sink, "empty", Vec::new());
        assert_eq!(sink.events(), vec![BufferEntry::open("empty"), BufferEntry::Close]);
        assert_eq!(summary, ReplaySummary::default());
    }

    #[tokio::test]
    async fn runner_replays_only_after_callback_settles() {
        let transcript = MemorySink::new();
        let runner = AsyncGroupRunner::new(transcript.clone());
        let observer = transcript.clone();

        let value = runner
            .run("G", |group| async move {
                group.log(["a"]);
                tokio::task::yield_now().await;
                assert!(observer.events().is_empty());
                "done"
            })
            .await;

        assert_eq!(value, "done");
        assert_eq!(transcript.events().len(), 3);
    }
}
