//! Per-invocation recording context handed to group callbacks.

use crate::entry::{values, BufferEntry, ConsoleCall};
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct RecorderState {
    buffer: Vec<BufferEntry>,
    ended: bool,
}

/// Collects emit calls and nested groups in order instead of writing them.
///
/// Handles are cheap to clone and all clones share one buffer. Once the
/// owning callback settles the recorder is sealed, and every later call
/// through any handle is silently ignored.
#[derive(Debug, Clone, Default)]
pub struct GroupRecorder {
    state: Arc<Mutex<RecorderState>>,
}

impl GroupRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RecorderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends `call` unless the recorder has been sealed.
    pub fn emit(&self, call: ConsoleCall) {
        let mut state = self.state();
        if !state.ended {
            state.buffer.push(BufferEntry::Emit(call));
        }
    }

    pub fn log<I>(&self, data: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.emit(ConsoleCall::Log { data: values(data) });
    }

    pub fn warn<I>(&self, data: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.emit(ConsoleCall::Warn { data: values(data) });
    }

    pub fn error<I>(&self, data: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.emit(ConsoleCall::Error { data: values(data) });
    }

    pub fn debug<I>(&self, data: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.emit(ConsoleCall::Debug { data: values(data) });
    }

    pub fn info<I>(&self, data: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.emit(ConsoleCall::Info { data: values(data) });
    }

    /// `columns` restricts the rendered table to the named properties.
    pub fn table(&self, data: impl Into<Value>, columns: Option<&[&str]>) {
        self.emit(ConsoleCall::Table {
            data: data.into(),
            columns: columns.map(|names| names.iter().map(|name| name.to_string()).collect()),
        });
    }

    pub fn trace<I>(&self, data: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.emit(ConsoleCall::Trace { data: values(data) });
    }

    pub fn assert<I>(&self, condition: bool, data: I)
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.emit(ConsoleCall::Assert {
            condition,
            data: values(data),
        });
    }

    pub fn time(&self, label: Option<&str>) {
        self.emit(ConsoleCall::Time {
            label: label.map(str::to_string),
        });
    }

    pub fn time_end(&self, label: Option<&str>) {
        self.emit(ConsoleCall::TimeEnd {
            label: label.map(str::to_string),
        });
    }

    pub fn dir(&self, item: impl Into<Value>, options: Option<Value>) {
        self.emit(ConsoleCall::Dir {
            item: item.into(),
            options,
        });
    }

    /// Runs `callback` against a fresh child recorder and splices the child's
    /// output into this buffer, bracketed by `Open(label)` and `Close`.
    ///
    /// The splice happens when the callback settles, including when the
    /// returned future is dropped early or the callback panics. If this
    /// recorder is already sealed the child's output is discarded, but the
    /// callback still runs and its output is still returned.
    pub async fn group<F, Fut, T>(&self, label: impl Into<String>, callback: F) -> T
    where
        F: FnOnce(GroupRecorder) -> Fut,
        Fut: Future<Output = T>,
    {
        let child = GroupRecorder::new();
        let splice = SpliceOnDrop {
            parent: self,
            child: child.clone(),
            label: label.into(),
        };
        let output = callback(child).await;
        drop(splice);
        output
    }

    /// Marks the recorder ended and hands out its buffer.
    ///
    /// Only the first call returns the recorded entries; later calls return
    /// an empty buffer.
    pub fn seal(&self) -> Vec<BufferEntry> {
        let mut state = self.state();
        state.ended = true;
        std::mem::take(&mut state.buffer)
    }

    pub fn is_ended(&self) -> bool {
        self.state().ended
    }

    pub fn len(&self) -> usize {
        self.state().buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().buffer.is_empty()
    }

    fn splice(&self, label: String, entries: Vec<BufferEntry>) {
        let dropped = {
            let mut state = self.state();
            if state.ended {
                Some(entries.len())
            } else {
                state.buffer.reserve(entries.len() + 2);
                state.buffer.push(BufferEntry::Open { label: label.clone() });
                state.buffer.extend(entries);
                state.buffer.push(BufferEntry::Close);
                None
            }
        };
        if let Some(count) = dropped {
            tracing::warn!(
                label = %label,
                dropped_entries = count,
                "nested group discarded, parent already ended"
            );
        }
    }
}

struct SpliceOnDrop<'a> {
    parent: &'a GroupRecorder,
    child: GroupRecorder,
    label: String,
}

impl Drop for SpliceOnDrop<'_> {
    fn drop(&mut self) {
        let entries = self.child.seal();
        self.parent.splice(std::mem::take(&mut self.label), entries);
    }
}
