//! The output device replayed groups are written to.

pub mod tracing_sink;

use crate::entry::{BufferEntry, ConsoleCall};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};

pub use tracing_sink::TracingSink;

/// An ordered, hierarchical log sink.
///
/// Implementations are expected to act synchronously and in call order. Each
/// emit operation receives the arguments exactly as they were recorded.
pub trait GroupSink {
    fn open(&mut self, label: &str);
    fn close(&mut self);

    fn log(&mut self, data: Vec<Value>);
    fn warn(&mut self, data: Vec<Value>);
    fn error(&mut self, data: Vec<Value>);
    fn debug(&mut self, data: Vec<Value>);
    fn info(&mut self, data: Vec<Value>);
    fn table(&mut self, data: Value, columns: Option<Vec<String>>);
    fn trace(&mut self, data: Vec<Value>);
    fn assert(&mut self, condition: bool, data: Vec<Value>);
    fn time(&mut self, label: Option<String>);
    fn time_end(&mut self, label: Option<String>);
    fn dir(&mut self, item: Value, options: Option<Value>);
}

/// Routes one recorded call to the sink operation of the same kind.
pub fn forward<S>(sink: &mut S, call: ConsoleCall)
where
    S: GroupSink + ?Sized,
{
    match call {
        ConsoleCall::Log { data } => sink.log(data),
        ConsoleCall::Warn { data } => sink.warn(data),
        ConsoleCall::Error { data } => sink.error(data),
        ConsoleCall::Debug { data } => sink.debug(data),
        ConsoleCall::Info { data } => sink.info(data),
        ConsoleCall::Table { data, columns } => sink.table(data, columns),
        ConsoleCall::Trace { data } => sink.trace(data),
        ConsoleCall::Assert { condition, data } => sink.assert(condition, data),
        ConsoleCall::Time { label } => sink.time(label),
        ConsoleCall::TimeEnd { label } => sink.time_end(label),
        ConsoleCall::Dir { item, options } => sink.dir(item, options),
    }
}

/// In-memory sink that keeps every operation it receives.
///
/// Clones share one transcript, so a test can hand one clone to a runner and
/// read the output through another.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<BufferEntry>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<BufferEntry> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn push(&mut self, entry: BufferEntry) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }
}

impl GroupSink for MemorySink {
    fn open(&mut self, label: &str) {
        self.push(BufferEntry::open(label));
    }

    fn close(&mut self) {
        self.push(BufferEntry::Close);
    }

    fn log(&mut self, data: Vec<Value>) {
        self.push(ConsoleCall::Log { data }.into());
    }

    fn warn(&mut self, data: Vec<Value>) {
        self.push(ConsoleCall::Warn { data }.into());
    }

    fn error(&mut self, data: Vec<Value>) {
        self.push(ConsoleCall::Error { data }.into());
    }

    fn debug(&mut self, data: Vec<Value>) {
        self.push(ConsoleCall::Debug { data }.into());
    }

    fn info(&mut self, data: Vec<Value>) {
        self.push(ConsoleCall::Info { data }.into());
    }

    fn table(&mut self, data: Value, columns: Option<Vec<String>>) {
        self.push(ConsoleCall::Table { data, columns }.into());
    }

    fn trace(&mut self, data: Vec<Value>) {
        self.push(ConsoleCall::Trace { data }.into());
    }

    fn assert(&mut self, condition: bool, data: Vec<Value>) {
        self.push(ConsoleCall::Assert { condition, data }.into());
    }

    fn time(&mut self, label: Option<String>) {
        self.push(ConsoleCall::Time { label }.into());
    }

    fn time_end(&mut self, label: Option<String>) {
        self.push(ConsoleCall::TimeEnd { label }.into());
    }

    fn dir(&mut self, item: Value, options: Option<Value>) {
        self.push(ConsoleCall::Dir { item, options }.into());
    }
}
