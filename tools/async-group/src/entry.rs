//! Buffered operations captured by a `GroupRecorder`.
//!
//! A recorder's buffer is a flat sequence of `BufferEntry` values. Nested
//! groups appear inline, bracketed by `Open` and `Close`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── ConsoleMethod ─────────────────────────────────────────────────────────────

/// The closed set of emit kinds a recorder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleMethod {
    Log,
    Warn,
    Error,
    Debug,
    Info,
    Table,
    Trace,
    Assert,
    Time,
    TimeEnd,
    Dir,
}

impl ConsoleMethod {
    pub const ALL: [ConsoleMethod; 11] = [
        ConsoleMethod::Log,
        ConsoleMethod::Warn,
        ConsoleMethod::Error,
        ConsoleMethod::Debug,
        ConsoleMethod::Info,
        ConsoleMethod::Table,
        ConsoleMethod::Trace,
        ConsoleMethod::Assert,
        ConsoleMethod::Time,
        ConsoleMethod::TimeEnd,
        ConsoleMethod::Dir,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConsoleMethod::Log => "log",
            ConsoleMethod::Warn => "warn",
            ConsoleMethod::Error => "error",
            ConsoleMethod::Debug => "debug",
            ConsoleMethod::Info => "info",
            ConsoleMethod::Table => "table",
            ConsoleMethod::Trace => "trace",
            ConsoleMethod::Assert => "assert",
            ConsoleMethod::Time => "time",
            ConsoleMethod::TimeEnd => "time_end",
            ConsoleMethod::Dir => "dir",
        }
    }
}

// ── ConsoleCall ───────────────────────────────────────────────────────────────

/// One emit call together with the argument shape of its kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleCall {
    Log { data: Vec<Value> },
    Warn { data: Vec<Value> },
    Error { data: Vec<Value> },
    Debug { data: Vec<Value> },
    Info { data: Vec<Value> },
    Table {
        data: Value,
        columns: Option<Vec<String>>,
    },
    Trace { data: Vec<Value> },
    Assert { condition: bool, data: Vec<Value> },
    Time { label: Option<String> },
    TimeEnd { label: Option<String> },
    Dir {
        item: Value,
        options: Option<Value>,
    },
}

impl ConsoleCall {
    pub fn method(&self) -> ConsoleMethod {
        match self {
            ConsoleCall::Log { .. } => ConsoleMethod::Log,
            ConsoleCall::Warn { .. } => ConsoleMethod::Warn,
            ConsoleCall::Error { .. } => ConsoleMethod::Error,
            ConsoleCall::Debug { .. } => ConsoleMethod::Debug,
            ConsoleCall::Info { .. } => ConsoleMethod::Info,
            ConsoleCall::Table { .. } => ConsoleMethod::Table,
            ConsoleCall::Trace { .. } => ConsoleMethod::Trace,
            ConsoleCall::Assert { .. } => ConsoleMethod::Assert,
            ConsoleCall::Time { .. } => ConsoleMethod::Time,
            ConsoleCall::TimeEnd { .. } => ConsoleMethod::TimeEnd,
            ConsoleCall::Dir { .. } => ConsoleMethod::Dir,
        }
    }
}

// ── BufferEntry ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferEntry {
    Open { label: String },
    Close,
    Emit(ConsoleCall),
}

impl BufferEntry {
    pub fn open(label: impl Into<String>) -> Self {
        BufferEntry::Open {
            label: label.into(),
        }
    }
}

impl From<ConsoleCall> for BufferEntry {
    fn from(call: ConsoleCall) -> Self {
        BufferEntry::Emit(call)
    }
}

pub(crate) fn values<I>(data: I) -> Vec<Value>
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    data.into_iter().map(Into::into).collect()
}
