//! Labeled output groups that stay contiguous across async suspension.
//!
//! A group callback writes into a [`GroupRecorder`] instead of the real sink.
//! When the callback settles, however it settles, the recorded operations are
//! replayed onto a [`GroupSink`] inside one `open(label)`/`close()` bracket.
//! Output from other tasks can never land inside the bracket, because nothing
//! reaches the sink until the group is complete.

pub mod config;
pub mod entry;
pub mod errors;
pub mod recorder;
pub mod render;
pub mod runner;
pub mod sink;

pub use config::{load_config, parse_config, GroupConfig, SinkConfig};
pub use entry::{BufferEntry, ConsoleCall, ConsoleMethod};
pub use errors::GroupError;
pub use recorder::GroupRecorder;
pub use runner::{
    async_group, clear_default_sink, default_sink, init_default_sink, replay, AsyncGroupRunner,
    ReplaySummary, SharedSink,
};
pub use sink::{forward, GroupSink, MemorySink, TracingSink};
