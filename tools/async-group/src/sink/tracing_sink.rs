//! Adapter that forwards replayed groups to the `tracing` ecosystem.
//!
//! Group labels become a `group` field on every event (nested labels joined
//! by the configured separator) together with a `depth` field. Emit kinds map
//! onto tracing levels: log, info, table, dir and timer reports at INFO, warn
//! at WARN, error and failed assertions at ERROR, debug at DEBUG, trace at
//! TRACE.

use crate::config::SinkConfig;
use crate::render::{render_args, render_pretty, render_table, truncate};
use crate::sink::GroupSink;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct TracingSink {
    config: SinkConfig,
    path: Vec<String>,
    timers: HashMap<String, Instant>,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SinkConfig) -> Self {
        Self {
            config: config.clone(),
            ..Self::default()
        }
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    pub fn active_timers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.timers.keys().cloned().collect();
        names.sort();
        names
    }

    fn group_path(&self) -> String {
        self.path.join(&self.config.path_separator)
    }

    fn render(&self, data: &[Value]) -> String {
        render_args(data, self.config.max_arg_bytes)
    }

    fn timer_label(&self, label: Option<String>) -> String {
        label.unwrap_or_else(|| self.config.default_timer_label.clone())
    }
}

impl GroupSink for TracingSink {
    fn open(&mut self, label: &str) {
        tracing::info!(group = %self.group_path(), depth = self.depth(), "{label}");
        self.path.push(label.to_string());
    }

    fn close(&mut self) {
        self.path.pop();
    }

    fn log(&mut self, data: Vec<Value>) {
        let message = self.render(&data);
        tracing::info!(group = %self.group_path(), depth = self.depth(), "{message}");
    }

    fn warn(&mut self, data: Vec<Value>) {
        let message = self.render(&data);
        tracing::warn!(group = %self.group_path(), depth = self.depth(), "{message}");
    }

    fn error(&mut self, data: Vec<Value>) {
        let message = self.render(&data);
        tracing::error!(group = %self.group_path(), depth = self.depth(), "{message}");
    }

    fn debug(&mut self, data: Vec<Value>) {
        let message = self.render(&data);
        tracing::debug!(group = %self.group_path(), depth = self.depth(), "{message}");
    }

    fn info(&mut self, data: Vec<Value>) {
        let message = self.render(&data);
        tracing::info!(group = %self.group_path(), depth = self.depth(), "{message}");
    }

    fn table(&mut self, data: Value, columns: Option<Vec<String>>) {
        let table = truncate(
            render_table(&data, columns.as_deref()),
            self.config.max_arg_bytes,
        );
        tracing::info!(group = %self.group_path(), depth = self.depth(), "\n{table}");
    }

    fn trace(&mut self, data: Vec<Value>) {
        let message = self.render(&data);
        tracing::trace!(group = %self.group_path(), depth = self.depth(), "Trace: {message}");
    }

    fn assert(&mut self, condition: bool, data: Vec<Value>) {
        if condition {
            return;
        }
        let message = self.render(&data);
        if message.is_empty() {
            tracing::error!(group = %self.group_path(), depth = self.depth(), "Assertion failed");
        } else {
            tracing::error!(
                group = %self.group_path(),
                depth = self.depth(),
                "Assertion failed: {message}"
            );
        }
    }

    fn time(&mut self, label: Option<String>) {
        let label = self.timer_label(label);
        if self.timers.contains_key(&label) {
            tracing::warn!(
                group = %self.group_path(),
                depth = self.depth(),
                "Timer '{label}' already exists"
            );
            return;
        }
        self.timers.insert(label, Instant::now());
    }

    fn time_end(&mut self, label: Option<String>) {
        let label = self.timer_label(label);
        match self.timers.remove(&label) {
            Some(started) => {
                let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
                tracing::info!(
                    group = %self.group_path(),
                    depth = self.depth(),
                    "{label}: {elapsed_ms:.3}ms"
                );
            }
            None => {
                tracing::warn!(
                    group = %self.group_path(),
                    depth = self.depth(),
                    "Timer '{label}' does not exist"
                );
            }
        }
    }

    fn dir(&mut self, item: Value, options: Option<Value>) {
        let rendered = render_pretty(&item, self.config.max_arg_bytes);
        match options {
            Some(options) => tracing::info!(
                group = %self.group_path(),
                depth = self.depth(),
                options = %options,
                "{rendered}"
            ),
            None => tracing::info!(group = %self.group_path(), depth = self.depth(), "{rendered}"),
        }
    }
}
