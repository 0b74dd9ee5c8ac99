use crate::errors::GroupError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PATH_SEPARATOR: &str = " > ";
pub const DEFAULT_TIMER_LABEL: &str = "default";
pub const DEFAULT_MAX_ARG_BYTES: usize = 4096;
const MIN_ARG_BYTES: usize = 16;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct GroupConfig {
    pub sink: SinkConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SinkConfig {
    /// Joins nested group labels into the `group` field of each event.
    pub path_separator: String,
    /// Timer name used by `time`/`time_end` calls without a label.
    pub default_timer_label: String,
    /// Rendered arguments longer than this are cut and suffixed with `...`.
    pub max_arg_bytes: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            path_separator: DEFAULT_PATH_SEPARATOR.to_string(),
            default_timer_label: DEFAULT_TIMER_LABEL.to_string(),
            max_arg_bytes: DEFAULT_MAX_ARG_BYTES,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialGroupConfig {
    sink: Option<PartialSinkConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct PartialSinkConfig {
    path_separator: Option<String>,
    default_timer_label: Option<String>,
    max_arg_bytes: Option<usize>,
}

/// Loads defaults, then merges the TOML file at `path` when one is given.
pub fn load_config(path: Option<&Path>) -> Result<GroupConfig, GroupError> {
    match path {
        Some(path) => {
            let contents =
                std::fs::read_to_string(path).map_err(|e| GroupError::Io(e.to_string()))?;
            parse_config(&contents)
        }
        None => {
            let cfg = GroupConfig::default();
            validate_config(&cfg)?;
            Ok(cfg)
        }
    }
}

pub fn parse_config(contents: &str) -> Result<GroupConfig, GroupError> {
    let partial: PartialGroupConfig =
        toml::from_str(contents).map_err(|e| GroupError::ConfigParse(e.to_string()))?;
    let mut cfg = GroupConfig::default();
    merge_partial_config(&mut cfg, partial);
    validate_config(&cfg)?;
    Ok(cfg)
}

fn merge_partial_config(cfg: &mut GroupConfig, partial: PartialGroupConfig) {
    if let Some(sink) = partial.sink {
        if let Some(value) = sink.path_separator {
            cfg.sink.path_separator = value;
        }
        if let Some(value) = sink.default_timer_label {
            cfg.sink.default_timer_label = value;
        }
        if let Some(value) = sink.max_arg_bytes {
            cfg.sink.max_arg_bytes = value;
        }
    }
}

fn validate_config(cfg: &GroupConfig) -> Result<(), GroupError> {
    if cfg.sink.path_separator.is_empty() {
        return Err(GroupError::InvalidConfig(
            "sink.path_separator must not be empty".to_string(),
        ));
    }

    if cfg.sink.default_timer_label.trim().is_empty() {
        return Err(GroupError::InvalidConfig(
            "sink.default_timer_label must not be blank".to_string(),
        ));
    }

    if cfg.sink.max_arg_bytes < MIN_ARG_BYTES {
        return Err(GroupError::InvalidConfig(format!(
            "sink.max_arg_bytes must be at least {MIN_ARG_BYTES}"
        )));
    }

    Ok(())
}
