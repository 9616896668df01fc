//! 配置校验模块
//!
//! 校验规则：
//! - 至少配置一个 sink
//! - sink 名称非空且唯一
//! - file sink: `dir` 若提供则非空，`format` 为 `text` 或 `json`

use std::collections::HashSet;

use contracts::{BulkConfig, ContractError, SinkType};

const FILE_FORMATS: &[&str] = &["text", "json"];

/// 校验 BulkConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &BulkConfig) -> Result<(), ContractError> {
    validate_sink_count(config)?;
    validate_sink_names(config)?;
    validate_file_params(config)?;
    Ok(())
}

fn validate_sink_count(config: &BulkConfig) -> Result<(), ContractError> {
    if config.sinks.is_empty() {
        return Err(ContractError::config_validation(
            "sinks",
            "at least one sink is required",
        ));
    }
    Ok(())
}

fn validate_sink_names(config: &BulkConfig) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for (idx, sink) in config.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(ContractError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(ContractError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}

fn validate_file_params(config: &BulkConfig) -> Result<(), ContractError> {
    for sink in config
        .sinks
        .iter()
        .filter(|s| s.sink_type == SinkType::File)
    {
        if sink.params.get("dir").is_some_and(|dir| dir.is_empty()) {
            return Err(ContractError::config_validation(
                format!("sinks[{}].params.dir", sink.name),
                "dir cannot be empty",
            ));
        }
        if let Some(format) = sink.params.get("format") {
            if !FILE_FORMATS.contains(&format.as_str()) {
                return Err(ContractError::config_validation(
                    format!("sinks[{}].params.format", sink.name),
                    format!("unknown format '{}', expected one of {:?}", format, FILE_FORMATS),
                ));
            }
        }
    }
    Ok(())
}
