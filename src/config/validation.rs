//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (intervals, capacities, gas limit > 0)
//! - Validate endpoint URLs before any connection is attempted
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ScoutConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use crate::config::schema::ScoutConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    /// Human readable description.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ScoutConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.pipeline.poll_interval_secs == 0 {
        errors.push(ValidationError::new("pipeline.poll_interval_secs", "must be greater than zero"));
    }
    if config.pipeline.queue_capacity == 0 {
        errors.push(ValidationError::new("pipeline.queue_capacity", "must be greater than zero"));
    }
    if config.pipeline.gas_limit == 0 {
        errors.push(ValidationError::new("pipeline.gas_limit", "must be greater than zero"));
    }

    if config.blockchain.rpc_url.parse::<url::Url>().is_err() {
        errors.push(ValidationError::new(
            "blockchain.rpc_url",
            format!("'{}' is not a valid URL", config.blockchain.rpc_url),
        ));
    }
    for failover in &config.blockchain.failover_urls {
        if failover.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new(
                "blockchain.failover_urls",
                format!("'{}' is not a valid URL", failover),
            ));
        }
    }
    if config.blockchain.chain_id == 0 {
        errors.push(ValidationError::new("blockchain.chain_id", "must be greater than zero"));
    }
    if config.blockchain.rpc_timeout_secs == 0 {
        errors.push(ValidationError::new("blockchain.rpc_timeout_secs", "must be greater than zero"));
    }

    if config.storage.data_dir.trim().is_empty() {
        errors.push(ValidationError::new("storage.data_dir", "must not be empty"));
    }

    if config.sources.request_timeout_secs == 0 {
        errors.push(ValidationError::new("sources.request_timeout_secs", "must be greater than zero"));
    }
    if let Some(candidate_url) = &config.sources.candidate_api_url {
        if candidate_url.parse::<url::Url>().is_err() {
            errors.push(ValidationError::new(
                "sources.candidate_api_url",
                format!("'{}' is not a valid URL", candidate_url),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
