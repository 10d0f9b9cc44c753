//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation issues, not just the first
//! - Validation is a pure function: ServerConfig → Result<(), Vec<ConfigIssue>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::schema::ServerConfig;

/// One semantic problem with a parsed configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    #[error("{field}: `{value}` is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("observability.log_level: `{0}` is not a valid filter directive")]
    InvalidLogLevel(String),
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ConfigIssue>> {
    let mut issues = Vec::new();

    check_address(&mut issues, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut issues,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.timeouts.request_secs == 0 {
        issues.push(ConfigIssue::Zero { field: "timeouts.request_secs" });
    }
    if config.limits.max_body_bytes == 0 {
        issues.push(ConfigIssue::Zero { field: "limits.max_body_bytes" });
    }

    if EnvFilter::try_new(&config.observability.log_level).is_err() {
        issues.push(ConfigIssue::InvalidLogLevel(config.observability.log_level.clone()));
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn check_address(issues: &mut Vec<ConfigIssue>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        issues.push(ConfigIssue::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
