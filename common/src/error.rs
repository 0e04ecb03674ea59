use std::net::AddrParseError;

use thiserror::Error;

/// Errors that make a run impossible before any probe is started.
///
/// These are never retried and never counted in a report; the run aborts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("source cidr '{0}' has no prefix length")]
    MissingPrefix(String),

    #[error("invalid address in cidr '{cidr}': {source}")]
    InvalidAddress {
        cidr: String,
        #[source]
        source: AddrParseError,
    },

    #[error("invalid prefix length in cidr '{0}'")]
    InvalidPrefix(String),

    #[error("cannot resolve target address '{target}': {reason}")]
    UnresolvableTarget { target: String, reason: String },

    #[error("max concurrent connects must be at least 1")]
    ZeroConcurrency,
}
