// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Failures produced by the insights API client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("build HTTP client: {0}")]
    ClientBuild(String),

    #[error("cannot reach {base_url} -- check that the insights API is running ({reason})")]
    Transport { base_url: String, reason: String },

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("server returned {0}")]
    Status(u16),

    #[error("decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },
}

impl ApiError {
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Status(status) => Some(*status),
            _ => None,
        }
    }
}

/// Why a request-backed action did not produce data, as seen by a
/// view-model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Api(ApiError),
    Message(String),
    Unknown,
}

impl Failure {
    /// Human-readable text for the failure. Blank messages and unclassified
    /// failures fall back to `fallback`.
    pub fn describe(&self, fallback: &str) -> String {
        match self {
            Self::Api(error) => error.to_string(),
            Self::Message(message) if !message.trim().is_empty() => message.clone(),
            Self::Message(_) | Self::Unknown => fallback.to_owned(),
        }
    }
}

impl From<ApiError> for Failure {
    fn from(error: ApiError) -> Self {
        Self::Api(error)
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Self::Message(message.to_owned())
    }
}
