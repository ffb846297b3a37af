// Error types returned by `ApiClient`. None of them are retried by the
// client: every failure goes straight back to the caller.

use reqwest::Method;
use thiserror::Error;

/// Result alias used by the client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Failure of a single MLCave call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP transport could not be set up (TLS backend init).
    #[error("init http client: {source}")]
    Init {
        #[source]
        source: reqwest::Error,
    },

    /// The method/URI/headers could not be turned into a request.
    #[error("create http {method} request, uri: {uri}, err: {source}")]
    RequestBuild {
        method: Method,
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request went out but no response came back.
    #[error("send http {method} error, request: {request}. Error: {source}")]
    Transport {
        method: Method,
        request: String,
        #[source]
        source: reqwest::Error,
    },

    /// A response arrived with a status other than 200.
    #[error("received http status code: {status} for service group: {service_group}")]
    UnexpectedStatus { status: u16, service_group: String },

    /// Status was 200 but the body could not be read to the end.
    #[error("read response body for service group: {service_group}: {source}")]
    ReadBody {
        service_group: String,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    /// HTTP status of an `UnexpectedStatus` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
