use crate::domain::models::Role;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid credentials")]
    AuthenticationFailure,
    #[error("{endpoint}: credential rejected by server")]
    Unauthorized { endpoint: String },
    #[error("{endpoint}: request failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint}: server responded {status}: {body}")]
    Server {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("{endpoint}: malformed response: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{required} dashboard requires a {required} login")]
    AccessDenied { required: Role },
    #[error("{0}")]
    Validation(String),
    #[error("feedback {0} is not on this dashboard")]
    UnknownFeedback(String),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("session file is corrupt: {0}")]
    SessionFormat(#[from] serde_json::Error),
}

impl ClientError {
    /// Everything other than a rejected login, a rejected credential or a local problem.
    pub fn is_network_or_server(&self) -> bool {
        matches!(
            self,
            ClientError::Transport { .. } | ClientError::Server { .. } | ClientError::Decode { .. }
        )
    }

    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            ClientError::AuthenticationFailure
                | ClientError::Unauthorized { .. }
                | ClientError::AccessDenied { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
