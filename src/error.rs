use std::fmt;

use reqwest::{Response, StatusCode};

use crate::status::classify_status;

/// Boxed error produced by a [`Transport`](crate::Transport) implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a status that classifies as an error.
    #[error(transparent)]
    Api(ApiError),
    /// Network, DNS, TLS or timeout failure reported by the transport, unmodified.
    #[error("transport error: {0}")]
    Transport(BoxError),
    /// Retry mode was requested with an empty retry schedule.
    #[error("no valid retry strategy")]
    NoValidRetryStrategy,
    /// Client configuration rejected at construction time.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// The request could not be built (for example an unparsable URL).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// The request context was cancelled.
    #[error("request cancelled")]
    Cancelled,
    /// The request context deadline passed.
    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

impl FetchError {
    /// Returns the API error when the server answered with an error status.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the HTTP status code for API errors.
    pub fn status_code(&self) -> Option<u16> {
        self.api_error().map(|err| err.status_code)
    }

    pub fn is_api(&self) -> bool {
        matches!(self, Self::Api(_))
    }

    /// True for errors raised while validating client configuration.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::NoValidRetryStrategy | Self::InvalidConfig(_))
    }

    /// True when another attempt of the same request might succeed.
    ///
    /// Only API errors with a recoverable status qualify; transport,
    /// configuration and context errors are terminal.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Api(err) => classify_status(err.status_code).is_recoverable(),
            _ => false,
        }
    }

    /// True when the transport or the request context timed out.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::DeadlineExceeded => true,
            Self::Transport(err) => {
                if let Some(err) = err.downcast_ref::<reqwest::Error>() {
                    return err.is_timeout();
                }
                err.downcast_ref::<std::io::Error>()
                    .is_some_and(|err| err.kind() == std::io::ErrorKind::TimedOut)
            }
            _ => false,
        }
    }

    /// True when the transport failed to establish a connection.
    pub fn is_connect(&self) -> bool {
        let Self::Transport(err) = self else {
            return false;
        };
        if let Some(err) = err.downcast_ref::<reqwest::Error>() {
            return err.is_connect();
        }
        err.downcast_ref::<std::io::Error>().is_some_and(|err| {
            matches!(
                err.kind(),
                std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
            )
        })
    }

    /// True when the request context was cancelled or its deadline passed.
    pub fn is_context(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }
}

impl From<ApiError> for FetchError {
    fn from(err: ApiError) -> Self {
        Self::Api(err)
    }
}

/// An HTTP response whose status was classified as a failure.
///
/// The response itself is kept so callers can still read the body.
#[derive(thiserror::Error)]
#[error("{status_text}: [{status_code}]: {message}")]
pub struct ApiError {
    /// Numeric HTTP status code.
    pub status_code: u16,
    /// Canonical reason phrase, empty for unknown codes.
    pub status_text: String,
    /// Description of the failed request.
    pub message: String,
    response: Option<Response>,
}

impl ApiError {
    /// Creates an error for `status_code` without an attached response.
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            status_text: status_text(status_code),
            message: message.into(),
            response: None,
        }
    }

    pub(crate) fn from_response(response: Response, message: impl Into<String>) -> Self {
        let mut err = Self::new(response.status().as_u16(), message);
        err.response = Some(response);
        err
    }

    /// The response that produced this error, if any.
    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Takes ownership of the response, e.g. to read an error body.
    pub fn into_response(self) -> Option<Response> {
        self.response
    }
}

impl fmt::Debug for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiError")
            .field("status_code", &self.status_code)
            .field("status_text", &self.status_text)
            .field("message", &self.message)
            .field("has_response", &self.response.is_some())
            .finish()
    }
}

fn status_text(code: u16) -> String {
    StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or_default()
        .to_owned()
}
