use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Request, Response};

use crate::{error::BoxError, FetchError, Result, TransportOptions};

/// Performs exactly one HTTP request.
///
/// Implemented for [`reqwest::Client`]; tests and custom stacks can supply
/// their own implementation through
/// [`ClientBuilder::transport`](crate::ClientBuilder::transport).
/// Errors are handed back to callers untouched inside
/// [`FetchError::Transport`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: Request) -> std::result::Result<Response, BoxError>;
}

#[async_trait]
impl Transport for reqwest::Client {
    async fn execute(&self, request: Request) -> std::result::Result<Response, BoxError> {
        reqwest::Client::execute(self, request)
            .await
            .map_err(Into::into)
    }
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn execute(&self, request: Request) -> std::result::Result<Response, BoxError> {
        (**self).execute(request).await
    }
}

/// Builds the default `reqwest` transport from `options`.
pub fn default_http_client(options: &TransportOptions) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(options.timeout)
        .connect_timeout(options.connect_timeout)
        .tcp_keepalive(options.tcp_keepalive)
        .pool_max_idle_per_host(options.pool_max_idle_per_host)
        .pool_idle_timeout(options.pool_idle_timeout)
        .build()
        .map_err(|err| FetchError::InvalidConfig(format!("failed to build HTTP transport: {err}")))
}

#[cfg(test)]
mod tests {
    use super::default_http_client;
    use crate::TransportOptions;

    #[test]
    fn default_transport_builds() {
        assert!(default_http_client(&TransportOptions::default()).is_ok());
    }
}
