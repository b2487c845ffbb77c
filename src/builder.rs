use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::{
    client::FetchClient, transport::default_http_client, ClientOptions, FetchError, Result,
    RetrySchedule, Transport, TransportOptions,
};

/// Builder for [`FetchClient`].
///
/// Everything is validated in [`ClientBuilder::build`]; nothing panics.
///
/// ```no_run
/// use std::time::Duration;
/// use fetch_http::FetchClient;
///
/// # fn build() -> fetch_http::Result<FetchClient> {
/// FetchClient::builder()
///     .default_header("Accept", "application/json")
///     .retry_schedule([Duration::from_millis(200), Duration::from_secs(1)])
///     .build()
/// # }
/// ```
#[derive(Default)]
pub struct ClientBuilder {
    options: ClientOptions,
    transport: Option<Arc<dyn Transport>>,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("options", &self.options)
            .field("custom_transport", &self.transport.is_some())
            .finish()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all options collected so far.
    pub fn options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Enables or disables the canonical retry schedule.
    pub fn with_retry(mut self, enabled: bool) -> Self {
        self.options.with_retry = enabled;
        self
    }

    /// Sets a custom retry schedule and enables retries.
    pub fn retry_schedule(mut self, schedule: impl Into<RetrySchedule>) -> Self {
        self.options.with_retry = true;
        self.options.retry_schedule = Some(schedule.into());
        self
    }

    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options
            .default_headers
            .push((name.into(), value.into()));
        self
    }

    pub fn default_headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self = self.default_header(name, value);
        }
        self
    }

    /// Tunes the default transport. Ignored when a custom transport is set.
    pub fn transport_options(mut self, transport: TransportOptions) -> Self {
        self.options.transport = transport;
        self
    }

    /// Uses `transport` instead of the default `reqwest` client.
    pub fn transport<T>(mut self, transport: T) -> Self
    where
        T: Transport + 'static,
    {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Uses a preconfigured `reqwest` client as transport.
    pub fn http_client(self, client: reqwest::Client) -> Self {
        self.transport(client)
    }

    pub fn build(self) -> Result<FetchClient> {
        let retry = self.options.resolved_retry_schedule();
        if retry.as_ref().is_some_and(|schedule| schedule.is_empty()) {
            return Err(FetchError::NoValidRetryStrategy);
        }

        let default_headers = header_map(&self.options)?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(default_http_client(&self.options.transport)?),
        };

        Ok(FetchClient::from_parts(transport, retry, default_headers))
    }
}

fn header_map(options: &ClientOptions) -> Result<HeaderMap> {
    let mut headers = HeaderMap::with_capacity(options.default_headers.len());
    for (name, value) in &options.default_headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| FetchError::InvalidConfig(format!("header name '{name}': {err}")))?;
        let header_value = HeaderValue::from_str(value)
            .map_err(|err| FetchError::InvalidConfig(format!("header '{name}' value: {err}")))?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::ClientBuilder;
    use crate::{ClientOptions, FetchError, RetrySchedule};

    #[test]
    fn defaults_use_canonical_schedule_and_no_headers() {
        let client = ClientBuilder::new().build().expect("default client must build");
        assert_eq!(client.retry_schedule(), Some(&RetrySchedule::canonical()));
        assert!(client.default_headers().is_empty());
    }

    #[test]
    fn retry_can_be_disabled() {
        let client = ClientBuilder::new()
            .with_retry(false)
            .build()
            .expect("client must build");
        assert!(client.retry_schedule().is_none());
    }

    #[test]
    fn custom_schedule_enables_retry() {
        let client = ClientBuilder::new()
            .with_retry(false)
            .retry_schedule([Duration::from_millis(1), Duration::from_millis(2)])
            .build()
            .expect("client must build");
        assert_eq!(
            client.retry_schedule().map(|schedule| schedule.len()),
            Some(2)
        );
    }

    #[test]
    fn empty_schedule_is_rejected_eagerly() {
        let err = ClientBuilder::new()
            .retry_schedule(Vec::<Duration>::new())
            .build()
            .expect_err("empty schedule must be rejected");
        assert!(matches!(err, FetchError::NoValidRetryStrategy));
    }

    #[test]
    fn default_headers_are_validated() {
        let err = ClientBuilder::new()
            .default_header("bad header", "value")
            .build()
            .expect_err("invalid header name must be rejected");
        assert!(matches!(err, FetchError::InvalidConfig(_)));

        let err = ClientBuilder::new()
            .default_header("x-ok", "line\nbreak")
            .build()
            .expect_err("invalid header value must be rejected");
        assert!(err.is_config());
    }

    #[test]
    fn default_headers_are_normalised() {
        let client = ClientBuilder::new()
            .default_headers([("Accept", "application/json"), ("X-Client", "fetch")])
            .build()
            .expect("client must build");
        let headers = client.default_headers();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["accept"], "application/json");
        assert_eq!(headers["x-client"], "fetch");
    }

    #[test]
    fn later_default_header_wins_regardless_of_case() {
        let client = ClientBuilder::new()
            .default_header("accept", "first")
            .default_header("Accept", "second")
            .build()
            .expect("client must build");
        let values: Vec<&str> = client
            .default_headers()
            .get_all("accept")
            .iter()
            .map(|value| value.to_str().expect("header value must be ascii"))
            .collect();
        assert_eq!(values, vec!["second"]);
    }

    #[test]
    fn options_are_applied() {
        let options = ClientOptions {
            with_retry: false,
            ..ClientOptions::default()
        };
        let client = ClientBuilder::new()
            .options(options)
            .build()
            .expect("client must build");
        assert!(client.retry_schedule().is_none());
    }
}
