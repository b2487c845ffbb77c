use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::{header::HeaderMap, Body, Method, Request, Response, Url};
use tokio::time::sleep;

use crate::{
    headers::merge_headers, status::classify_status, ApiError, ClientBuilder, ClientOptions,
    FetchError, RequestContext, Result, RetrySchedule, Transport,
};

/// HTTP client with default headers and an optional retry schedule.
///
/// Cloning is cheap and clones share the transport. The configuration is
/// read-only, so one client can serve concurrent callers.
#[derive(Clone)]
pub struct FetchClient {
    transport: Arc<dyn Transport>,
    retry: Option<RetrySchedule>,
    default_headers: HeaderMap,
}

impl fmt::Debug for FetchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self
            .default_headers
            .keys()
            .map(|name| name.as_str())
            .collect();
        f.debug_struct("FetchClient")
            .field("retry", &self.retry)
            .field("default_headers", &header_names)
            .finish_non_exhaustive()
    }
}

impl FetchClient {
    /// Creates a client with the canonical retry schedule (1s, 3s, 5s, 10s),
    /// no default headers and the default `reqwest` transport.
    pub fn new() -> Result<Self> {
        ClientBuilder::new().build()
    }

    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client from plain options with the default transport.
    pub fn with_options(options: ClientOptions) -> Result<Self> {
        ClientBuilder::new().options(options).build()
    }

    pub(crate) fn from_parts(
        transport: Arc<dyn Transport>,
        retry: Option<RetrySchedule>,
        default_headers: HeaderMap,
    ) -> Self {
        Self {
            transport,
            retry,
            default_headers,
        }
    }

    /// The retry schedule, or `None` when every request is sent once.
    pub fn retry_schedule(&self) -> Option<&RetrySchedule> {
        self.retry.as_ref()
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    /// Sends a GET request.
    ///
    /// Error statuses surface as [`FetchError::Api`]; network failures as
    /// [`FetchError::Transport`].
    ///
    /// ```no_run
    /// use fetch_http::{FetchClient, FetchError};
    ///
    /// # async fn run() -> fetch_http::Result<()> {
    /// let client = FetchClient::new()?;
    /// match client.get("https://example.com/items", None).await {
    ///     Ok(response) => println!("{}", response.text().await.unwrap_or_default()),
    ///     Err(FetchError::Api(err)) => eprintln!("API response error {err}"),
    ///     Err(err) => eprintln!("client error {err}"),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get(&self, url: &str, headers: Option<&HeaderMap>) -> Result<Response> {
        self.get_ctx(&RequestContext::background(), url, headers)
            .await
    }

    pub async fn post(
        &self,
        url: &str,
        body: Option<Bytes>,
        headers: Option<&HeaderMap>,
    ) -> Result<Response> {
        self.post_ctx(&RequestContext::background(), url, body, headers)
            .await
    }

    pub async fn put(
        &self,
        url: &str,
        body: Option<Bytes>,
        headers: Option<&HeaderMap>,
    ) -> Result<Response> {
        self.put_ctx(&RequestContext::background(), url, body, headers)
            .await
    }

    pub async fn patch(
        &self,
        url: &str,
        body: Option<Bytes>,
        headers: Option<&HeaderMap>,
    ) -> Result<Response> {
        self.patch_ctx(&RequestContext::background(), url, body, headers)
            .await
    }

    pub async fn delete(
        &self,
        url: &str,
        body: Option<Bytes>,
        headers: Option<&HeaderMap>,
    ) -> Result<Response> {
        self.delete_ctx(&RequestContext::background(), url, body, headers)
            .await
    }

    /// Sends a GET request bound to `ctx`.
    ///
    /// Cancellation and deadlines surface as [`FetchError::Cancelled`] and
    /// [`FetchError::DeadlineExceeded`], also while waiting between retries.
    pub async fn get_ctx(
        &self,
        ctx: &RequestContext,
        url: &str,
        headers: Option<&HeaderMap>,
    ) -> Result<Response> {
        self.send(ctx, Method::GET, url, None, headers).await
    }

    pub async fn post_ctx(
        &self,
        ctx: &RequestContext,
        url: &str,
        body: Option<Bytes>,
        headers: Option<&HeaderMap>,
    ) -> Result<Response> {
        self.send(ctx, Method::POST, url, body, headers).await
    }

    pub async fn put_ctx(
        &self,
        ctx: &RequestContext,
        url: &str,
        body: Option<Bytes>,
        headers: Option<&HeaderMap>,
    ) -> Result<Response> {
        self.send(ctx, Method::PUT, url, body, headers).await
    }

    pub async fn patch_ctx(
        &self,
        ctx: &RequestContext,
        url: &str,
        body: Option<Bytes>,
        headers: Option<&HeaderMap>,
    ) -> Result<Response> {
        self.send(ctx, Method::PATCH, url, body, headers).await
    }

    pub async fn delete_ctx(
        &self,
        ctx: &RequestContext,
        url: &str,
        body: Option<Bytes>,
        headers: Option<&HeaderMap>,
    ) -> Result<Response> {
        self.send(ctx, Method::DELETE, url, body, headers).await
    }

    /// Sends a request with any method, applying default headers and the
    /// retry schedule. Per-call headers override default headers.
    pub async fn send(
        &self,
        ctx: &RequestContext,
        method: Method,
        url: &str,
        body: Option<Bytes>,
        headers: Option<&HeaderMap>,
    ) -> Result<Response> {
        let sources = [Some(&self.default_headers), headers];
        match &self.retry {
            None => self.call(ctx, &method, url, body.as_ref(), &sources).await,
            Some(schedule) => {
                self.call_with_retry(ctx, schedule, &method, url, body.as_ref(), &sources)
                    .await
            }
        }
    }

    /// Attempts the request once per schedule entry while failures are
    /// recoverable. Waits `schedule[i]` after failed attempt `i` when another
    /// attempt follows.
    async fn call_with_retry(
        &self,
        ctx: &RequestContext,
        schedule: &RetrySchedule,
        method: &Method,
        url: &str,
        body: Option<&Bytes>,
        headers: &[Option<&HeaderMap>],
    ) -> Result<Response> {
        if schedule.is_empty() {
            return Err(FetchError::NoValidRetryStrategy);
        }

        let attempts = schedule.len();
        let mut attempt = 0;

        loop {
            attempt += 1;
            ctx.check().map_err(|err| {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "{} {}: request canceled before attempt {}/{}: {}",
                    method,
                    url,
                    attempt,
                    attempts,
                    err
                );
                err
            })?;

            let err = match self.call(ctx, method, url, body, headers).await {
                Ok(response) => return Ok(response),
                Err(err) => err,
            };

            if !err.is_recoverable() {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "{} {}: attempt {}/{} failed with terminal error: {}",
                    method,
                    url,
                    attempt,
                    attempts,
                    err
                );
                return Err(err);
            }

            if attempt == attempts {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    "{} {}: giving up after {} attempts: {}",
                    method,
                    url,
                    attempts,
                    err
                );
                return Err(err);
            }

            let wait = schedule[attempt - 1];
            #[cfg(feature = "tracing")]
            tracing::debug!(
                "{} {}: attempt {}/{} failed ({}), retrying in {:?}",
                method,
                url,
                attempt,
                attempts,
                err,
                wait
            );

            // Dropping the failed response releases its connection before the wait.
            drop(err);
            ctx.run(sleep(wait)).await.map_err(|err| {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    "{} {}: request canceled while waiting to retry: {}",
                    method,
                    url,
                    err
                );
                err
            })?;
        }
    }

    /// Sends the request exactly once and classifies the response status.
    async fn call(
        &self,
        ctx: &RequestContext,
        method: &Method,
        url: &str,
        body: Option<&Bytes>,
        headers: &[Option<&HeaderMap>],
    ) -> Result<Response> {
        let request = build_request(
            method.clone(),
            url,
            body.cloned(),
            merge_headers(headers.iter().copied()),
        )?;

        let response = ctx
            .run(self.transport.execute(request))
            .await?
            .map_err(FetchError::Transport)?;

        let status = response.status().as_u16();
        if classify_status(status).is_success() {
            return Ok(response);
        }

        Err(FetchError::Api(ApiError::from_response(
            response,
            format!("{method} {url}"),
        )))
    }
}

fn build_request(
    method: Method,
    url: &str,
    body: Option<Bytes>,
    headers: HeaderMap,
) -> Result<Request> {
    let parsed = Url::parse(url)
        .map_err(|err| FetchError::InvalidRequest(format!("invalid url '{url}': {err}")))?;

    let mut request = Request::new(method, parsed);
    *request.headers_mut() = headers;
    if let Some(body) = body {
        *request.body_mut() = Some(Body::from(body));
    }
    Ok(request)
}
