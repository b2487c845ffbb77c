//! `fetch-http` is an async HTTP request helper built on `reqwest`.
//!
//! It adds three things on top of the transport:
//! - default headers merged with per-call headers ([`merge_headers`])
//! - a bounded retry loop driven by a [`RetrySchedule`]
//! - status classification into success, recoverable and terminal failures
//!   ([`classify_status`]), surfaced as [`FetchError`] variants
//!
//! ```no_run
//! use fetch_http::{FetchClient, FetchError};
//!
//! # async fn run() -> fetch_http::Result<()> {
//! let client = FetchClient::builder()
//!     .default_header("Accept", "application/json")
//!     .build()?;
//!
//! match client.get("https://icanhazdadjoke.com/", None).await {
//!     Ok(response) => println!("{}", response.status()),
//!     Err(FetchError::Api(err)) => eprintln!("API response error {err}"),
//!     Err(err) => eprintln!("client error {err}"),
//! }
//! # Ok(())
//! # }
//! ```

mod builder;
mod client;
mod context;
mod error;
mod headers;
mod options;
mod status;
mod transport;

pub use builder::ClientBuilder;
pub use client::FetchClient;
pub use context::RequestContext;
pub use error::{ApiError, BoxError, FetchError};
pub use headers::merge_headers;
pub use options::{ClientOptions, RetrySchedule, TransportOptions};
pub use status::{classify_status, StatusClass};
pub use transport::{default_http_client, Transport};

pub use bytes::Bytes;
pub use reqwest::{header, Method, Response};
pub use tokio_util::sync::CancellationToken;

pub type Result<T> = std::result::Result<T, FetchError>;
