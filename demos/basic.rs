use std::time::Duration;

use fetch_http::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Bytes, CancellationToken, FetchClient, FetchError, RequestContext,
};

#[tokio::main]
async fn main() -> fetch_http::Result<()> {
    let url = std::env::var("FETCH_URL")
        .unwrap_or_else(|_| "https://httpbin.org/anything".to_owned());

    let client = FetchClient::builder()
        .default_header("Accept", "application/json")
        .default_header("User-Agent", "fetch-http-demo")
        .retry_schedule([Duration::from_millis(250), Duration::from_secs(1)])
        .build()?;

    let token = CancellationToken::new();
    let ctx = RequestContext::background()
        .with_cancellation(token.clone())
        .with_timeout(Duration::from_secs(20));

    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            token.cancel();
        }
    });

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let result = client
        .post_ctx(
            &ctx,
            &url,
            Some(Bytes::from_static(br#"{"hello":"world"}"#)),
            Some(&headers),
        )
        .await;
    ctrl_c.abort();

    match result {
        Ok(response) => {
            println!("status: {}", response.status());
            println!("{}", response.text().await.unwrap_or_default());
        }
        Err(FetchError::Api(err)) => eprintln!("API response error {err}"),
        Err(err) if err.is_context() => eprintln!("request aborted: {err}"),
        Err(err) => return Err(err),
    }

    Ok(())
}
