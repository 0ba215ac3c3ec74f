use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a reqwest client with sane defaults (connect timeout plus an
/// overall per-request wait budget). One attempt per invocation; there is
/// no retry layer.
pub fn make_http_client() -> reqwest::Client {
    make_http_client_with(DEFAULT_TIMEOUT)
}

pub fn make_http_client_with(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(2))
        .timeout(timeout)
        .build()
        .expect("reqwest client")
}
