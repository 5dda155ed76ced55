//! Outbound HTTP clients.
//!
//! Every external call goes through a client with an explicit timeout. reqwest does not
//! retry on its own and nothing here adds retries: a failed call fails the request.
use std::time::Duration;

pub fn build(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}
