use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use reqwest::{header, Client, Method, Response};

use crate::logging;

pub mod element;

/// A singleton instance of the reqwest client.
static CLIENT: OnceCell<Client> = OnceCell::new();

/// Returns the reqwest client singleton instance or creates one if it doesn't exist.
///
/// The user agent is only taken into account by the first call.
fn get_client(user_agent: &str) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            // ===== 壓縮 =====
            .brotli(true)
            .gzip(true)
            .zstd(true)
            // ===== 超時設置 =====
            .connect_timeout(Duration::from_secs(8))
            .timeout(Duration::from_secs(15))
            .tcp_nodelay(true)
            // ===== Cookie 和重定向 =====
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::limited(5))
            // ===== Headers =====
            .referer(true)
            .user_agent(user_agent)
            .build()
            .map_err(|e| anyhow!("Failed to create reqwest client: {:?}", e))
    })
}

/// Performs an HTTP GET request and returns the response as text.
///
/// # Arguments
///
/// * `url`: The URL to send the GET request to.
/// * `user_agent`: The `User-Agent` the shared client is built with.
///
/// # Returns
///
/// * `Result<String>`: The response text, or an error if the request fails, the server
///   answers with a non-success status or the body cannot be read.
pub async fn get(url: &str, user_agent: &str) -> Result<String> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("text/html,application/xhtml+xml"),
    );

    send(Method::GET, url, user_agent, headers)
        .await?
        .text()
        .await
        .map_err(|e| anyhow!("Error parsing response text: {:?}", e))
}

/// Sends a single request. There is no retry; the caller decides what a failure means.
async fn send(
    method: Method,
    url: &str,
    user_agent: &str,
    headers: header::HeaderMap,
) -> Result<Response> {
    let visit_log = format!("{method}:{url}");
    let client = get_client(user_agent)?;
    let start = Instant::now();
    let res = client.request(method, url).headers(headers).send().await;
    let elapsed = start.elapsed().as_millis();

    match res {
        Ok(response) => {
            let status = response.status();
            if !status.is_success() {
                logging::error_file_async(format!("{} {} {} ms", visit_log, status, elapsed));
                return Err(anyhow!("{} answered with {}", url, status));
            }

            logging::info_file_async(format!("{} {} {} ms", visit_log, status, elapsed));
            Ok(response)
        }
        Err(why) => {
            logging::error_file_async(format!(
                "{} failed because {:?}. {} ms",
                visit_log, why, elapsed
            ));
            Err(anyhow!("Failed to send request to {} because {:?}", url, why))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    #[tokio::test]
    #[ignore]
    async fn test_get() {
        dotenv::dotenv().ok();
        let _ = rustls::crypto::ring::default_provider().install_default();
        let source = config::Source::default();
        match get(&source.url, &source.user_agent).await {
            Ok(text) => {
                logging::debug_file_async(format!("get: {} bytes", text.len()));
            }
            Err(why) => {
                logging::error_file_async(format!("Failed to get because {:?}", why));
            }
        }
    }
}
