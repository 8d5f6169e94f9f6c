use std::time::Duration;

use marketdesk_core::DeskError;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Read a provider API key from the environment.
pub(crate) fn env_key(var: &'static str) -> Result<String, DeskError> {
    std::env::var(var)
        .map_err(|_| DeskError::InvalidArg(format!("missing environment variable {var}")))
}

/// Build a client with the provider's per-request timeout.
pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client, DeskError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| DeskError::InvalidArg(format!("http client: {e}")))
}

/// GET a JSON document with bounded retries.
///
/// 429 maps to the dedicated rate-limit error immediately (retrying a
/// throttled provider only digs the hole deeper); 5xx and transport errors
/// are retried up to `retries` extra attempts; any other non-2xx fails at
/// once. The URL carries the API key, so it is never logged.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    provider: &'static str,
    url: Url,
    retries: u32,
) -> Result<T, DeskError> {
    let mut attempt = 0;
    loop {
        match client.get(url.clone()).send().await {
            Ok(resp) => {
                let status = resp.status();
                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(DeskError::rate_limited(provider));
                }
                if status.is_server_error() && attempt < retries {
                    attempt += 1;
                    debug!(provider, attempt, status = status.as_u16(), "retrying upstream error");
                    continue;
                }
                if !status.is_success() {
                    return Err(DeskError::provider(provider, format!("HTTP {status}")));
                }
                return resp
                    .json::<T>()
                    .await
                    .map_err(|e| DeskError::Data(format!("{provider}: {e}")));
            }
            Err(_) if attempt < retries => {
                attempt += 1;
                debug!(provider, attempt, "retrying transport error");
            }
            Err(e) => return Err(DeskError::provider(provider, e.to_string())),
        }
    }
}

/// Compose `{base}/{path}?{params...}` plus the provider's key parameter.
pub(crate) fn make_url(
    base: &str,
    path: &str,
    params: &[(&str, &str)],
    key_param: (&str, &str),
) -> Result<Url, DeskError> {
    let mut url = Url::parse(&format!("{}/{path}", base.trim_end_matches('/')))
        .map_err(|e| DeskError::InvalidArg(format!("bad url: {e}")))?;
    {
        let mut q = url.query_pairs_mut();
        for (k, v) in params {
            q.append_pair(k, v);
        }
        q.append_pair(key_param.0, key_param.1);
    }
    Ok(url)
}
