use std::env;
use std::io::Read;

use http::{Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use ureq::{Agent, AgentBuilder, OrAnyStatus, Proxy};

use crate::{MirroringError, Result};

const PROXY_VARS: [(&str, &str, &str); 3] = [
    ("ALL_PROXY", "all_proxy", "ALL"),
    ("HTTPS_PROXY", "https_proxy", "HTTPS"),
    ("HTTP_PROXY", "http_proxy", "HTTP"),
];

/// Send a request and collect the whole response, any status is returned as Ok.
#[instrument(skip(request), fields(method = %request.method(), uri = %request.uri()))]
pub async fn send<T>(request: Request<T>) -> Result<Response<Vec<u8>>>
where
    T: Into<Vec<u8>>,
{
    let (parts, body) = request.into_parts();
    let agent = configure_ureq_proxy(parts.uri.host())?;
    let mut ureq_request = agent.request(parts.method.as_str(), &parts.uri.to_string());
    for (name, value) in parts.headers.iter() {
        let value = value
            .to_str()
            .map_err(|e| MirroringError::Transport(format!("header {name}: {e}")))?;
        ureq_request = ureq_request.set(name.as_str(), value);
    }

    let body: Vec<u8> = body.into();
    let resp = ureq_request
        .send_bytes(&body)
        .or_any_status()
        .map_err(|e| MirroringError::Transport(e.to_string()))?;

    let status = resp.status();
    let len: usize = resp
        .header("Content-Length")
        .and_then(|hdr| hdr.parse().ok())
        .unwrap_or_default();
    let mut bytes: Vec<u8> = Vec::with_capacity(len);
    resp.into_reader()
        .read_to_end(&mut bytes)
        .map_err(|e| MirroringError::Transport(format!("reading body: {e}")))?;
    debug!(status, len = bytes.len(), "http response");

    Response::builder()
        .status(status)
        .body(bytes)
        .map_err(|e| MirroringError::Transport(format!("response format error {e}")))
}

/// Agent with a proxy, if one is defined in the environment.
/// Loopback hosts are always reached directly.
fn configure_ureq_proxy(host: Option<&str>) -> Result<Agent> {
    let agent_builder = AgentBuilder::new();
    if host.is_some_and(is_loopback) {
        return Ok(agent_builder.build());
    }

    for (upper_var, lower_var, proxy_type) in PROXY_VARS {
        if let Ok(proxy_str) = env::var(upper_var).or_else(|_| env::var(lower_var)) {
            let proxy = Proxy::new(&proxy_str).map_err(|e| {
                MirroringError::Transport(format!("Failed to create {proxy_type} proxy: {e}"))
            })?;
            return Ok(agent_builder.proxy(proxy).build());
        }
    }

    Ok(agent_builder.build())
}

fn is_loopback(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    host.eq_ignore_ascii_case("localhost")
        || host
            .parse::<std::net::IpAddr>()
            .is_ok_and(|ip| ip.is_loopback())
}

pub trait ResponseExt {
    fn json<T>(&self) -> Result<T>
    where
        T: DeserializeOwned;

    /// Err(Api) unless the status is 2xx
    fn error_for_status(self, url: &str) -> Result<Self>
    where
        Self: Sized;
}

impl ResponseExt for Response<Vec<u8>> {
    fn json<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let result = serde_json::from_slice(self.body())?;
        Ok(result)
    }

    fn error_for_status(self, url: &str) -> Result<Self> {
        let status = self.status();
        if status.is_success() {
            return Ok(self);
        }
        let message = api_error_message(status, self.body());
        Err(MirroringError::Api {
            url: url.to_owned(),
            status,
            message,
        })
    }
}

/// Prefer the first `errors[].message` of an API error body, fall back to the raw text.
fn api_error_message(status: StatusCode, body: &[u8]) -> String {
    #[derive(serde::Deserialize)]
    struct ApiErrorBody {
        #[serde(default)]
        errors: Vec<ApiErrorItem>,
        #[serde(default, rename = "errorMessage")]
        error_message: Option<String>,
        #[serde(default)]
        message: Option<String>,
    }

    #[derive(serde::Deserialize)]
    struct ApiErrorItem {
        message: String,
    }

    if let Ok(parsed) = serde_json::from_slice::<ApiErrorBody>(body) {
        if let Some(item) = parsed.errors.into_iter().next() {
            return item.message;
        }
        if let Some(msg) = parsed.error_message.or(parsed.message) {
            return msg;
        }
    }
    let text = String::from_utf8_lossy(body).trim().to_string();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        text
    }
}
