//! HTTP collector adapter.
//!
//! Implements [`CollectorPort`]: one synchronous `POST` of a JSON body to
//! the configured endpoint, bounded by the HTTP timeout.  Any status code
//! is returned to the caller; only transport problems are errors.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::http::client::EspHttpConnection`
//!   (http and https, certificate bundle for the latter).
//! - **all other targets**: `reqwest::blocking` (http only), used by host
//!   tests against a local listener.

use log::debug;
use url::Url;

use crate::app::ports::{CollectorPort, CollectorResponse, RESPONSE_BODY_CAP};
use crate::error::CommsError;

/// Parse a collector endpoint.  Only `http` and `https` URLs with a
/// non-empty host and a non-zero port are accepted.
pub fn parse_endpoint(raw: &str) -> Result<Url, CommsError> {
    let url = Url::parse(raw).map_err(|_| CommsError::InvalidUrl)?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CommsError::InvalidUrl);
    }
    if url.host_str().is_none_or(str::is_empty) || url.port() == Some(0) {
        return Err(CommsError::InvalidUrl);
    }
    Ok(url)
}

/// Copy at most [`RESPONSE_BODY_CAP`] bytes of a reply body.
fn capped_body(bytes: &[u8]) -> heapless::Vec<u8, RESPONSE_BODY_CAP> {
    let mut body = heapless::Vec::new();
    let _ = body.extend_from_slice(&bytes[..bytes.len().min(RESPONSE_BODY_CAP)]);
    body
}

#[cfg(not(target_os = "espidf"))]
fn transport_error(e: &reqwest::Error) -> CommsError {
    if e.is_timeout() {
        CommsError::HttpTimeout
    } else if e.is_connect() {
        CommsError::HttpConnectFailed
    } else if e.is_builder() {
        CommsError::InvalidUrl
    } else {
        CommsError::HttpIo
    }
}

pub struct HttpCollector {
    endpoint: Url,
    #[cfg(target_os = "espidf")]
    timeout_ms: u32,
    #[cfg(not(target_os = "espidf"))]
    client: reqwest::blocking::Client,
}

impl HttpCollector {
    #[cfg(target_os = "espidf")]
    pub fn new(url: &str, timeout_ms: u32) -> Result<Self, CommsError> {
        Ok(Self {
            endpoint: parse_endpoint(url)?,
            timeout_ms,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(url: &str, timeout_ms: u32) -> Result<Self, CommsError> {
        let endpoint = parse_endpoint(url)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_millis(u64::from(timeout_ms.max(1))))
            .build()
            .map_err(|e| transport_error(&e))?;
        Ok(Self { endpoint, client })
    }

    pub fn url(&self) -> &str {
        self.endpoint.as_str()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[cfg(target_os = "espidf")]
    fn platform_post(&mut self, body: &[u8]) -> Result<CollectorResponse, CommsError> {
        use core::time::Duration;
        use esp_idf_svc::http::Method;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let secure = self.endpoint.scheme() == "https";
        let config = Configuration {
            timeout: Some(Duration::from_millis(u64::from(self.timeout_ms))),
            use_global_ca_store: secure,
            crt_bundle_attach: if secure {
                Some(esp_idf_svc::sys::esp_crt_bundle_attach)
            } else {
                None
            },
            ..Default::default()
        };
        let mut conn = EspHttpConnection::new(&config).map_err(|_| CommsError::HttpConnectFailed)?;

        let mut len = heapless::String::<10>::new();
        core::fmt::Write::write_fmt(&mut len, format_args!("{}", body.len())).map_err(|_| CommsError::HttpIo)?;
        let headers = [("Content-Type", "application/json"), ("Content-Length", len.as_str())];
        conn.initiate_request(Method::Post, self.endpoint.as_str(), &headers)
            .map_err(|_| CommsError::HttpConnectFailed)?;

        let mut written = 0;
        while written < body.len() {
            let n = conn.write(&body[written..]).map_err(|_| CommsError::HttpIo)?;
            if n == 0 {
                return Err(CommsError::HttpIo);
            }
            written += n;
        }

        conn.initiate_response().map_err(|_| CommsError::HttpTimeout)?;
        let status = conn.status();

        let mut buf = [0u8; RESPONSE_BODY_CAP];
        let mut filled = 0;
        while filled < buf.len() {
            match conn.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(_) => return Err(CommsError::HttpIo),
            }
        }
        Ok(CollectorResponse {
            status,
            body: capped_body(&buf[..filled]),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_post(&mut self, body: &[u8]) -> Result<CollectorResponse, CommsError> {
        let resp = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .send()
            .map_err(|e| transport_error(&e))?;

        let status = resp.status().as_u16();
        let bytes = resp.bytes().map_err(|e| transport_error(&e))?;
        Ok(CollectorResponse {
            status,
            body: capped_body(&bytes),
        })
    }
}

impl CollectorPort for HttpCollector {
    fn post_json(&mut self, body: &[u8]) -> Result<CollectorResponse, CommsError> {
        debug!("HTTP: POST {} ({} bytes)", self.endpoint, body.len());
        let resp = self.platform_post(body)?;
        debug!("HTTP: {} ({} body bytes)", resp.status, resp.body.len());
        Ok(resp)
    }
}
