//! Blocking HTTP transport.
//!
//! Implements [`HttpTransport`] for the uploader.
//!
//! - **`target_os = "espidf"`**: `EspHttpConnection` wrapped in the
//!   `embedded-svc` client, one connection per request.
//! - **all other targets**: `reqwest::blocking`, so a host build can post to
//!   a real InfluxDB.
//!
//! Any response with a status line is returned as `Ok`; classification is
//! the uploader's job.

use core::time::Duration;

use crate::app::ports::{HttpResponse, HttpTransport};
use crate::config::InfluxConfig;
use crate::error::TransportError;

/// Response bodies are only logged; keep at most this much.
pub const MAX_RESPONSE_BODY: usize = 512;

// ───────────────────────────────────────────────────────────────
// ESP-IDF
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub struct HttpClient {
    timeout: Duration,
}

#[cfg(target_os = "espidf")]
impl HttpClient {
    pub fn new(influx: &InfluxConfig) -> Result<Self, TransportError> {
        Ok(Self {
            timeout: Duration::from_millis(u64::from(influx.request_timeout_ms)),
        })
    }
}

#[cfg(target_os = "espidf")]
impl HttpTransport for HttpClient {
    fn post(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<HttpResponse, TransportError> {
        use embedded_svc::http::client::Client;
        use embedded_svc::http::{Method, Status};
        use embedded_svc::io::{Read, Write};
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let conf = Configuration {
            timeout: Some(self.timeout),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        };
        let conn = EspHttpConnection::new(&conf).map_err(|e| {
            log::warn!("HTTP connection setup failed: {:?}", e);
            TransportError::ConnectFailed
        })?;
        let mut client = Client::wrap(conn);

        let content_length = body.len().to_string();
        let mut all_headers: heapless::Vec<(&str, &str), 8> = heapless::Vec::new();
        for h in headers.iter().copied().chain([("Content-Length", content_length.as_str())]) {
            all_headers.push(h).map_err(|_| TransportError::InvalidRequest)?;
        }

        let mut request = client
            .request(Method::Post, url, &all_headers)
            .map_err(|e| {
                log::warn!("HTTP request failed: {:?}", e);
                TransportError::ConnectFailed
            })?;
        request.write_all(body).map_err(|_| TransportError::Io)?;
        request.flush().map_err(|_| TransportError::Io)?;
        let mut response = request.submit().map_err(|e| {
            log::warn!("HTTP submit failed: {:?}", e);
            TransportError::Timeout
        })?;

        let status = response.status();
        let mut buf = [0u8; MAX_RESPONSE_BODY];
        let mut len = 0;
        while len < buf.len() {
            match response.read(&mut buf[len..]) {
                Ok(0) | Err(_) => break,
                Ok(n) => len += n,
            }
        }
        Ok(HttpResponse {
            status,
            body: String::from_utf8_lossy(&buf[..len]).into_owned(),
        })
    }
}

// ───────────────────────────────────────────────────────────────
// Host
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
pub struct HttpClient {
    client: reqwest::blocking::Client,
}

#[cfg(not(target_os = "espidf"))]
impl HttpClient {
    pub fn new(influx: &InfluxConfig) -> Result<Self, TransportError> {
        let timeout = Duration::from_millis(u64::from(influx.request_timeout_ms));
        let client = reqwest::blocking::Client::builder()
            .no_proxy()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| {
                log::error!("HTTP client init failed: {}", e);
                TransportError::InvalidRequest
            })?;
        Ok(Self { client })
    }
}

#[cfg(not(target_os = "espidf"))]
fn classify(e: &reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else if e.is_connect() {
        TransportError::ConnectFailed
    } else if e.is_builder() {
        TransportError::InvalidRequest
    } else {
        TransportError::Io
    }
}

#[cfg(not(target_os = "espidf"))]
impl HttpTransport for HttpClient {
    fn post(
        &mut self,
        url: &str,
        headers: &[(&str, &str)],
        body: &[u8],
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self.client.post(url).body(body.to_vec());
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        let response = request.send().map_err(|e| {
            log::warn!("HTTP POST to {} failed: {}", url, e);
            classify(&e)
        })?;
        let status = response.status().as_u16();
        let mut text = response.text().unwrap_or_default();
        if text.len() > MAX_RESPONSE_BODY {
            let mut cut = MAX_RESPONSE_BODY;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }
        Ok(HttpResponse { status, body: text })
    }
}
