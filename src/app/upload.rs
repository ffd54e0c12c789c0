//! Uploader: POSTs a record to the InfluxDB write endpoint and classifies
//! the exchange into exactly three outcomes.
//!
//! | Exchange                         | Outcome            |
//! |----------------------------------|--------------------|
//! | status 204                       | `Accepted`         |
//! | any other status                 | `Rejected`         |
//! | no status line received          | `TransportFailed`  |

use log::{info, warn};

use crate::config::InfluxConfig;
use crate::error::TransportError;

use super::ports::HttpTransport;
use super::telemetry::TelemetryRecord;

/// The only status the write API returns on success.
pub const HTTP_NO_CONTENT: u16 = 204;

/// Classified result of one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Accepted,
    Rejected { status: u16, body: String },
    TransportFailed(TransportError),
}

/// What the controller needs from an uploader.
pub trait UploadPort {
    fn upload(&mut self, record: &TelemetryRecord) -> UploadOutcome;
}

/// InfluxDB v2 uploader over any [`HttpTransport`].
pub struct InfluxUploader<T> {
    transport: T,
    url: String,
    authorization: String,
}

impl<T: HttpTransport> InfluxUploader<T> {
    pub fn new(transport: T, influx: &InfluxConfig) -> Self {
        Self {
            transport,
            url: influx.url.clone(),
            authorization: format!("Token {}", influx.token),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: HttpTransport> UploadPort for InfluxUploader<T> {
    fn upload(&mut self, record: &TelemetryRecord) -> UploadOutcome {
        info!("Sending data to InfluxDB...");
        let headers = [
            ("Authorization", self.authorization.as_str()),
            ("Content-Type", "text/plain; charset=utf-8"),
            ("Accept", "application/json"),
        ];
        match self.transport.post(&self.url, &headers, record.as_bytes()) {
            Ok(resp) if resp.status == HTTP_NO_CONTENT => {
                info!("Data successfully sent to InfluxDB.");
                UploadOutcome::Accepted
            }
            Ok(resp) => {
                warn!("Failed to send data: {} - {}", resp.status, resp.body);
                UploadOutcome::Rejected {
                    status: resp.status,
                    body: resp.body,
                }
            }
            Err(e) => {
                warn!("Failed to send data: {}", e);
                UploadOutcome::TransportFailed(e)
            }
        }
    }
}
