//! HTTP client speaking the NETIO M2M JSON protocol
//!
//! The only component that talks to the device. One blocking HTTP round
//! trip per logical operation, HTTP Basic auth attached per request, no
//! session state and no retries. A `NetioClient` exclusively owns its
//! underlying connection pool and is not meant to be shared across
//! concurrent callers.

use std::fs;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use netio_core::api::{ControlRequest, DeviceReport};
use netio_core::{Action, AgentInfo, GlobalMeasure, NetioError, Output, Result};

use crate::config::{ResolvedConfig, TlsPolicy};

/// Blocking client for one NETIO device.
#[derive(Debug, Clone)]
pub struct NetioClient {
    http: Client,
    endpoint: Url,
    user: String,
    password: String,
}

impl NetioClient {
    /// Build a client from a resolved configuration.
    ///
    /// Applies the TLS trust policy and the fixed request timeout; no
    /// network I/O happens until the first operation.
    pub fn new(config: &ResolvedConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("netioctl/", env!("CARGO_PKG_VERSION")));

        match &config.tls {
            TlsPolicy::System => {}
            TlsPolicy::CaBundle(path) => {
                let pem = fs::read(path).map_err(|e| {
                    NetioError::Config(format!(
                        "cannot read certificate bundle {}: {e}",
                        path.display()
                    ))
                })?;
                let cert = reqwest::Certificate::from_pem(&pem).map_err(|e| {
                    NetioError::Config(format!(
                        "invalid certificate bundle {}: {e}",
                        path.display()
                    ))
                })?;
                builder = builder.add_root_certificate(cert);
            }
            TlsPolicy::Insecure => {
                if !config.suppress_cert_warning {
                    warn!("TLS certificate verification is disabled");
                }
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        let http = builder
            .build()
            .map_err(|e| NetioError::Transport(format!("cannot build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.url.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    /// The configured device endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Fetch all outputs in device-reported order. One GET.
    pub fn get_outputs(&self) -> Result<Vec<Output>> {
        let report = self.fetch_report()?;
        decode_outputs(report)
    }

    /// Fetch the outputs with the given IDs, in the requested order.
    ///
    /// Filtering happens client-side: the protocol's read request does
    /// not support server-side selection by ID. An ID absent from the
    /// response fails with [`NetioError::OutputNotFound`].
    pub fn get_outputs_filtered(&self, ids: &[u32]) -> Result<Vec<Output>> {
        let outputs = self.get_outputs()?;
        pick(&outputs, ids.iter().copied())
    }

    /// Fetch a single output by ID.
    pub fn get_output(&self, id: u32) -> Result<Output> {
        let mut outputs = self.get_outputs_filtered(&[id])?;
        Ok(outputs.remove(0))
    }

    /// Apply actions to several outputs in one batched write request.
    ///
    /// The device applies the entries in array order with no inter-item
    /// delay; the batch is all-or-nothing only at the HTTP-request level.
    /// Returns the post-change snapshots the device echoes for exactly
    /// the requested IDs; an ID missing from the echo fails with
    /// [`NetioError::OutputNotFound`].
    pub fn set_outputs(&self, changes: &[(u32, Action)]) -> Result<Vec<Output>> {
        if changes.is_empty() {
            return Err(NetioError::Usage(
                "at least one (ID, ACTION) pair is required".to_string(),
            ));
        }

        debug!(count = changes.len(), "issuing batched output control");

        let body = ControlRequest::from(changes);
        let response = self
            .http
            .post(self.endpoint.clone())
            .basic_auth(&self.user, Some(&self.password))
            .json(&body)
            .send()
            .map_err(transport_error)?;

        let report = decode_response(response)?;
        let outputs = decode_outputs(report)?;
        pick(&outputs, changes.iter().map(|(id, _)| *id))
    }

    /// Apply one action to one output.
    pub fn set_output(&self, id: u32, action: Action) -> Result<Output> {
        let mut outputs = self.set_outputs(&[(id, action)])?;
        Ok(outputs.remove(0))
    }

    /// Fetch the device identity and aggregate measurements. One GET.
    pub fn get_info(&self) -> Result<(AgentInfo, GlobalMeasure)> {
        let report = self.fetch_report()?;
        Ok((report.agent.into(), report.global_measure.into()))
    }

    fn fetch_report(&self) -> Result<DeviceReport> {
        debug!(endpoint = %self.endpoint, "fetching device report");

        let response = self
            .http
            .get(self.endpoint.clone())
            .basic_auth(&self.user, Some(&self.password))
            .send()
            .map_err(transport_error)?;

        decode_response(response)
    }
}

/// Map a non-2xx status or a schema mismatch to a protocol error.
fn decode_response(response: Response) -> Result<DeviceReport> {
    let status = response.status();
    let text = response.text().map_err(transport_error)?;

    if !status.is_success() {
        let message = match status {
            StatusCode::BAD_REQUEST => "control command syntax error".to_string(),
            StatusCode::UNAUTHORIZED => "invalid username or password".to_string(),
            StatusCode::FORBIDDEN => "insufficient permissions to write".to_string(),
            _ => format!("device returned HTTP {status}"),
        };
        return Err(NetioError::Protocol(message));
    }

    serde_json::from_str(&text)
        .map_err(|e| NetioError::Protocol(format!("unexpected response body: {e}")))
}

fn decode_outputs(report: DeviceReport) -> Result<Vec<Output>> {
    report
        .outputs
        .into_iter()
        .map(Output::try_from)
        .collect()
}

/// Select outputs by ID, preserving the requested order.
fn pick(outputs: &[Output], ids: impl Iterator<Item = u32>) -> Result<Vec<Output>> {
    ids.map(|id| {
        outputs
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or(NetioError::OutputNotFound(id))
    })
    .collect()
}

fn transport_error(err: reqwest::Error) -> NetioError {
    if err.is_timeout() {
        NetioError::Transport(format!("request timed out: {err}"))
    } else if err.is_connect() {
        NetioError::Transport(format!("cannot connect to device: {err}"))
    } else {
        NetioError::Transport(err.to_string())
    }
}
