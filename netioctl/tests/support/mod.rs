//! Mock NETIO device for integration tests
//!
//! Serves the M2M JSON endpoint on a background thread with its own
//! runtime so the blocking client can call it from the test thread.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;

use netio_core::api::{
    AgentReport, ControlRequest, DeviceReport, GlobalMeasureReport, OutputReport,
};

/// Basic-auth header the mock accepts: admin / secret.
pub const AUTH_HEADER: &str = "Basic YWRtaW46c2VjcmV0";
pub const USER: &str = "admin";
pub const PASSWORD: &str = "secret";

struct Shared {
    outputs: Mutex<Vec<OutputReport>>,
    /// Log of (ID, Action) entries applied, in request order.
    applied: Mutex<Vec<(u32, u8)>>,
}

pub struct MockDevice {
    pub addr: std::net::SocketAddr,
    shared: Arc<Shared>,
}

impl MockDevice {
    /// Spawn a mock device reporting the given outputs.
    pub fn spawn(outputs: Vec<OutputReport>) -> Self {
        let shared = Arc::new(Shared {
            outputs: Mutex::new(outputs),
            applied: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/netio.json", get(get_report).post(post_control))
            .route("/bad.json", get(|| async { "not json" }))
            .with_state(Arc::clone(&shared));

        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("runtime");
            rt.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
                tx.send(listener.local_addr().expect("addr")).expect("send");
                axum::serve(listener, app).await.expect("serve");
            });
        });

        let addr = rx.recv().expect("mock device address");
        Self { addr, shared }
    }

    pub fn url(&self) -> String {
        format!("http://{}/netio.json", self.addr)
    }

    pub fn bad_url(&self) -> String {
        format!("http://{}/bad.json", self.addr)
    }

    /// Snapshot of the device's current outputs.
    pub fn outputs(&self) -> Vec<OutputReport> {
        self.shared.outputs.lock().unwrap().clone()
    }

    /// Control entries applied so far, in request order.
    pub fn applied(&self) -> Vec<(u32, u8)> {
        self.shared.applied.lock().unwrap().clone()
    }
}

/// Build a plausible output report row.
pub fn output_report(id: u32, name: &str, state: u8, action: u8) -> OutputReport {
    OutputReport {
        id,
        name: name.to_string(),
        state,
        action,
        delay: 5000,
        current: u32::from(state) * 300,
        power_factor: if state == 1 { 0.81 } else { 0.0 },
        load: i32::from(state) * 60,
        energy: 1000 + u64::from(id) * 100,
    }
}

async fn get_report(State(shared): State<Arc<Shared>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(build_report(&shared)).into_response()
}

async fn post_control(
    State(shared): State<Arc<Shared>>,
    headers: HeaderMap,
    body: Result<Json<ControlRequest>, axum::extract::rejection::JsonRejection>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let Ok(Json(request)) = body else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    {
        let mut outputs = shared.outputs.lock().unwrap();
        let mut applied = shared.applied.lock().unwrap();
        for entry in &request.outputs {
            if entry.action > 5 {
                return StatusCode::BAD_REQUEST.into_response();
            }
            let Some(output) = outputs.iter_mut().find(|o| o.id == entry.id) else {
                // Unknown IDs are silently dropped from the echo.
                continue;
            };
            output.state = match entry.action {
                0 => 0,
                1 => 1,
                2 => 1, // short off ends on
                3 => 0, // short on ends off
                4 => u8::from(output.state == 0),
                _ => output.state, // no change
            };
            if entry.action != 5 {
                output.action = entry.action;
            }
            applied.push((entry.id, entry.action));
        }
    }

    Json(build_report(&shared)).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == AUTH_HEADER)
}

fn build_report(shared: &Shared) -> DeviceReport {
    let outputs = shared.outputs.lock().unwrap().clone();
    DeviceReport {
        agent: AgentReport {
            model: "4PS".to_string(),
            version: "3.4.2".to_string(),
            json_ver: "2.1".to_string(),
            device_name: "mock-pdu".to_string(),
            vendor_id: 0,
            oem_id: 0,
            serial_number: "24:A4:2C:39:23:1E".to_string(),
            uptime: 1208,
            time: "2024-05-02T08:30:15+01:00".to_string(),
            num_outputs: outputs.len() as u32,
        },
        global_measure: GlobalMeasureReport {
            voltage: 230.6,
            frequency: 49.9,
            total_current: outputs.iter().map(|o| o.current).sum(),
            overall_power_factor: 0.83,
            total_load: outputs.iter().map(|o| o.load).sum(),
            total_energy: outputs.iter().map(|o| o.energy).sum(),
            energy_start: "2024-01-01T00:00:00+01:00".to_string(),
        },
        outputs,
    }
}
