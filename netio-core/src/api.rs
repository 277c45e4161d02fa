//! Wire models for the NETIO M2M JSON protocol
//!
//! Raw request and response shapes as the device emits them, plus the
//! conversions into the typed model of [`crate::types`]. Field names
//! follow the device schema exactly; decoding is the only place where an
//! out-of-range wire value can be observed.

use serde::{Deserialize, Serialize};

use crate::error::NetioError;
use crate::types::{Action, AgentInfo, GlobalMeasure, Output};

/// Full device report, the body of every read response.
///
/// Write responses mirror the same shape, with `Outputs` reflecting the
/// post-change state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceReport {
    #[serde(rename = "Agent")]
    pub agent: AgentReport,
    #[serde(rename = "GlobalMeasure")]
    pub global_measure: GlobalMeasureReport,
    #[serde(rename = "Outputs")]
    pub outputs: Vec<OutputReport>,
}

/// `Agent` object of the device report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentReport {
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "JSONVer")]
    pub json_ver: String,
    #[serde(rename = "DeviceName")]
    pub device_name: String,
    #[serde(rename = "VendorID")]
    pub vendor_id: u32,
    #[serde(rename = "OemID")]
    pub oem_id: u32,
    #[serde(rename = "SerialNumber")]
    pub serial_number: String,
    #[serde(rename = "Uptime")]
    pub uptime: u64,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "NumOutputs")]
    pub num_outputs: u32,
}

/// `GlobalMeasure` object of the device report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalMeasureReport {
    #[serde(rename = "Voltage")]
    pub voltage: f64,
    #[serde(rename = "Frequency")]
    pub frequency: f64,
    #[serde(rename = "TotalCurrent")]
    pub total_current: u32,
    #[serde(rename = "OverallPowerFactor")]
    pub overall_power_factor: f64,
    #[serde(rename = "TotalLoad")]
    pub total_load: i32,
    #[serde(rename = "TotalEnergy")]
    pub total_energy: u64,
    #[serde(rename = "EnergyStart")]
    pub energy_start: String,
}

/// One element of the `Outputs` array in a read response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputReport {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "State")]
    pub state: u8,
    #[serde(rename = "Action")]
    pub action: u8,
    #[serde(rename = "Delay")]
    pub delay: u32,
    #[serde(rename = "Current")]
    pub current: u32,
    #[serde(rename = "PowerFactor")]
    pub power_factor: f64,
    #[serde(rename = "Load")]
    pub load: i32,
    #[serde(rename = "Energy")]
    pub energy: u64,
}

/// Body of a batched write request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlRequest {
    #[serde(rename = "Outputs")]
    pub outputs: Vec<OutputControl>,
}

/// One `(ID, Action)` entry of a write request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputControl {
    #[serde(rename = "ID")]
    pub id: u32,
    #[serde(rename = "Action")]
    pub action: u8,
}

impl From<(u32, Action)> for OutputControl {
    fn from((id, action): (u32, Action)) -> Self {
        Self {
            id,
            action: action.into(),
        }
    }
}

impl From<&[(u32, Action)]> for ControlRequest {
    fn from(changes: &[(u32, Action)]) -> Self {
        Self {
            outputs: changes.iter().copied().map(OutputControl::from).collect(),
        }
    }
}

impl TryFrom<OutputReport> for Output {
    type Error = NetioError;

    fn try_from(report: OutputReport) -> Result<Self, Self::Error> {
        Ok(Output {
            id: report.id,
            name: report.name,
            state: report.state != 0,
            action: Action::try_from(report.action)?,
            delay_ms: report.delay,
            current_ma: report.current,
            power_factor: report.power_factor,
            load_w: report.load,
            energy_wh: report.energy,
        })
    }
}

impl From<AgentReport> for AgentInfo {
    fn from(report: AgentReport) -> Self {
        AgentInfo {
            model: report.model,
            firmware_version: report.version,
            json_api_version: report.json_ver,
            device_name: report.device_name,
            vendor_id: report.vendor_id,
            oem_id: report.oem_id,
            serial_number: report.serial_number,
            uptime_secs: report.uptime,
            time: report.time,
            num_outputs: report.num_outputs,
        }
    }
}

impl From<GlobalMeasureReport> for GlobalMeasure {
    fn from(report: GlobalMeasureReport) -> Self {
        GlobalMeasure {
            voltage_v: report.voltage,
            frequency_hz: report.frequency,
            total_current_ma: report.total_current,
            overall_power_factor: report.overall_power_factor,
            total_load_w: report.total_load,
            total_energy_wh: report.total_energy,
            energy_start: report.energy_start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = r#"{
        "Agent": {
            "Model": "4PS",
            "Version": "3.4.2",
            "JSONVer": "2.1",
            "DeviceName": "rack-pdu",
            "VendorID": 0,
            "OemID": 0,
            "SerialNumber": "24:A4:2C:39:23:1E",
            "Uptime": 1208,
            "Time": "2024-05-02T08:30:15+01:00",
            "NumOutputs": 2
        },
        "GlobalMeasure": {
            "Voltage": 230.6,
            "Frequency": 49.9,
            "TotalCurrent": 540,
            "OverallPowerFactor": 0.83,
            "TotalLoad": 104,
            "TotalEnergy": 9240,
            "EnergyStart": "2024-01-01T00:00:00+01:00"
        },
        "Outputs": [
            {
                "ID": 1,
                "Name": "router",
                "State": 1,
                "Action": 1,
                "Delay": 5000,
                "Current": 350,
                "PowerFactor": 0.81,
                "Load": 67,
                "Energy": 7100
            },
            {
                "ID": 2,
                "Name": "switch",
                "State": 0,
                "Action": 0,
                "Delay": 2000,
                "Current": 0,
                "PowerFactor": 0.0,
                "Load": 0,
                "Energy": 2140
            }
        ]
    }"#;

    #[test]
    fn test_decode_device_report() {
        let report: DeviceReport = serde_json::from_str(REPORT).unwrap();

        assert_eq!(report.agent.model, "4PS");
        assert_eq!(report.agent.num_outputs, 2);
        assert_eq!(report.global_measure.total_current, 540);
        assert_eq!(report.outputs.len(), 2);
        assert_eq!(report.outputs[0].id, 1);
        assert_eq!(report.outputs[1].state, 0);
    }

    #[test]
    fn test_output_report_to_typed() {
        let report: DeviceReport = serde_json::from_str(REPORT).unwrap();
        let output = Output::try_from(report.outputs[0].clone()).unwrap();

        assert_eq!(output.id, 1);
        assert_eq!(output.name, "router");
        assert!(output.state);
        assert_eq!(output.action, Action::On);
        assert_eq!(output.delay_ms, 5000);
        assert_eq!(output.current_ma, 350);
        assert_eq!(output.energy_wh, 7100);
    }

    #[test]
    fn test_output_report_invalid_action() {
        let mut report: DeviceReport = serde_json::from_str(REPORT).unwrap();
        report.outputs[0].action = 9;

        assert!(matches!(
            Output::try_from(report.outputs[0].clone()),
            Err(NetioError::Protocol(_))
        ));
    }

    #[test]
    fn test_agent_report_to_typed() {
        let report: DeviceReport = serde_json::from_str(REPORT).unwrap();
        let agent = AgentInfo::from(report.agent);

        assert_eq!(agent.device_name, "rack-pdu");
        assert_eq!(agent.firmware_version, "3.4.2");
        assert_eq!(agent.json_api_version, "2.1");
        assert_eq!(agent.uptime_secs, 1208);
        assert_eq!(agent.num_outputs, 2);
    }

    #[test]
    fn test_control_request_encoding() {
        let changes: &[(u32, Action)] = &[(1, Action::On), (2, Action::Toggle)];
        let body = ControlRequest::from(changes);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "Outputs": [
                    {"ID": 1, "Action": 1},
                    {"ID": 2, "Action": 4}
                ]
            })
        );
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let body = r#"{"Agent": {}, "GlobalMeasure": {}, "Outputs": []}"#;
        assert!(serde_json::from_str::<DeviceReport>(body).is_err());
    }
}
