//! Core types and data structures for NETIO power sockets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NetioError;

/// Commanded output operation.
///
/// Integer-encoded on the wire (0-5) per the NETIO M2M JSON protocol.
/// The enum is closed: decoding happens only at the protocol boundary so
/// an out-of-range integer never propagates past parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Switch the output off
    Off,
    /// Switch the output on
    On,
    /// Momentary off, then back on
    ShortOff,
    /// Momentary on, then back off
    ShortOn,
    /// Invert the current state
    Toggle,
    /// Leave the output as it is
    NoChange,
}

impl Action {
    /// All actions, in wire-integer order.
    pub const ALL: [Action; 6] = [
        Action::Off,
        Action::On,
        Action::ShortOff,
        Action::ShortOn,
        Action::Toggle,
        Action::NoChange,
    ];

    /// Canonical token, as accepted on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Off => "OFF",
            Action::On => "ON",
            Action::ShortOff => "SHORT_OFF",
            Action::ShortOn => "SHORT_ON",
            Action::Toggle => "TOGGLE",
            Action::NoChange => "NOCHANGE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Action> for u8 {
    fn from(action: Action) -> Self {
        match action {
            Action::Off => 0,
            Action::On => 1,
            Action::ShortOff => 2,
            Action::ShortOn => 3,
            Action::Toggle => 4,
            Action::NoChange => 5,
        }
    }
}

impl TryFrom<u8> for Action {
    type Error = NetioError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Action::Off),
            1 => Ok(Action::On),
            2 => Ok(Action::ShortOff),
            3 => Ok(Action::ShortOn),
            4 => Ok(Action::Toggle),
            5 => Ok(Action::NoChange),
            other => Err(NetioError::Protocol(format!(
                "invalid output action {other} (expected 0-5)"
            ))),
        }
    }
}

impl FromStr for Action {
    type Err = NetioError;

    /// Parse an action by name (case-insensitive) or by its wire integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OFF" => return Ok(Action::Off),
            "ON" => return Ok(Action::On),
            "SHORT_OFF" => return Ok(Action::ShortOff),
            "SHORT_ON" => return Ok(Action::ShortOn),
            "TOGGLE" => return Ok(Action::Toggle),
            "NOCHANGE" | "NO_CHANGE" | "IGNORE" => return Ok(Action::NoChange),
            _ => {}
        }

        if let Ok(value) = s.parse::<u8>() {
            return Action::try_from(value).map_err(|_| invalid_action(s));
        }

        Err(invalid_action(s))
    }
}

fn invalid_action(s: &str) -> NetioError {
    NetioError::Usage(format!(
        "'{s}' is not a valid ACTION (expected one of OFF, ON, SHORT_OFF, SHORT_ON, TOGGLE, NOCHANGE, or 0-5)"
    ))
}

/// Snapshot of one physical power output.
///
/// Constructed fresh from each device response; never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    /// Output ID, 1-based, stable across calls for a given socket
    pub id: u32,
    /// User-assigned output name
    pub name: String,
    /// Whether the output currently delivers power
    pub state: bool,
    /// Configured or last-issued action; distinct from instantaneous state
    pub action: Action,
    /// Minimum time between state changes, in milliseconds
    pub delay_ms: u32,
    /// Instantaneous current, in milliamps
    pub current_ma: u32,
    /// Power factor, 0.0-1.0
    pub power_factor: f64,
    /// Load, in watts
    pub load_w: i32,
    /// Cumulative energy counter, in watt-hours
    pub energy_wh: u64,
}

/// Device identity snapshot, fetched on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInfo {
    /// Device model
    pub model: String,
    /// Firmware version
    pub firmware_version: String,
    /// JSON API schema version
    pub json_api_version: String,
    /// User-assigned device name
    pub device_name: String,
    /// Vendor ID
    pub vendor_id: u32,
    /// OEM ID
    pub oem_id: u32,
    /// Serial number
    pub serial_number: String,
    /// Uptime in seconds
    pub uptime_secs: u64,
    /// Current device time, ISO-8601 with offset, kept as reported
    pub time: String,
    /// Number of outputs on the device
    pub num_outputs: u32,
}

/// Device-wide aggregate electrical snapshot, fetched on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalMeasure {
    /// Mains voltage, in volts
    pub voltage_v: f64,
    /// Mains frequency, in hertz
    pub frequency_hz: f64,
    /// Total current over all outputs, in milliamps
    pub total_current_ma: u32,
    /// Overall power factor, 0.0-1.0
    pub overall_power_factor: f64,
    /// Total load, in watts
    pub total_load_w: i32,
    /// Total energy counter, in watt-hours
    pub total_energy_wh: u64,
    /// Timestamp at which the energy counter started
    pub energy_start: String,
}
