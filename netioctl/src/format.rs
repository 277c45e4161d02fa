//! Output formatting utilities for the CLI
//!
//! GET rows are plain delimiter-separated text so they stay scriptable;
//! INFO blocks and status messages get light color for humans.

use colored::Colorize;

use netio_core::{AgentInfo, GlobalMeasure, Output};

/// Column order for output rows. Documented in the README; scripts rely
/// on it staying stable.
pub const OUTPUT_COLUMNS: [&str; 9] = [
    "ID",
    "State",
    "Action",
    "Delay",
    "Current",
    "PowerFactor",
    "Load",
    "Energy",
    "Name",
];

/// Rendering options for output rows.
#[derive(Debug, Clone)]
pub struct RowOptions {
    /// Field delimiter, a single tab by default
    pub delimiter: String,
    /// Whether to emit the column header line
    pub header: bool,
    /// Print actions as their wire integers instead of names
    pub action_as_int: bool,
}

impl Default for RowOptions {
    fn default() -> Self {
        Self {
            delimiter: "\t".to_string(),
            header: true,
            action_as_int: false,
        }
    }
}

/// Render outputs as delimiter-separated rows, one per output, in the
/// order given.
pub fn render_outputs(outputs: &[Output], opts: &RowOptions) -> String {
    let mut lines = Vec::with_capacity(outputs.len() + 1);

    if opts.header {
        lines.push(OUTPUT_COLUMNS.join(&opts.delimiter));
    }

    for output in outputs {
        let action = if opts.action_as_int {
            u8::from(output.action).to_string()
        } else {
            output.action.to_string()
        };
        let fields = [
            output.id.to_string(),
            (if output.state { "1" } else { "0" }).to_string(),
            action,
            output.delay_ms.to_string(),
            output.current_ma.to_string(),
            output.power_factor.to_string(),
            output.load_w.to_string(),
            output.energy_wh.to_string(),
            output.name.clone(),
        ];
        lines.push(fields.join(&opts.delimiter));
    }

    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

/// Render the device identity and aggregate measurements as two labeled
/// blocks of indented key/value lines.
pub fn render_info(agent: &AgentInfo, measure: &GlobalMeasure) -> String {
    let mut out = String::new();

    out.push_str(&"Agent".bold().to_string());
    out.push('\n');
    push_kv(&mut out, "Model", &agent.model);
    push_kv(&mut out, "Version", &agent.firmware_version);
    push_kv(&mut out, "JSONVer", &agent.json_api_version);
    push_kv(&mut out, "DeviceName", &agent.device_name);
    push_kv(&mut out, "VendorID", &agent.vendor_id.to_string());
    push_kv(&mut out, "OemID", &agent.oem_id.to_string());
    push_kv(&mut out, "SerialNumber", &agent.serial_number);
    push_kv(&mut out, "Uptime", &agent.uptime_secs.to_string());
    push_kv(&mut out, "Time", &agent.time);
    push_kv(&mut out, "NumOutputs", &agent.num_outputs.to_string());

    out.push_str(&"GlobalMeasure".bold().to_string());
    out.push('\n');
    push_kv(&mut out, "Voltage", &measure.voltage_v.to_string());
    push_kv(&mut out, "Frequency", &measure.frequency_hz.to_string());
    push_kv(&mut out, "TotalCurrent", &measure.total_current_ma.to_string());
    push_kv(
        &mut out,
        "OverallPowerFactor",
        &measure.overall_power_factor.to_string(),
    );
    push_kv(&mut out, "TotalLoad", &measure.total_load_w.to_string());
    push_kv(&mut out, "TotalEnergy", &measure.total_energy_wh.to_string());
    push_kv(&mut out, "EnergyStart", &measure.energy_start);

    out
}

fn push_kv(out: &mut String, key: &str, value: &str) {
    out.push_str(&format!("  {key:<20}{value}\n"));
}

/// One confirmation line for an echoed post-change snapshot.
pub fn format_applied(output: &Output) -> String {
    let state = if output.state { "on" } else { "off" };
    format!(
        "output {} {} ({}: {})",
        output.id,
        output.action.to_string().green(),
        output.name,
        state
    )
}

/// Error message with a consistent prefix, for stderr.
pub fn format_error(message: &str) -> String {
    format!("{} {}", "error:".red().bold(), message)
}
