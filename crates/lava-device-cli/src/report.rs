//! Plain-text rendering of resolved device settings

use anyhow::Result;
use lava_device::DeviceConfig;
use std::io::Write;

const ABSENT: &str = "-";

fn or_absent(value: &str) -> &str {
    if value.is_empty() {
        ABSENT
    } else {
        value
    }
}

/// Print every resolved command of a device
pub fn write_commands<W: Write>(out: &mut W, device: &DeviceConfig) -> Result<()> {
    writeln!(out, "device_type: {}", device.device_type().unwrap_or(ABSENT))?;
    writeln!(out, "hostname: {}", device.hostname().unwrap_or(ABSENT))?;
    writeln!(out, "power_state: {}", device.power_state())?;
    writeln!(out, "hard_reset: {}", or_absent(device.hard_reset_command()))?;
    writeln!(out, "soft_reset: {}", or_absent(device.soft_reset_command()))?;
    writeln!(out, "power_on: {}", or_absent(device.power_command()))?;
    writeln!(out, "power_off: {}", or_absent(device.power_off_command()))?;
    writeln!(out, "pre_os_command: {}", device.pre_os_command().unwrap_or(ABSENT))?;
    writeln!(
        out,
        "pre_power_command: {}",
        device.pre_power_command().unwrap_or(ABSENT)
    )?;
    // connect_command fails without a commands section; report that as absent
    let connect = device.connect_command().unwrap_or("");
    writeln!(out, "connect: {}", or_absent(connect))?;
    Ok(())
}

/// Print a single constant as YAML
pub fn write_constant<W: Write>(
    out: &mut W,
    device: &DeviceConfig,
    name: &str,
    prefix: Option<&str>,
    missing_ok: bool,
) -> Result<()> {
    match device.get_constant(name, prefix, missing_ok)? {
        Some(value) => write!(out, "{}", serde_yaml::to_string(value)?)?,
        None => writeln!(out, "{}", ABSENT)?,
    }
    Ok(())
}
