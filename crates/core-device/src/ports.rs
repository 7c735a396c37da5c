use core_error::{PlotError, Result};
use tracing::debug;

/// Enumerate candidate serial device paths: the platform hints reported
/// by the `serialport` crate, plus a glob over well-known device-file
/// patterns on Unix, deduplicated by path.
pub fn enumerate_ports() -> Result<Vec<String>> {
    let mut paths = Vec::new();

    for info in serialport::available_ports().map_err(|e| PlotError::io(format!("enumerating ports: {e}")))? {
        paths.push(info.port_name);
    }

    #[cfg(unix)]
    paths.extend(glob_unix_device_files());

    let mut seen = std::collections::HashSet::new();
    paths.retain(|p| seen.insert(p.clone()));
    debug!(target: "core_device::ports", count = paths.len(), "enumerated serial ports");
    Ok(paths)
}

#[cfg(unix)]
fn glob_unix_device_files() -> Vec<String> {
    const PREFIXES: &[&str] = &["ttyACM", "ttyUSB", "cu.usbmodem", "cu.usbserial"];
    let Ok(entries) = std::fs::read_dir("/dev") else {
        return Vec::new();
    };
    entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| PREFIXES.iter().any(|p| name.starts_with(p)))
        .map(|name| format!("/dev/{name}"))
        .collect()
}

/// Case-insensitive alias match against a port's basename or its full
/// path; an alias that matches neither is a `DeviceNotFound` error.
pub fn select_by_alias(ports: &[String], alias: &str) -> Result<String> {
    let lower = alias.to_ascii_lowercase();
    ports
        .iter()
        .find(|p| {
            p.to_ascii_lowercase() == lower
                || basename(p).to_ascii_lowercase() == lower
        })
        .cloned()
        .ok_or_else(|| PlotError::device_not_found(format!("no port matches alias '{alias}'")))
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Pick the first port that responds to `probe`, falling back to the
/// first enumerated port; an empty list is `DeviceNotFound`.
pub fn select_responsive(ports: &[String], mut probe: impl FnMut(&str) -> bool) -> Result<String> {
    if ports.is_empty() {
        return Err(PlotError::device_not_found("no serial ports enumerated"));
    }
    if let Some(p) = ports.iter().find(|p| probe(p)) {
        return Ok(p.clone());
    }
    Ok(ports[0].clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_matches_basename_case_insensitively() {
        let ports = vec!["/dev/ttyACM0".to_string()];
        assert_eq!(select_by_alias(&ports, "TTYACM0").unwrap(), "/dev/ttyACM0");
    }

    #[test]
    fn alias_matches_exact_path() {
        let ports = vec!["/dev/ttyACM0".to_string()];
        assert_eq!(select_by_alias(&ports, "/dev/ttyACM0").unwrap(), "/dev/ttyACM0");
    }

    #[test]
    fn unmatched_alias_is_device_not_found() {
        let ports = vec!["/dev/ttyACM0".to_string()];
        let err = select_by_alias(&ports, "bogus").unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn responsive_port_is_preferred_over_first_enumerated() {
        let ports = vec!["/dev/ttyACM0".to_string(), "/dev/ttyACM1".to_string()];
        let chosen = select_responsive(&ports, |p| p.ends_with('1')).unwrap();
        assert_eq!(chosen, "/dev/ttyACM1");
    }

    #[test]
    fn falls_back_to_first_enumerated_when_none_respond() {
        let ports = vec!["/dev/ttyACM0".to_string(), "/dev/ttyACM1".to_string()];
        let chosen = select_responsive(&ports, |_| false).unwrap();
        assert_eq!(chosen, "/dev/ttyACM0");
    }

    #[test]
    fn empty_port_list_is_device_not_found() {
        let err = select_responsive(&[], |_| true).unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }
}
