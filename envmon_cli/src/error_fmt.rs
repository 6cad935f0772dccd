//! Human-readable error descriptions and structured JSON error formatting.

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use envmon_core::error::{BuildError, MonitorError};
    use envmon_hardware::HwError;

    // Typed matches first
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
            missing => format!(
                "What happened: The monitor could not be assembled ({missing}).\nLikely causes: A device failed to open or was not wired into the builder.\nHow to fix: Check the [pins] section and the logs above for the failing device."
            ),
        };
    }

    if let Some(hw) = err.downcast_ref::<HwError>() {
        return match hw {
            HwError::Timeout | HwError::ProbeCrc | HwError::ProbeFormat(_) => format!(
                "What happened: The temperature probe could not be read ({hw}).\nLikely causes: Loose 1-Wire data line, missing pull-up resistor, or wrong probe_path.\nHow to fix: Check wiring and sensor.probe_path, then rerun self-check."
            ),
            HwError::Gpio(_) | HwError::Spi(_) => format!(
                "What happened: Failed to initialize hardware ({hw}).\nLikely causes: Incorrect pin numbers, SPI disabled, or insufficient GPIO permissions.\nHow to fix: Fix the [pins] values in the config; enable SPI and ensure the process may access GPIO."
            ),
            HwError::Io(e) => format!(
                "What happened: Device file IO failed ({e}).\nLikely causes: The device path does not exist or is not readable.\nHow to fix: Verify the path and permissions."
            ),
        };
    }

    if let Some(me) = err.downcast_ref::<MonitorError>() {
        return format!(
            "What happened: {me}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
        );
    }

    // String-based heuristics for errors coming from init or config
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.starts_with("read config") {
        return format!(
            "What happened: The config file could not be read ({msg}).\nLikely causes: Wrong --config path.\nHow to fix: Pass --config pointing at an existing TOML file (default etc/envmon.toml)."
        );
    }

    if is_config_message(&lower) {
        return format!(
            "What happened: Configuration is invalid or incomplete.\nLikely causes: Missing [pins] entries, a typo, or an out-of-range value.\nHow to fix: Edit the TOML config and try again. Details: {}",
            err.root_cause()
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Exit codes: 2 for configuration problems, 3 for hardware, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    use envmon_core::error::BuildError;
    use envmon_hardware::HwError;

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::InvalidConfig(_) => 2,
            _ => 3,
        };
    }
    if err.downcast_ref::<HwError>().is_some() {
        return 3;
    }
    let lower = err.to_string().to_ascii_lowercase();
    if lower.starts_with("read config") || is_config_message(&lower) {
        return 2;
    }
    1
}

/// Messages produced by config parsing and `Config::validate`.
fn is_config_message(lower: &str) -> bool {
    lower.starts_with("parse config")
        || lower.contains(" must be ")
        || lower.contains("unreasonably large")
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = match exit_code_for_error(err) {
        2 => "Config",
        3 => "Hardware",
        _ => "Error",
    };
    json!({ "reason": reason, "message": humanize(err) }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use envmon_core::error::BuildError;
    use rstest::rstest;

    #[rstest]
    #[case(eyre::Report::new(BuildError::InvalidConfig("samples must be >= 1")), 2, "Invalid configuration")]
    #[case(eyre::Report::new(BuildError::MissingRelay), 3, "could not be assembled")]
    #[case(eyre::Report::new(envmon_hardware::HwError::Gpio("busy".into())), 3, "initialize hardware")]
    #[case(eyre::eyre!("timing.tick_ms must be >= 1"), 2, "Configuration is invalid")]
    #[case(eyre::eyre!("boom"), 1, "Something went wrong")]
    fn errors_map_to_codes_and_hints(
        #[case] err: eyre::Report,
        #[case] code: i32,
        #[case] needle: &str,
    ) {
        assert_eq!(exit_code_for_error(&err), code);
        assert!(humanize(&err).contains(needle), "{}", humanize(&err));
    }

    #[test]
    fn json_error_has_reason() {
        let err = eyre::Report::new(BuildError::MissingRelay);
        let v: serde_json::Value = serde_json::from_str(&format_error_json(&err)).unwrap();
        assert_eq!(v["reason"], "Hardware");
    }
}
