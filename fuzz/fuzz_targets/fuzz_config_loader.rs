#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parsing and validation may reject anything but must never panic.
    let Ok(cfg) = envmon_config::load_toml(data) else {
        return;
    };
    if cfg.validate().is_err() {
        return;
    }

    // A validated config always maps dial positions into its setpoint range.
    let mc = envmon_core::MonitorCfg::from(&cfg);
    let max_raw = mc.sensor.max_raw;
    for raw in [0, max_raw / 2, max_raw] {
        let sp = mc.setpoint.apply(raw, max_raw);
        assert!((mc.setpoint.min..=mc.setpoint.max).contains(&sp));
    }
});
