#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cli;
mod error_fmt;
mod hw;
mod report;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use envmon_config::{Config, Logging, SensorKind};
use envmon_core::config::SensorCfg;
use envmon_core::util::{MILLIS_PER_SEC, ticks_per_report};
use envmon_core::{Reporter, RunOptions, SetpointMap};
use envmon_traits::{Clock, MonotonicClock};
use eyre::WrapErr;
use tracing_appender::non_blocking::WorkerGuard;

use crate::cli::{Cli, Commands, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use crate::report::{ConsoleReporter, JsonReporter};

const KNOWN_SECTIONS: &[&str] = &[
    "pins",
    "sensor",
    "setpoint",
    "timing",
    "button",
    "buzzer",
    "logging",
    "simulation",
];

/// How long each output stays on during `self-check`.
const SELF_CHECK_PULSE_MS: u64 = 150;

fn main() {
    if let Err(err) = try_main() {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn try_main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let cfg = envmon_config::load_file(&cli.config)?;
    // flushes the log file when dropped at the end of this function
    let _file_guard = init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    warn_unknown_sections(&cli.config);

    match cli.cmd {
        Commands::Run {
            max_ticks,
            startup_delay_ms,
        } => run_monitor(&cfg, cli.json, max_ticks, startup_delay_ms),
        Commands::SelfCheck => self_check(&cfg),
    }
}

fn init_tracing(
    json: bool,
    cli_level: Option<&str>,
    logging: &Logging,
) -> eyre::Result<Option<WorkerGuard>> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // RUST_LOG wins over --log-level, which wins over logging.level
    let level = cli_level.or(logging.level.as_deref()).unwrap_or("info");
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level).wrap_err_with(|| format!("invalid log level {level:?}"))?,
    };

    let console = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let mut guard = None;
    let file = match logging.file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = match path.parent() {
                Some(d) if !d.as_os_str().is_empty() => d,
                _ => Path::new("."),
            };
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file must name a file"))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, worker) = tracing_appender::non_blocking(appender);
            guard = Some(worker);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer).boxed())
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .wrap_err("install tracing subscriber")?;
    Ok(guard)
}

/// Top-level tables serde silently ignores; most likely typos.
fn unknown_sections(text: &str) -> Vec<String> {
    let Ok(table) = text.parse::<toml::Table>() else {
        return Vec::new();
    };
    table
        .keys()
        .filter(|k| !KNOWN_SECTIONS.contains(&k.as_str()))
        .cloned()
        .collect()
}

fn warn_unknown_sections(path: &Path) {
    let Ok(text) = std::fs::read_to_string(path) else {
        return;
    };
    for section in unknown_sections(&text) {
        tracing::warn!(%section, "unknown config section ignored");
    }
}

fn print_banner(cfg: &Config) {
    let t = &cfg.timing;
    let kind = match cfg.sensor.kind {
        SensorKind::Analog => "analog",
        SensorKind::Probe => "probe",
    };
    let rule = "=".repeat(60);
    println!("{rule}");
    println!("Environmental monitor");
    println!("{rule}");
    println!("Temperature sensor: {kind} ({} samples)", cfg.sensor.samples);
    println!(
        "Setpoint range:     {}..{} C",
        cfg.setpoint.min_c, cfg.setpoint.max_c
    );
    println!(
        "Report interval:    {:.1} s ({} ticks of {} ms)",
        t.report_interval_ms as f64 / MILLIS_PER_SEC as f64,
        ticks_per_report(t.report_interval_ms, t.tick_ms),
        t.tick_ms
    );
    println!("Initial mode:       {:?}", cfg.button.initial_mode);
    println!("Press the mode button to toggle AUTOMATIC / MANUAL; Ctrl-C to stop.");
    println!("{rule}");
}

fn run_monitor(
    cfg: &Config,
    json: bool,
    max_ticks: Option<u64>,
    startup_delay_ms: Option<u64>,
) -> eyre::Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&shutdown);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
            .wrap_err("install Ctrl-C handler")?;
    }

    let reporter: Box<dyn Reporter> = if json {
        Box::new(JsonReporter)
    } else {
        print_banner(cfg);
        Box::new(ConsoleReporter)
    };
    let monitor = hw::build_monitor(cfg, reporter)?;

    let opts = RunOptions {
        startup_delay_ms: startup_delay_ms.unwrap_or(cfg.timing.startup_delay_ms),
        max_ticks,
    };
    tracing::info!(
        startup_delay_ms = opts.startup_delay_ms,
        max_ticks = ?opts.max_ticks,
        "monitor starting"
    );
    let summary = envmon_core::run(monitor, &shutdown, opts);
    tracing::info!(
        readings = summary.readings,
        ticks = summary.ticks,
        interrupted = summary.interrupted,
        "monitor stopped"
    );

    if json {
        println!(
            "{}",
            serde_json::json!({
                "event": "summary",
                "readings": summary.readings,
                "ticks": summary.ticks,
                "interrupted": summary.interrupted,
            })
        );
    } else {
        println!("Total readings: {}", summary.readings);
    }
    Ok(())
}

/// Pulse each output once, then read every input once. Failures are
/// listed and counted rather than aborting at the first one.
fn self_check(cfg: &Config) -> eyre::Result<()> {
    let clock: Arc<dyn Clock + Send + Sync> = Arc::new(MonotonicClock::new());
    let mut dev = hw::open_devices(cfg, &clock)?;
    println!("backend: {}", dev.backend);
    let pulse = Duration::from_millis(SELF_CHECK_PULSE_MS);
    let mut failures = 0_u32;

    let mut check = |what: &str, outcome: Result<String, String>| match outcome {
        Ok(detail) => println!("  {what:<12} ok    {detail}"),
        Err(e) => {
            failures += 1;
            println!("  {what:<12} FAIL  {e}");
        }
    };

    let mut outputs: Vec<(&str, &mut dyn envmon_traits::DigitalOutput)> = vec![
        ("green led", dev.green.as_mut()),
        ("amber led", dev.amber.as_mut()),
        ("red led", dev.red.as_mut()),
        ("relay", dev.relay.as_mut()),
    ];
    if let Some(vent) = dev.vent.as_mut() {
        outputs.push(("vent", vent.as_mut()));
    }
    for (what, pin) in outputs {
        let outcome = pin
            .set_level(true)
            .and_then(|()| {
                clock.sleep(pulse);
                pin.set_level(false)
            })
            .map(|()| "pulsed".to_owned())
            .map_err(|e| e.to_string());
        check(what, outcome);
    }

    let outcome = dev
        .buzzer
        .set_duty(cfg.buzzer.duty)
        .and_then(|()| {
            clock.sleep(pulse);
            dev.buzzer.set_duty(0)
        })
        .map(|()| format!("chirped at duty {}", cfg.buzzer.duty))
        .map_err(|e| e.to_string());
    check("buzzer", outcome);

    let sensor = SensorCfg::from(&cfg.sensor);
    let outcome = match &mut dev.temperature {
        hw::TempDevice::Adc(adc) => adc
            .read_raw()
            .map(|raw| format!("raw {raw} -> {:.2} C", sensor.temp_map.apply(raw))),
        hw::TempDevice::Probe(probe) => probe.read_celsius().map(|c| format!("{c:.2} C")),
    }
    .map_err(|e| e.to_string());
    check("temperature", outcome);

    let outcome = dev
        .light
        .read_raw()
        .map(|raw| format!("raw {raw}"))
        .map_err(|e| e.to_string());
    check("light", outcome);

    let setpoints = SetpointMap::from(&cfg.setpoint);
    let outcome = dev
        .setpoint
        .read_raw()
        .map(|raw| format!("raw {raw} -> {} C", setpoints.apply(raw, cfg.sensor.max_raw)))
        .map_err(|e| e.to_string());
    check("setpoint", outcome);

    let outcome = dev
        .button
        .is_high()
        .map(|high| format!("level {}", if high { "high" } else { "low" }))
        .map_err(|e| e.to_string());
    check("button", outcome);

    if failures > 0 {
        eyre::bail!("self-check failed: {failures} device(s) did not respond");
    }
    println!("self-check ok");
    Ok(())
}
