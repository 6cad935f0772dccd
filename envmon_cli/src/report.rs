//! Stdout reporters: a text panel with a simulated 16x2 LCD, or one JSON
//! object per report.

use std::io::Write;

use envmon_core::{OperatingMode, Reporter, Snapshot};
use serde_json::json;

pub const LCD_COLS: usize = 16;

/// The two LCD rows for a snapshot, each exactly `LCD_COLS` wide.
pub fn lcd_lines(s: &Snapshot) -> [String; 2] {
    let mode = match s.mode {
        OperatingMode::Automatic => "AUTO",
        OperatingMode::Manual => "MAN",
    };
    [
        fit(&format!("T:{:5.1}C SP:{:2}C", s.temp_c, s.setpoint)),
        fit(&format!("Lux:{:4}  {mode:<4}", s.light)),
    ]
}

fn fit(line: &str) -> String {
    let mut out: String = line.chars().take(LCD_COLS).collect();
    while out.chars().count() < LCD_COLS {
        out.push(' ');
    }
    out
}

pub fn render_panel(s: &Snapshot) -> String {
    let rule = "=".repeat(60);
    let [l1, l2] = lcd_lines(s);
    let border = "-".repeat(LCD_COLS + 2);
    format!(
        "{rule}\n\
         Reading #{n} ({uptime} ms)\n\
         {rule}\n\
         Temperature: {c:.2} C | {f:.2} F\n\
         Light:       {light} (raw)\n\
         Setpoint:    {sp} C\n\
         Status:      {status}\n\
         Relay:       {relay}\n\
         Mode:        {mode}\n\
         {rule}\n\
         +{border}+\n\
         | {l1} |\n\
         | {l2} |\n\
         +{border}+\n",
        n = s.reading_number,
        uptime = s.uptime_ms,
        c = s.temp_c,
        f = s.temp_f,
        light = s.light,
        sp = s.setpoint,
        status = s.status,
        relay = if s.relay_on { "ON" } else { "OFF" },
        mode = s.mode,
    )
}

pub fn snapshot_json(s: &Snapshot) -> serde_json::Value {
    json!({
        "reading": s.reading_number,
        "temp_c": s.temp_c,
        "temp_f": s.temp_f,
        "light": s.light,
        "setpoint": s.setpoint,
        "status": s.status.as_str(),
        "relay_on": s.relay_on,
        "mode": s.mode.as_str(),
        "uptime_ms": s.uptime_ms,
    })
}

/// Human-readable panel on stdout.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&mut self, s: &Snapshot) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = out.write_all(render_panel(s).as_bytes()).and_then(|()| out.flush()) {
            tracing::warn!(error = %e, "failed to write report");
        }
    }
}

/// One JSON object per line on stdout.
#[derive(Debug, Default)]
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn report(&mut self, s: &Snapshot) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{}", snapshot_json(s)).and_then(|()| out.flush()) {
            tracing::warn!(error = %e, "failed to write report");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envmon_core::Status;

    fn snap() -> Snapshot {
        Snapshot {
            reading_number: 7,
            temp_c: 31.3,
            temp_f: 88.34,
            light: 2048,
            setpoint: 25,
            status: Status::Critical,
            relay_on: true,
            mode: OperatingMode::Automatic,
            uptime_ms: 21_000,
        }
    }

    #[test]
    fn lcd_rows_are_sixteen_wide() {
        let [a, b] = lcd_lines(&snap());
        assert_eq!(a, "T: 31.3C SP:25C ");
        assert_eq!(b, "Lux:2048  AUTO  ");
    }

    #[test]
    fn lcd_truncates_overflow() {
        let mut s = snap();
        s.temp_c = -123.4;
        s.setpoint = 100;
        let [a, _] = lcd_lines(&s);
        assert_eq!(a.chars().count(), LCD_COLS);
    }

    #[test]
    fn panel_mentions_every_field() {
        let p = render_panel(&snap());
        for needle in ["Reading #7", "31.30 C", "88.34 F", "2048", "25 C", "CRITICAL", "ON", "AUTOMATIC"] {
            assert!(p.contains(needle), "missing {needle} in\n{p}");
        }
    }

    #[test]
    fn json_uses_stable_keys() {
        let v = snapshot_json(&snap());
        assert_eq!(v["reading"], 7);
        assert_eq!(v["status"], "CRITICAL");
        assert_eq!(v["mode"], "AUTOMATIC");
        assert_eq!(v["relay_on"], true);
    }
}
