//! Debounced mode button.
//!
//! A toggle is an idle -> active transition of the raw line level. The idle
//! level depends on the wiring: an internal pull-up idles high and reads low
//! while pressed (`ActiveLow`); an external pull-down is the opposite.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingMode {
    Automatic,
    Manual,
}

impl OperatingMode {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Automatic => Self::Manual,
            Self::Manual => Self::Automatic,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Automatic => "AUTOMATIC",
            Self::Manual => "MANUAL",
        }
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonPolarity {
    /// Idles high, pressed reads low.
    ActiveLow,
    /// Idles low, pressed reads high.
    ActiveHigh,
}

impl ButtonPolarity {
    #[inline]
    pub const fn idle_level(self) -> bool {
        matches!(self, Self::ActiveLow)
    }

    #[inline]
    pub const fn is_pressed(self, level: bool) -> bool {
        level != self.idle_level()
    }
}

/// How the quiet window after a toggle is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceStrategy {
    /// Edges are ignored until the window elapses; the loop keeps running.
    Gated,
    /// The whole loop sleeps for the window.
    Blocking,
}

/// Edge-detector memory. No toggle is accepted before `quiet_until_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceWindow {
    pub last_raw_level: bool,
    pub quiet_until_ms: Option<u64>,
}

impl DebounceWindow {
    pub const fn new(idle_level: bool) -> Self {
        Self {
            last_raw_level: idle_level,
            quiet_until_ms: None,
        }
    }

    #[inline]
    pub fn is_quiet(&self, now_ms: u64) -> bool {
        self.quiet_until_ms.is_some_and(|until| now_ms < until)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ModeSwitch {
    polarity: ButtonPolarity,
    strategy: DebounceStrategy,
    quiet_ms: u64,
}

impl ModeSwitch {
    pub const fn new(polarity: ButtonPolarity, strategy: DebounceStrategy, quiet_ms: u64) -> Self {
        Self {
            polarity,
            strategy,
            quiet_ms,
        }
    }

    pub const fn polarity(&self) -> ButtonPolarity {
        self.polarity
    }

    pub const fn strategy(&self) -> DebounceStrategy {
        self.strategy
    }

    pub const fn quiet_ms(&self) -> u64 {
        self.quiet_ms
    }

    /// Feed one raw sample. Returns true when a toggle is accepted, in which
    /// case the quiet window is (re)opened at `now_ms`. The last level is
    /// recorded on every call.
    pub fn poll(&self, window: &mut DebounceWindow, level: bool, now_ms: u64) -> bool {
        let edge = !self.polarity.is_pressed(window.last_raw_level) && self.polarity.is_pressed(level);
        window.last_raw_level = level;
        if !edge || window.is_quiet(now_ms) {
            return false;
        }
        window.quiet_until_ms = Some(now_ms.saturating_add(self.quiet_ms));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ButtonPolarity::ActiveLow, true, false)]
    #[case(ButtonPolarity::ActiveHigh, false, true)]
    fn press_edge_per_polarity(
        #[case] polarity: ButtonPolarity,
        #[case] idle: bool,
        #[case] active: bool,
    ) {
        let sw = ModeSwitch::new(polarity, DebounceStrategy::Gated, 300);
        let mut w = DebounceWindow::new(polarity.idle_level());
        assert!(!sw.poll(&mut w, idle, 0));
        assert!(sw.poll(&mut w, active, 50));
        // release is not an edge
        assert!(!sw.poll(&mut w, idle, 400));
    }

    #[test]
    fn held_press_toggles_once() {
        let sw = ModeSwitch::new(ButtonPolarity::ActiveLow, DebounceStrategy::Gated, 300);
        let mut w = DebounceWindow::new(true);
        let toggles = (0..40u64)
            .filter(|i| sw.poll(&mut w, false, i * 50))
            .count();
        assert_eq!(toggles, 1);
    }

    #[test]
    fn bounce_inside_window_is_ignored() {
        let sw = ModeSwitch::new(ButtonPolarity::ActiveLow, DebounceStrategy::Gated, 300);
        let mut w = DebounceWindow::new(true);
        assert!(sw.poll(&mut w, false, 0));
        assert!(!sw.poll(&mut w, true, 50));
        assert!(!sw.poll(&mut w, false, 100));
        assert!(!sw.poll(&mut w, true, 350));
        assert!(sw.poll(&mut w, false, 400));
    }

    #[test]
    fn mode_toggles_back_and_forth() {
        assert_eq!(OperatingMode::Automatic.toggled(), OperatingMode::Manual);
        assert_eq!(OperatingMode::Manual.toggled().to_string(), "AUTOMATIC");
    }
}
