//! Browser-backed implementations of the logging and timing seams.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use wasm_bindgen::JsValue;

use crate::application::timer::Timer;
use crate::domain::logging::{LogEntry, LogLevel, Logger, TimeProvider};

static CONSOLE_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

/// Writes formatted entries to the browser console, one console method per level.
///
/// The threshold is process-wide so it can be tightened after the logger is
/// installed, once the dashboard configuration is known.
pub struct ConsoleLogger;

impl ConsoleLogger {
    pub fn new(min_level: LogLevel) -> Self {
        Self::set_min_level(min_level);
        Self
    }

    pub fn new_production() -> Self {
        Self::new(LogLevel::Info)
    }

    pub fn new_development() -> Self {
        Self::new(LogLevel::Debug)
    }

    pub fn set_min_level(level: LogLevel) {
        CONSOLE_LEVEL.store(level as u8, Ordering::Relaxed);
    }

    pub fn min_level() -> LogLevel {
        match CONSOLE_LEVEL.load(Ordering::Relaxed) {
            0 => LogLevel::Trace,
            1 => LogLevel::Debug,
            2 => LogLevel::Info,
            3 => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, entry: LogEntry) {
        if entry.level < Self::min_level() {
            return;
        }
        let line = JsValue::from(entry.format());
        match entry.level {
            LogLevel::Trace | LogLevel::Debug => web_sys::console::debug_1(&line),
            LogLevel::Info => web_sys::console::info_1(&line),
            LogLevel::Warn => web_sys::console::warn_1(&line),
            LogLevel::Error => web_sys::console::error_1(&line),
        }
    }
}

/// Wall clock from `Date.now()`, printed as `HH:MM:SS.mmm` local time.
pub struct BrowserTimeProvider;

impl TimeProvider for BrowserTimeProvider {
    fn current_timestamp(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn format_timestamp(&self, timestamp: u64) -> String {
        let date = js_sys::Date::new(&(timestamp as f64).into());
        format!(
            "{:02}:{:02}:{:02}.{:03}",
            date.get_hours(),
            date.get_minutes(),
            date.get_seconds(),
            date.get_milliseconds()
        )
    }
}

/// `setTimeout`-backed timer for the polling loops.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimer;

impl Timer for BrowserTimer {
    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }

    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }
}
