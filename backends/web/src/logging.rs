//! Tracing and panic forwarding to the browser console.

use std::io::{self, Write};
use std::panic;
use std::sync::Once;

use tracing::{Level, Metadata, level_filters::LevelFilter};
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::prelude::*;
use wasm_bindgen::JsValue;
use web_sys::console;

const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::INFO;

static TRACING_INSTALLED: Once = Once::new();
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Console logging configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    level: LevelFilter,
    forward_panics: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LogConfig {
    /// `INFO` and above, with panics forwarded.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            forward_panics: true,
        }
    }

    /// Sets the most verbose level that reaches the console.
    #[must_use]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Controls whether panics are logged and printed to the console.
    #[must_use]
    pub const fn forward_panics(mut self, forward: bool) -> Self {
        self.forward_panics = forward;
        self
    }

    /// The configured level.
    #[must_use]
    pub const fn max_level(&self) -> LevelFilter {
        self.level
    }

    /// Installs the console subscriber and, if enabled, the panic hook.
    /// Only the first call has any effect.
    pub fn install(self) {
        install_tracing(self.level);
        if self.forward_panics {
            install_panic_forwarder();
        }
    }
}

/// Installs a tracing subscriber writing to the browser console (idempotent).
pub fn install_tracing(level: LevelFilter) {
    TRACING_INSTALLED.call_once(|| {
        // wasm32 has no system clock.
        let console_layer = fmt::layer()
            .without_time()
            .with_ansi(false)
            .with_writer(ConsoleWriter)
            .with_filter(level);

        if tracing_subscriber::registry()
            .with(console_layer)
            .try_init()
            .is_err()
        {
            console::warn_1(&JsValue::from_str(
                "trellis: a global tracing subscriber is already installed",
            ));
        }
    });
}

/// Logs panics through tracing before printing them with their JavaScript
/// stack (idempotent).
pub fn install_panic_forwarder() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        panic::set_hook(Box::new(|info| {
            tracing::error!(target: "trellis::panic", message = %info);
            console_error_panic_hook::hook(info);
        }));
    });
}

struct ConsoleWriter;

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleLine::new(*meta.level())
    }
}

/// Buffers one formatted event and emits it on drop.
struct ConsoleLine {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleLine {
    const fn new(level: Level) -> Self {
        Self {
            level,
            buf: Vec::new(),
        }
    }
}

impl Write for ConsoleLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let line = String::from_utf8_lossy(&self.buf);
        let line = JsValue::from_str(line.trim_end());
        match self.level {
            Level::ERROR => console::error_1(&line),
            Level::WARN => console::warn_1(&line),
            Level::INFO => console::info_1(&line),
            Level::DEBUG => console::debug_1(&line),
            _ => console::log_1(&line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_info_with_panics_forwarded() {
        let config = LogConfig::default();
        assert_eq!(config.max_level(), LevelFilter::INFO);
        assert_eq!(config, LogConfig::new().forward_panics(true));
    }

    #[test]
    fn builder_overrides_level() {
        let config = LogConfig::new().level(LevelFilter::TRACE).forward_panics(false);
        assert_eq!(config.max_level(), LevelFilter::TRACE);
        assert_ne!(config, LogConfig::new());
    }
}
