use std::io::{self, Stdout, Write};
use std::sync::Mutex;

use pipeline_stage::Transform;

/// Writes each item to a sink as `[logger] <item>\n` and passes it through
/// unchanged. Sentinel handling is done by the stage runtime, so this
/// transform never sees it.
///
/// The sink is generic so tests can capture output instead of writing to
/// stdout.
pub struct Logger<W: Write + Send = Stdout> {
    sink: Mutex<W>,
}

impl Logger<Stdout> {
    pub fn new() -> Self {
        Self {
            sink: Mutex::new(io::stdout()),
        }
    }
}

impl Default for Logger<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> Logger<W> {
    pub fn with_sink(sink: W) -> Self {
        Self {
            sink: Mutex::new(sink),
        }
    }
}

impl<W: Write + Send> Transform for Logger<W> {
    fn name(&self) -> &'static str {
        "logger"
    }

    fn apply(&self, input: String) -> Option<String> {
        let mut sink = self.sink.lock().expect("logger sink mutex poisoned");
        let _ = writeln!(sink, "[logger] {input}");
        let _ = sink.flush();
        drop(sink);
        Some(input)
    }
}
