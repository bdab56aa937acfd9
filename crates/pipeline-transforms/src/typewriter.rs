use std::io::{self, Stdout, Write};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use pipeline_stage::Transform;

const DEFAULT_DELAY: Duration = Duration::from_millis(100);
const PREFIX: &str = "[typewriter] ";

/// Prints the item one character at a time, each separated by a delay, then
/// passes it through unchanged. Mirrors the original plugin's "slow print"
/// behavior; the per-character delay is configurable so tests can run with
/// zero delay instead of waiting in real time.
pub struct Typewriter<W: Write + Send = Stdout> {
    sink: Mutex<W>,
    delay: Duration,
}

impl Typewriter<Stdout> {
    pub fn new() -> Self {
        Self::with_delay_io(io::stdout(), DEFAULT_DELAY)
    }
}

impl Default for Typewriter<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> Typewriter<W> {
    pub fn with_delay_io(sink: W, delay: Duration) -> Self {
        Self {
            sink: Mutex::new(sink),
            delay,
        }
    }

    fn type_out(&self, sink: &mut W, s: &str) {
        for c in s.chars() {
            let _ = write!(sink, "{c}");
            let _ = sink.flush();
            if !self.delay.is_zero() {
                thread::sleep(self.delay);
            }
        }
    }
}

impl<W: Write + Send> Transform for Typewriter<W> {
    fn name(&self) -> &'static str {
        "typewriter"
    }

    fn apply(&self, input: String) -> Option<String> {
        let mut sink = self.sink.lock().expect("typewriter sink mutex poisoned");
        self.type_out(&mut sink, PREFIX);
        self.type_out(&mut sink, &input);
        let _ = writeln!(sink);
        let _ = sink.flush();
        drop(sink);
        Some(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn types_prefix_then_input_with_zero_delay() {
        let mut buf = Vec::new();
        let captured;
        {
            let tw = Typewriter::with_delay_io(&mut buf, Duration::ZERO);
            captured = tw.apply("hi".to_string());
        }
        assert_eq!(captured, Some("hi".to_string()));
        assert_eq!(String::from_utf8(buf).unwrap(), "[typewriter] hi\n");
    }

    #[test]
    fn empty_string_still_prints_prefix_and_newline() {
        let mut buf = Vec::new();
        let out = Typewriter::with_delay_io(&mut buf, Duration::ZERO).apply(String::new());
        assert_eq!(out, Some(String::new()));
        assert_eq!(String::from_utf8(buf).unwrap(), "[typewriter] \n");
    }
}
