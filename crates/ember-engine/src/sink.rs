//! Line-oriented diagnostic output.
//!
//! The sink is the device's serial console: an append-only text channel
//! for startup diagnostics, one result line per successful cycle, and
//! error lines. It is separate from `tracing`, which carries structured
//! logs for whoever is debugging the host build.

use std::io::Write;

use tracing::warn;

/// Append-only, line-oriented text output.
pub trait DiagnosticSink {
    /// Append one line. `line` carries no trailing newline.
    fn emit(&mut self, line: &str);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn emit(&mut self, line: &str) {
        (**self).emit(line);
    }
}

/// Writes each line to an [`io::Write`](std::io::Write) and flushes it.
///
/// Write errors are logged and dropped: a console that cannot be written
/// to must not stop inference.
#[derive(Debug)]
pub struct SerialSink<W: Write> {
    out: W,
}

impl<W: Write> SerialSink<W> {
    /// Wrap a writer.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DiagnosticSink for SerialSink<W> {
    fn emit(&mut self, line: &str) {
        let result = writeln!(self.out, "{line}").and_then(|()| self.out.flush());
        if let Err(error) = result {
            warn!(%error, "diagnostic sink write failed");
        }
    }
}

/// Collects lines in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    lines: Vec<String>,
}

impl MemorySink {
    /// An empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every line emitted so far, oldest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Drop all collected lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_sink_terminates_lines() {
        let mut sink = SerialSink::new(Vec::new());
        sink.emit("a\tb");
        sink.emit("c");
        assert_eq!(sink.into_inner(), b"a\tb\nc\n");
    }

    #[test]
    fn memory_sink_keeps_order() {
        let mut sink = MemorySink::new();
        sink.emit("first");
        sink.emit("second");
        assert_eq!(sink.lines(), &["first".to_string(), "second".to_string()]);
        sink.clear();
        assert!(sink.lines().is_empty());
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("unplugged"))
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_do_not_panic() {
        let mut sink = SerialSink::new(Broken);
        sink.emit("lost");
    }
}
