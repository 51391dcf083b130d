use std::{borrow::Cow, io::Write};

use crate::{run::JobOutcome, template::RenderedCommand};

pub mod progress;
pub mod stdout;

pub use progress::ProgressReporter;
pub use stdout::StdoutReporter;

/// Receives what the jobs of a run want to show the user.
///
/// Methods are called concurrently from every job.
pub trait RunReporter: Send + Sync + 'static {
    /// Prints the rendered command of a job as a single contiguous block.
    fn echo(&self, job_index: usize, command: &RenderedCommand) -> std::io::Result<()>;

    fn job_finished(&self, _job_index: usize, _outcome: &JobOutcome) {}

    /// Called once, after every job has been joined.
    fn finish(&self, _succeeded: bool) {}
}

/// The text written for an echoed command: the command itself, newline
/// terminated.
pub fn echo_block(command: &RenderedCommand) -> Cow<'_, str> {
    let text = command.as_str();
    if text.ends_with('\n') {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("{text}\n"))
    }
}

/// Writes the echo block of `command` with a single `write_all` and flushes.
pub fn write_echo(out: &mut impl Write, command: &RenderedCommand) -> std::io::Result<()> {
    out.write_all(echo_block(command).as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{JobContext, Renderer};

    fn rendered(source: &str) -> RenderedCommand {
        Renderer::compile("t", source)
            .unwrap()
            .render(&JobContext { parallelism: 1, repeat: 1, job_index: 0 })
            .unwrap()
    }

    #[test]
    fn echo_block_adds_missing_newline() {
        assert_eq!(echo_block(&rendered("SELECT {{JobNumber}}")), "SELECT 0\n");
    }

    #[test]
    fn echo_block_keeps_existing_newline() {
        let command = rendered("SELECT 1;\nSELECT {{JobNumber}};\n");
        assert!(matches!(echo_block(&command), Cow::Borrowed(_)));
        assert_eq!(echo_block(&command), "SELECT 1;\nSELECT 0;\n");
    }

    /// Keeps every `write` call as its own chunk.
    #[derive(Default)]
    struct Chunks {
        chunks: Vec<Vec<u8>>,
        flushed: bool,
    }

    impl Write for Chunks {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.chunks.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            self.flushed = true;
            Ok(())
        }
    }

    #[test]
    fn echo_is_one_write() {
        let mut out = Chunks::default();
        write_echo(&mut out, &rendered("SELECT 1;\nSELECT {{JobNumber}};")).unwrap();
        assert_eq!(out.chunks, vec![b"SELECT 1;\nSELECT 0;\n".to_vec()]);
        assert!(out.flushed);
    }

    #[test]
    fn echoes_append_whole_blocks() {
        let mut out = Vec::new();
        write_echo(&mut out, &rendered("SELECT {{JobNumber}}")).unwrap();
        write_echo(&mut out, &rendered("SELECT {{Repeat}}\n")).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "SELECT 0\nSELECT 1\n");
    }
}
