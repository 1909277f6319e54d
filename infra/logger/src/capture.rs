use parking_lot::Mutex;
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// An in-memory log sink.
///
/// Clones share the same buffer, so one clone can be handed to
/// [`LoggerBuilder::dispatch`](crate::LoggerBuilder::dispatch) while another is kept
/// around to inspect what was written.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded as UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }

    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.contents().contains(needle)
    }

    /// Number of captured lines containing `needle`.
    #[must_use]
    pub fn count(&self, needle: &str) -> usize {
        self.contents().lines().filter(|line| line.contains(needle)).count()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

/// Writer handed out by [`LogCapture`] for each event.
#[derive(Debug)]
pub struct CaptureWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CaptureWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = CaptureWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CaptureWriter { buffer: Arc::clone(&self.buffer) }
    }
}
