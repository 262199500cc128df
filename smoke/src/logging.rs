use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::writer::MakeWriter;

/// Writes every log line to stdout and, when configured, to a log file as well.
#[derive(Clone)]
pub(crate) struct TeeWriter {
    file: Option<Arc<Mutex<File>>>,
}

impl TeeWriter {
    pub(crate) fn new(path: Option<PathBuf>) -> io::Result<Self> {
        let file = match path {
            Some(path) => Some(Arc::new(Mutex::new(File::create(path)?))),
            None => None,
        };
        Ok(Self { file })
    }

    fn with_file(&self, op: impl FnOnce(&mut File) -> io::Result<()>) -> io::Result<()> {
        match &self.file {
            Some(file) => {
                let mut handle = file
                    .lock()
                    .map_err(|_| io::Error::other("log file lock poisoned"))?;
                op(&mut handle)
            }
            None => Ok(()),
        }
    }
}

impl<'a> MakeWriter<'a> for TeeWriter {
    type Writer = TeeWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        self.with_file(|file| file.write_all(buf))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        self.with_file(File::flush)
    }
}
